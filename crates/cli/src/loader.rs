//! CSV files as pipeline sources.

use std::path::{Path, PathBuf};

use reliefmap_pipeline::{LoadError, RawRecord, SourceLoader};

/// Reads one source from a CSV file with a header row. Header names are
/// kept verbatim, surrounding spaces included.
pub struct CsvFileLoader {
    path: Option<PathBuf>,
}

impl CsvFileLoader {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl SourceLoader for CsvFileLoader {
    fn load(&self) -> Result<Vec<RawRecord>, LoadError> {
        let path = self
            .path
            .as_ref()
            .ok_or_else(|| LoadError::Unavailable("no file configured".into()))?;
        if !path.exists() {
            return Err(LoadError::Unavailable(format!("{} not found", path.display())));
        }
        let data = std::fs::read_to_string(path)
            .map_err(|e| LoadError::Io(format!("cannot read {}: {e}", path.display())))?;
        let rows = parse_csv(&data)?;
        log::debug!("read {} rows from {}", rows.len(), path.display());
        Ok(rows)
    }
}

/// Parse CSV text into records. Short rows only carry the fields they have.
pub fn parse_csv(data: &str) -> Result<Vec<RawRecord>, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| LoadError::Parse { row: 0, message: e.to_string() })?
        .clone();

    let mut rows = Vec::new();
    for (i, result) in reader.records().enumerate() {
        let record = result.map_err(|e| LoadError::Parse {
            row: i + 1,
            message: e.to_string(),
        })?;
        rows.push(headers.iter().zip(record.iter()).collect::<RawRecord>());
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_are_kept_verbatim() {
        let data = "State, Gift $ ,City\nNY,\"$1,000,000\",New York\nCA,500\n";
        let rows = parse_csv(data).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get(" Gift $ "), Some("$1,000,000"));
        assert_eq!(rows[0].get("City"), Some("New York"));
        assert_eq!(rows[1].get("City"), None);
        assert_eq!(rows[1].len(), 2);
    }

    #[test]
    fn empty_file_has_no_rows() {
        assert!(parse_csv("").unwrap().is_empty());
        assert!(parse_csv("State,City\n").unwrap().is_empty());
    }

    #[test]
    fn missing_file_is_unavailable() {
        let loader = CsvFileLoader::new(None);
        assert!(matches!(loader.load(), Err(LoadError::Unavailable(_))));

        let dir = tempfile::tempdir().unwrap();
        let loader = CsvFileLoader::new(Some(dir.path().join("nope.csv")));
        assert!(matches!(loader.load(), Err(LoadError::Unavailable(_))));
    }

    #[test]
    fn reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("volunteers.csv");
        std::fs::write(&path, "State,Dis Resp\nTX,Yes\n").unwrap();
        let rows = CsvFileLoader::new(Some(path)).load().unwrap();
        assert_eq!(rows[0].get("Dis Resp"), Some("Yes"));
    }
}
