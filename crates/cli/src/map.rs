//! `rmap run`, `rmap validate` and `rmap fallback`: config-driven map builds.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use reliefmap_pipeline::model::DataOrigin;
use reliefmap_pipeline::{Category, PipelineConfig, PipelineResult, Sources};

use crate::exit_codes::{
    EXIT_ERROR, EXIT_MAP_INVALID_CONFIG, EXIT_MAP_RUNTIME, EXIT_MAP_SYNTHETIC, EXIT_USAGE,
};
use crate::loader::CsvFileLoader;
use crate::CliError;

fn map_err(code: u8, msg: impl Into<String>) -> CliError {
    CliError { code, message: msg.into(), hint: None }
}

// ============================================================================
// Config
// ============================================================================

/// A `.map.toml` file: a name, one CSV path per source (relative to the
/// config file) and the pipeline settings at top level.
#[derive(Debug, Deserialize)]
pub struct MapConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default)]
    pub files: SourceFiles,
    #[serde(flatten)]
    pub pipeline: PipelineConfig,
}

fn default_name() -> String {
    "relief map".into()
}

#[derive(Debug, Default, Deserialize)]
pub struct SourceFiles {
    pub volunteers: Option<PathBuf>,
    pub blood_drives: Option<PathBuf>,
    pub donors: Option<PathBuf>,
    pub applicants: Option<PathBuf>,
}

impl SourceFiles {
    pub fn get(&self, category: Category) -> Option<&Path> {
        match category {
            Category::Volunteer => self.volunteers.as_deref(),
            Category::BloodDrive => self.blood_drives.as_deref(),
            Category::Donor => self.donors.as_deref(),
            Category::Applicant => self.applicants.as_deref(),
        }
    }
}

impl MapConfig {
    pub fn from_toml(input: &str) -> Result<Self, reliefmap_pipeline::ConfigError> {
        let config: MapConfig = toml::from_str(input)
            .map_err(|e| reliefmap_pipeline::ConfigError::Parse(e.to_string()))?;
        config.pipeline.validate()?;
        Ok(config)
    }

    /// Loader for `category`, path resolved against `base_dir`.
    fn loader(&self, category: Category, base_dir: &Path) -> CsvFileLoader {
        CsvFileLoader::new(self.files.get(category).map(|p| base_dir.join(p)))
    }
}

fn read_config(config_path: &Path) -> Result<MapConfig, CliError> {
    let config_str = std::fs::read_to_string(config_path).map_err(|e| {
        map_err(EXIT_USAGE, format!("cannot read config {}: {e}", config_path.display()))
    })?;
    MapConfig::from_toml(&config_str).map_err(|e| map_err(EXIT_MAP_INVALID_CONFIG, e.to_string()))
}

// ============================================================================
// Output
// ============================================================================

#[derive(Serialize)]
struct RunMeta<'a> {
    config_name: &'a str,
    engine_version: &'static str,
    generated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fingerprint: Option<String>,
}

#[derive(Serialize)]
struct Envelope<'a> {
    meta: RunMeta<'a>,
    result: &'a PipelineResult,
}

/// SHA-256 of the serialized result. Timestamps live in the envelope, so
/// equal results always share a fingerprint.
pub fn fingerprint(result: &PipelineResult) -> Result<String, serde_json::Error> {
    let bytes = serde_json::to_vec(result)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("sha256:{:x}", hasher.finalize()))
}

pub struct OutputOptions {
    pub json: bool,
    pub output: Option<PathBuf>,
    pub fingerprint: bool,
}

fn emit(config_name: &str, result: &PipelineResult, opts: &OutputOptions) -> Result<(), CliError> {
    let fp = if opts.fingerprint {
        Some(fingerprint(result).map_err(|e| {
            map_err(EXIT_ERROR, format!("JSON serialization error: {e}"))
        })?)
    } else {
        None
    };

    if opts.json || opts.output.is_some() {
        let envelope = Envelope {
            meta: RunMeta {
                config_name,
                engine_version: env!("CARGO_PKG_VERSION"),
                generated_at: chrono::Utc::now().to_rfc3339(),
                fingerprint: fp.clone(),
            },
            result,
        };
        let json_str = serde_json::to_string_pretty(&envelope)
            .map_err(|e| map_err(EXIT_ERROR, format!("JSON serialization error: {e}")))?;

        if let Some(ref path) = opts.output {
            std::fs::write(path, &json_str).map_err(|e| {
                map_err(EXIT_MAP_RUNTIME, format!("cannot write output: {e}"))
            })?;
            eprintln!("wrote {}", path.display());
        }
        if opts.json {
            println!("{json_str}");
        }
    }

    if let Some(fp) = fp {
        if !opts.json {
            println!("{fp}");
        }
    }

    print_summary(config_name, result);
    Ok(())
}

/// Human summary to stderr.
fn print_summary(config_name: &str, result: &PipelineResult) {
    let s = &result.summary;
    let counts: Vec<String> = Category::ALL
        .iter()
        .map(|c| format!("{} {c}", s.counts_by_category.get(c).copied().unwrap_or(0)))
        .collect();
    eprintln!(
        "{config_name}: {} points in {} regions ({}), origin {}",
        s.total,
        s.distinct_regions,
        counts.join(", "),
        s.origin,
    );

    let dropped: usize = s.dropped_by_category.values().sum();
    if dropped > 0 {
        eprintln!("dropped {dropped} unlocatable or empty records");
    }
    if !s.failed_sources.is_empty() {
        let names: Vec<String> = s.failed_sources.iter().map(|c| c.to_string()).collect();
        eprintln!("unavailable sources: {}", names.join(", "));
    }
    if s.synthetic_points > 0 {
        eprintln!("synthetic points: {}", s.synthetic_points);
    }
    if s.truncated > 0 {
        eprintln!("truncated: {} points over the limit", s.truncated);
    }
}

// ============================================================================
// Commands
// ============================================================================

pub fn cmd_run(config_path: PathBuf, opts: OutputOptions, strict: bool) -> Result<(), CliError> {
    let config = read_config(&config_path)?;
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    log::info!("building '{}' from {}", config.name, config_path.display());

    let volunteers = config.loader(Category::Volunteer, base_dir);
    let blood_drives = config.loader(Category::BloodDrive, base_dir);
    let donors = config.loader(Category::Donor, base_dir);
    let applicants = config.loader(Category::Applicant, base_dir);
    let sources = Sources {
        volunteers: &volunteers,
        blood_drives: &blood_drives,
        donors: &donors,
        applicants: &applicants,
    };

    let result = reliefmap_pipeline::run(&config.pipeline, &sources);
    emit(&config.name, &result, &opts)?;

    if strict && result.summary.origin == DataOrigin::Synthetic {
        return Err(map_err(EXIT_MAP_SYNTHETIC, "every source failed; map is synthetic")
            .with_hint("check the [files] paths in the config"));
    }
    Ok(())
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = read_config(&config_path)?;
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));

    eprintln!("{}: config ok", config.name);
    for category in Category::ALL {
        let loader = config.loader(category, base_dir);
        match loader.path() {
            Some(path) if path.exists() => eprintln!("  {category}: {}", path.display()),
            Some(path) => eprintln!("  {category}: {} (missing, will be skipped)", path.display()),
            None => eprintln!("  {category}: no file (will be skipped)"),
        }
    }
    Ok(())
}

pub fn cmd_fallback(seed: Option<u64>, opts: OutputOptions) -> Result<(), CliError> {
    let mut config = PipelineConfig::default();
    if let Some(seed) = seed {
        config.fallback.seed = seed;
    }
    log::info!("generating synthetic fallback with seed {}", config.fallback.seed);
    let result = reliefmap_pipeline::fallback(&config);
    emit("synthetic fallback", &result, &opts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn map_config_flattens_pipeline_settings() {
        let input = r#"
name = "Gulf Coast"

[files]
volunteers = "data/volunteers.csv"
donors = "data/donors.csv"

[donors]
amount = ["Pledge"]

[limits]
max_points = 1000
"#;
        let config = MapConfig::from_toml(input).unwrap();
        assert_eq!(config.name, "Gulf Coast");
        assert_eq!(config.files.get(Category::Donor), Some(Path::new("data/donors.csv")));
        assert_eq!(config.files.get(Category::Applicant), None);
        assert_eq!(config.pipeline.donors.amount, vec!["Pledge"]);
        assert_eq!(config.pipeline.limits.max_points, 1000);
        assert_eq!(config.pipeline.limits.min_points, 100);
    }

    #[test]
    fn empty_map_config_is_valid() {
        let config = MapConfig::from_toml("").unwrap();
        assert_eq!(config.name, "relief map");
        assert_eq!(config.pipeline, PipelineConfig::default());
    }

    #[test]
    fn invalid_limits_are_rejected() {
        let input = "[limits]\nmin_points = 10\nmax_points = 5\n";
        let err = MapConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("min_points"), "{err}");
    }

    #[test]
    fn fingerprint_is_stable() {
        let config = PipelineConfig {
            fallback: reliefmap_pipeline::config::FallbackConfig {
                seed: 1,
                targets: reliefmap_pipeline::config::TargetCounts {
                    volunteer: 5,
                    blood_drive: 5,
                    donor: 5,
                    applicant: 5,
                },
            },
            ..PipelineConfig::default()
        };
        let a = fingerprint(&reliefmap_pipeline::fallback(&config)).unwrap();
        let b = fingerprint(&reliefmap_pipeline::fallback(&config)).unwrap();
        assert_eq!(a, b);
        assert!(a.starts_with("sha256:"));
        assert_eq!(a.len(), "sha256:".len() + 64);
    }
}
