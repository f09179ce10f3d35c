use std::fmt;

/// Failure reported by a source loader. Never escapes [`crate::run`]: the
/// orchestrator turns it into an empty source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The source is not configured or does not exist.
    Unavailable(String),
    /// IO error while reading the source.
    Io(String),
    /// The source exists but could not be decoded.
    Parse { row: usize, message: String },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable(msg) => write!(f, "source unavailable: {msg}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
            Self::Parse { row, message } => write!(f, "row {row}: {message}"),
        }
    }
}

impl std::error::Error for LoadError {}

#[derive(Debug)]
pub enum ConfigError {
    /// TOML parse / deserialization error.
    Parse(String),
    /// Config validation error (unordered thresholds, empty schema, etc.).
    Validation(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "config parse error: {msg}"),
            Self::Validation(msg) => write!(f, "config validation error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}
