use std::path::PathBuf;
use thiserror::Error;

/// Failures reading or writing config and preset files
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("failed to serialize: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("could not determine config directory")]
    NoConfigDir,
}

/// Failures crossing the generic experiment interface
#[derive(Debug, Error)]
pub enum ExperimentError {
    #[error("invalid parameters: {0}")]
    InvalidParams(#[from] serde_json::Error),
}
