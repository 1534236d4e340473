//! Error types for promo-core.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from loading or saving a settings file.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Underlying I/O failure (permission denied, disk full, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization error (save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load, with the file path and serde_yaml's line context.
    #[error("failed to parse settings at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The settings file does not exist.
    #[error("settings file not found at {path}")]
    NotFound { path: PathBuf },
}

/// Errors from editing the working segment list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("no segment named '{0}'")]
    UnknownSegment(String),

    #[error("a segment named '{0}' already exists")]
    DuplicateSegment(String),

    #[error("segment name must not be empty")]
    EmptyName,
}
