//! Error types for promo-sync.

use std::path::PathBuf;

use thiserror::Error;

use promo_core::SettingsError;

use crate::remote::RemoteError;

/// All errors that can arise from sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// A settings file could not be read or written.
    #[error("settings error: {0}")]
    Settings(#[from] SettingsError),

    /// A single remote call failed outside the segment batch.
    #[error("{context}: {source}")]
    Remote {
        context: String,
        #[source]
        source: RemoteError,
    },

    /// One or more segment operations failed; see the reconcile outcome.
    #[error("could not save segment changes ({failed} operation(s) failed)")]
    SegmentsNotSaved { failed: usize },

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error (sync state).
    #[error("sync state JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}

/// Convenience constructor for [`SyncError::Remote`].
pub(crate) fn remote_err(context: impl Into<String>, source: RemoteError) -> SyncError {
    SyncError::Remote {
        context: context.into(),
        source,
    }
}
