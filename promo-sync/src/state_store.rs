//! Sync state: what the last successful push of a settings file left behind.
//!
//! Persists a `SyncState` JSON document at
//! `<home>/.promo/state/<settings_key>.json`.
//! Writes use the atomic `.tmp` + rename pattern.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use promo_core::{IdentityMap, PromotionId, SegmentId};

use crate::error::{io_err, SyncError};

/// On-disk sync state of one settings file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyncState {
    pub promotion_id: PromotionId,
    pub synced_at: DateTime<Utc>,
    /// SHA-256 of the settings as written back after the sync.
    pub digest: String,
    /// Identity map after the sync.
    #[serde(default)]
    pub segments: IdentityMap,
    /// Identifiers that may exist remotely; the next save's previous set.
    #[serde(default)]
    pub known_ids: BTreeSet<SegmentId>,
}

/// `~/.promo/state/<settings_key>.json`
pub fn state_path_at(home: &Path, settings_key: &str) -> PathBuf {
    home.join(".promo")
        .join("state")
        .join(format!("{settings_key}.json"))
}

/// Load the state for `settings_key`; `None` if the file was never synced.
pub fn load_at(home: &Path, settings_key: &str) -> Result<Option<SyncState>, SyncError> {
    let path = state_path_at(home, settings_key);
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    Ok(Some(serde_json::from_str(&contents)?))
}

/// Save the state for `settings_key` atomically.
pub fn save_at(home: &Path, settings_key: &str, state: &SyncState) -> Result<(), SyncError> {
    let path = state_path_at(home, settings_key);
    let Some(dir) = path.parent() else {
        return Err(io_err(path, std::io::Error::other("invalid state path")));
    };
    std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;

    let json = serde_json::to_string_pretty(state)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, &json).map_err(|e| io_err(&tmp, e))?;
    std::fs::rename(&tmp, &path).map_err(|e| io_err(&path, e))?;
    Ok(())
}

/// Remove the state for `settings_key`. Missing state is not an error.
pub fn clear_at(home: &Path, settings_key: &str) -> Result<bool, SyncError> {
    let path = state_path_at(home, settings_key);
    match std::fs::remove_file(&path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(io_err(&path, e)),
    }
}
