//! Staleness of a settings file relative to its last sync.
//!
//! Signal precedence:
//! 1. `NeverSynced` (no sync state)
//! 2. `Modified` (settings digest differs, or the file now names another promotion)
//! 3. `Current`

use std::path::Path;

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use promo_core::PromotionSettings;

use crate::{state_store, SyncError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StalenessSignal {
    NeverSynced,
    Current,
    Modified { reason: String },
}

/// SHA-256 hex of the canonical JSON form of `settings`.
pub fn settings_digest(settings: &PromotionSettings) -> Result<String, SyncError> {
    let canonical = serde_json::to_vec(settings)?;
    let mut hasher = Sha256::new();
    hasher.update(&canonical);
    Ok(hex::encode(hasher.finalize()))
}

/// Classify `settings` (stored under `settings_key`) against its sync state.
pub fn check(
    home: &Path,
    settings_key: &str,
    settings: &PromotionSettings,
) -> Result<StalenessSignal, SyncError> {
    let Some(state) = state_store::load_at(home, settings_key)? else {
        return Ok(StalenessSignal::NeverSynced);
    };

    if settings.promotion_id != Some(state.promotion_id) {
        return Ok(StalenessSignal::Modified {
            reason: format!(
                "last synced to promotion {}, file now targets {}",
                state.promotion_id,
                settings
                    .promotion_id
                    .map(|id| id.to_string())
                    .unwrap_or_else(|| "a new promotion".to_string()),
            ),
        });
    }

    if settings_digest(settings)? != state.digest {
        return Ok(StalenessSignal::Modified {
            reason: format!(
                "settings changed since sync {} ago",
                format_datetime_age(state.synced_at)
            ),
        });
    }

    Ok(StalenessSignal::Current)
}

/// Compact age of a timestamp: `42s`, `5m`, `3h`, `2d`.
pub fn format_datetime_age(timestamp: DateTime<Utc>) -> String {
    let age = Utc::now()
        .signed_duration_since(timestamp)
        .num_seconds()
        .max(0) as u64;
    format_seconds(age)
}

fn format_seconds(seconds: u64) -> String {
    if seconds < 60 {
        return format!("{seconds}s");
    }
    if seconds < 60 * 60 {
        return format!("{}m", seconds / 60);
    }
    if seconds < 60 * 60 * 24 {
        return format!("{}h", seconds / (60 * 60));
    }
    format!("{}d", seconds / (60 * 60 * 24))
}
