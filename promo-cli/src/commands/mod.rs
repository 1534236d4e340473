pub mod bid;
pub mod check;
pub mod diff;
pub mod forget;
pub mod init;
pub mod moderation;
pub mod pull;
pub mod segments;
pub mod status;
pub mod sync;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use promo_client::ClientConfig;
use promo_core::{settings, PromotionSettings};
use promo_sync::{state_store, SyncState};

/// Connection options shared by the commands that talk to the service.
#[derive(Debug, Clone, Default)]
pub struct Remote {
    pub base_url: Option<String>,
}

impl Remote {
    /// Environment configuration with `--base-url` applied on top.
    pub fn config(&self) -> Result<ClientConfig> {
        let config = ClientConfig::from_env().context("invalid client configuration")?;
        Ok(match self.base_url.as_deref() {
            Some(url) => config.with_base_url(url),
            None => config,
        })
    }
}

pub fn home_dir() -> Result<PathBuf> {
    dirs::home_dir().context("could not determine home directory")
}

pub fn load_settings(path: &Path) -> Result<PromotionSettings> {
    settings::load_at(path).with_context(|| {
        format!(
            "failed to load settings — run `promo init {}` first",
            path.display()
        )
    })
}

/// Sync state of `path`, but only while it still describes the promotion the
/// file targets.
pub fn matching_state(
    home: &Path,
    path: &Path,
    settings: &PromotionSettings,
) -> Result<Option<SyncState>> {
    let key = settings::settings_key(path);
    let state = state_store::load_at(home, &key)
        .with_context(|| format!("failed to load sync state for '{}'", path.display()))?;
    Ok(state.filter(|s| settings.promotion_id == Some(s.promotion_id)))
}
