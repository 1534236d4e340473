//! `promo pull <promotion-id> <file>`: load a remote promotion into a file.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::Args;

use promo_client::AdminClient;
use promo_core::{settings, PromotionId};
use promo_sync::{load_promotion, staleness::settings_digest, state_store, SyncState};

use super::{home_dir, Remote};

/// Arguments for `promo pull`.
#[derive(Args, Debug)]
pub struct PullArgs {
    /// Remote promotion identifier.
    pub promotion: i64,

    /// Settings file to write (YAML).
    pub file: PathBuf,

    /// Overwrite the file if it already exists.
    #[arg(long)]
    pub force: bool,
}

impl PullArgs {
    pub fn run(self, remote: &Remote) -> Result<()> {
        if self.file.exists() && !self.force {
            bail!(
                "'{}' already exists; pass --force to overwrite it",
                self.file.display()
            );
        }
        let home = home_dir()?;
        let id = PromotionId(self.promotion);

        let mut admin = AdminClient::new(&remote.config()?);
        let loaded = load_promotion(&mut admin, id)
            .with_context(|| format!("failed to pull promotion {id} from {}", admin.base_url()))?;

        settings::save_at(&self.file, &loaded.settings)
            .with_context(|| format!("failed to write '{}'", self.file.display()))?;

        let state = SyncState {
            promotion_id: id,
            synced_at: Utc::now(),
            digest: settings_digest(&loaded.settings)?,
            segments: loaded.seed.identity,
            known_ids: loaded.seed.previous,
        };
        let key = settings::settings_key(&self.file);
        state_store::save_at(&home, &key, &state)
            .with_context(|| format!("failed to save sync state for '{}'", self.file.display()))?;

        let status = if loaded.status.is_empty() {
            "unknown"
        } else {
            loaded.status.as_str()
        };
        println!(
            "✓ Pulled promotion {id} '{}' ({status}) into {}",
            loaded.settings.name,
            self.file.display()
        );
        println!(
            "  {} segments, {} pricing",
            loaded.settings.segments.len(),
            loaded.settings.pricing_model
        );
        Ok(())
    }
}
