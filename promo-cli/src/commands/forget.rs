//! `promo forget <file>`: drop the sync state of a settings file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use promo_core::settings;
use promo_sync::state_store;

use super::home_dir;

#[derive(Args, Debug)]
pub struct ForgetArgs {
    /// Settings file whose sync state is dropped. The file itself is kept.
    pub file: PathBuf,
}

impl ForgetArgs {
    pub fn run(self) -> Result<()> {
        let home = home_dir()?;
        let key = settings::settings_key(&self.file);
        let removed = state_store::clear_at(&home, &key)
            .with_context(|| format!("failed to clear sync state for '{}'", self.file.display()))?;
        if removed {
            println!(
                "✓ Forgot sync state of '{}'; the next sync reads segment ids from the service",
                self.file.display()
            );
        } else {
            println!("· No sync state recorded for '{}'", self.file.display());
        }
        Ok(())
    }
}
