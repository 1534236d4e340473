//! `promo diff <file>`: compare a settings file with the service.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use promo_client::AdminClient;
use promo_sync::{
    diff::{diff_promotion, render_local},
    plan, IdentitySeed, PromotionBackend,
};

use super::{load_settings, Remote};

/// Arguments for `promo diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Settings file to compare.
    pub file: PathBuf,
}

impl DiffArgs {
    pub fn run(self, remote: &Remote) -> Result<()> {
        let settings = load_settings(&self.file)?;
        let label = self.file.display().to_string();

        let Some(id) = settings.promotion_id else {
            println!("'{label}' has no promotion id yet; sync would create:");
            print!("{}", render_local(&settings));
            return Ok(());
        };

        let mut admin = AdminClient::new(&remote.config()?);
        let current = admin
            .get_promotion(id)
            .with_context(|| format!("failed to load promotion {id} from {}", admin.base_url()))?;

        match diff_promotion(&current, &settings, &label) {
            Some(diff) => {
                print!("{diff}");
                if !diff.ends_with('\n') {
                    println!();
                }
            }
            None => {
                println!("No differences for '{label}'.");
                return Ok(());
            }
        }

        let seed = IdentitySeed::from_remote(&current);
        let planned = plan(&settings.segments, &seed.identity, &seed.previous);
        if !planned.ops.is_empty() {
            println!("Segment operations:");
            for op in &planned.ops {
                println!("  ~  {op}");
            }
        }
        Ok(())
    }
}
