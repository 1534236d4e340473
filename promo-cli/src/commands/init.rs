//! `promo init <file> [--name <name>]`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use promo_core::settings;

/// Create a settings file with default values.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Settings file to create (YAML).
    pub file: PathBuf,

    /// Promotion name. Defaults to the file stem.
    #[arg(long, short = 'n')]
    pub name: Option<String>,
}

impl InitArgs {
    pub fn run(self) -> Result<()> {
        let existed = self.file.exists();
        let settings = settings::init_at(&self.file, self.name)
            .with_context(|| format!("failed to init '{}'", self.file.display()))?;

        if existed {
            println!(
                "· '{}' already exists ({} segments); left unchanged",
                self.file.display(),
                settings.segments.len()
            );
            return Ok(());
        }
        println!(
            "✓ Created promotion '{}' in {}",
            settings.name,
            self.file.display()
        );
        println!(
            "  Next: `promo segments {} generate` to fill in segments",
            self.file.display()
        );
        Ok(())
    }
}
