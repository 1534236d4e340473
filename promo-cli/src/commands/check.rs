//! `promo check <file>`: readiness rules for starting a promotion.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use colored::Colorize;

use promo_core::readiness;

use super::load_settings;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Settings file to check.
    pub file: PathBuf,
}

impl CheckArgs {
    pub fn run(self) -> Result<()> {
        let settings = load_settings(&self.file)?;
        let issues = readiness::check(&settings);

        if issues.is_empty() {
            println!("{} '{}' is ready to start", "✓".green(), settings.name);
            return Ok(());
        }

        println!("'{}' is not ready to start:", settings.name);
        for issue in &issues {
            println!("  {} {issue}", "✗".red());
        }
        bail!("{} readiness issue(s) in '{}'", issues.len(), self.file.display());
    }
}
