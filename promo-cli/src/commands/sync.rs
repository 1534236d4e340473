//! `promo sync <file>`: save a settings file to the promotion service.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Args;

use promo_client::AdminClient;
use promo_core::settings;
use promo_sync::{
    save_promotion, staleness::settings_digest, state_store, FailurePolicy, IdentitySeed,
    SaveOptions, SaveReport, SyncState,
};

use super::{home_dir, load_settings, matching_state, Remote};

/// Arguments for `promo sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Settings file to save.
    pub file: PathBuf,

    /// Print the segment plan without writing anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Read segment identifiers back from the service instead of the local
    /// sync state.
    #[arg(long)]
    pub reload: bool,

    /// Stop at the first failed segment operation.
    #[arg(long)]
    pub fail_fast: bool,
}

impl SyncArgs {
    pub fn run(self, remote: &Remote) -> Result<()> {
        let home = home_dir()?;
        let settings = load_settings(&self.file)?;

        let seed = if self.reload {
            None
        } else {
            matching_state(&home, &self.file, &settings)?.map(|s| IdentitySeed::from_state(&s))
        };
        let options = SaveOptions {
            policy: if self.fail_fast {
                FailurePolicy::FailFast
            } else {
                FailurePolicy::Continue
            },
            dry_run: self.dry_run,
        };

        let mut admin = AdminClient::new(&remote.config()?);
        let report = save_promotion(&mut admin, &settings, seed, options).with_context(|| {
            format!(
                "sync failed for '{}' against {}",
                self.file.display(),
                admin.base_url()
            )
        })?;

        if self.dry_run {
            print_plan(&settings.name, &report);
            return Ok(());
        }

        // Identifiers assigned so far are persisted even when segment, pricing
        // or poll calls failed, so the next sync does not recreate them.
        settings::save_at(&self.file, &report.settings)
            .with_context(|| format!("failed to write back '{}'", self.file.display()))?;
        if let (Some(promotion_id), Some(outcome)) = (report.promotion_id, report.outcome.as_ref()) {
            let digest = if report.ensure_clean().is_ok() {
                settings_digest(&report.settings)?
            } else {
                String::new()
            };
            let state = SyncState {
                promotion_id,
                synced_at: Utc::now(),
                digest,
                segments: outcome.identity.clone(),
                known_ids: outcome.known_ids.clone(),
            };
            let key = settings::settings_key(&self.file);
            state_store::save_at(&home, &key, &state).with_context(|| {
                format!("failed to save sync state for '{}'", self.file.display())
            })?;
        }

        print_report(&report);
        report
            .ensure_clean()
            .with_context(|| format!("sync of '{}' incomplete", self.file.display()))?;
        Ok(())
    }
}

fn print_plan(name: &str, report: &SaveReport) {
    let target = match report.promotion_id {
        Some(id) => format!("promotion {id}"),
        None => "a new promotion".to_string(),
    };
    println!(
        "[dry-run] '{name}' -> {target}: {} create, {} update, {} delete",
        report.plan.creates(),
        report.plan.updates(),
        report.plan.deletes()
    );
    for op in &report.plan.ops {
        println!("  ~  {op}");
    }
}

fn print_report(report: &SaveReport) {
    let Some(promotion_id) = report.promotion_id else {
        return;
    };
    let verb = if report.created_promotion {
        "created"
    } else {
        "updated"
    };
    println!("✓ Promotion {promotion_id} {verb}");

    if let Some(outcome) = &report.outcome {
        for applied in &outcome.applied {
            println!("  ✎  {}", applied.op);
        }
        for failure in &outcome.failures {
            println!("  ✗  {}: {}", failure.op, failure.error);
        }
        if outcome.aborted {
            println!("  stopped after the first failure (--fail-fast)");
        }
    }
    if report.pricing_saved {
        println!("  ✎  pricing ({})", report.settings.pricing_model);
    }
    if report.poll_saved {
        println!("  ✎  poll questions");
    }
    for failure in &report.step_failures {
        println!("  ✗  {}: {}", failure.step, failure.error);
    }
}
