//! `promo status`: sync visibility for settings files.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use promo_core::settings;
use promo_sync::{
    staleness::{check, format_datetime_age},
    state_store, StalenessSignal,
};

use super::{home_dir, load_settings};

/// Arguments for `promo status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Settings files to report on.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl StatusArgs {
    pub fn run(self) -> Result<()> {
        let home = home_dir()?;
        let mut rows = Vec::new();
        for file in &self.files {
            rows.push(file_status(&home, file)?);
        }

        if self.json {
            print_json(rows)?;
            return Ok(());
        }
        print_table(rows);
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct FileStatus {
    file: String,
    name: String,
    promotion: Option<i64>,
    segments: usize,
    signal: StalenessSignal,
    last_sync_age: String,
    last_sync_at: Option<String>,
}

#[derive(Serialize)]
struct FileStatusJson {
    file: String,
    name: String,
    promotion_id: Option<i64>,
    segments: usize,
    status: String,
    detail: String,
    last_sync_age: String,
    last_sync_at: Option<String>,
}

#[derive(Tabled)]
struct StatusTableRow {
    #[tabled(rename = "file")]
    file: String,
    #[tabled(rename = "promotion")]
    promotion: String,
    #[tabled(rename = "status")]
    status: String,
    #[tabled(rename = "detail")]
    detail: String,
    #[tabled(rename = "last sync")]
    last_sync: String,
}

fn file_status(home: &Path, file: &Path) -> Result<FileStatus> {
    let settings = load_settings(file)?;
    let key = settings::settings_key(file);
    let signal = check(home, &key, &settings)
        .with_context(|| format!("status check failed for '{}'", file.display()))?;
    let state = state_store::load_at(home, &key)
        .with_context(|| format!("failed to load sync state for '{}'", file.display()))?;
    let (last_sync_at, last_sync_age) = match state {
        Some(state) => (
            Some(state.synced_at.to_rfc3339()),
            format_datetime_age(state.synced_at),
        ),
        None => (None, "never".to_string()),
    };

    Ok(FileStatus {
        file: file.display().to_string(),
        name: settings.name,
        promotion: settings.promotion_id.map(|id| id.0),
        segments: settings.segments.len(),
        signal,
        last_sync_age,
        last_sync_at,
    })
}

fn print_json(rows: Vec<FileStatus>) -> Result<()> {
    let payload: Vec<FileStatusJson> = rows
        .into_iter()
        .map(|row| FileStatusJson {
            status: signal_key(&row.signal).to_string(),
            detail: signal_detail(&row.signal),
            file: row.file,
            name: row.name,
            promotion_id: row.promotion,
            segments: row.segments,
            last_sync_age: row.last_sync_age,
            last_sync_at: row.last_sync_at,
        })
        .collect();
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize status JSON")?
    );
    Ok(())
}

fn print_table(rows: Vec<FileStatus>) {
    let modified = rows
        .iter()
        .filter(|r| !matches!(r.signal, StalenessSignal::Current))
        .count();
    println!(
        "Promo v{} | {} files | {} need sync",
        env!("CARGO_PKG_VERSION"),
        rows.len(),
        modified
    );
    println!(
        "Indicators: {} CURRENT  {} MODIFIED  {} NEVER SYNCED",
        signal_indicator(&StalenessSignal::Current),
        signal_indicator(&StalenessSignal::Modified {
            reason: String::new()
        }),
        signal_indicator(&StalenessSignal::NeverSynced),
    );

    let table_rows: Vec<StatusTableRow> = rows
        .into_iter()
        .map(|row| StatusTableRow {
            file: format!("{} ({} segments)", row.file, row.segments),
            promotion: row
                .promotion
                .map(|id| format!("#{id} {}", row.name))
                .unwrap_or_else(|| format!("new: {}", row.name)),
            status: format!(
                "{} {}",
                signal_indicator(&row.signal),
                signal_label(&row.signal)
            ),
            detail: signal_detail(&row.signal),
            last_sync: row.last_sync_age,
        })
        .collect();
    let mut table = Table::new(table_rows);
    table.with(Style::rounded());
    println!("{table}");

    if modified > 0 {
        println!("Run 'promo sync <file>' to push pending changes.");
    }
}

fn signal_key(signal: &StalenessSignal) -> &'static str {
    match signal {
        StalenessSignal::NeverSynced => "never_synced",
        StalenessSignal::Current => "current",
        StalenessSignal::Modified { .. } => "modified",
    }
}

fn signal_label(signal: &StalenessSignal) -> &'static str {
    match signal {
        StalenessSignal::NeverSynced => "NEVER SYNCED",
        StalenessSignal::Current => "CURRENT",
        StalenessSignal::Modified { .. } => "MODIFIED",
    }
}

fn signal_indicator(signal: &StalenessSignal) -> String {
    match signal {
        StalenessSignal::NeverSynced => "○".bright_black().to_string(),
        StalenessSignal::Current => "●".green().to_string(),
        StalenessSignal::Modified { .. } => "●".yellow().to_string(),
    }
}

fn signal_detail(signal: &StalenessSignal) -> String {
    match signal {
        StalenessSignal::NeverSynced => "no sync recorded".to_string(),
        StalenessSignal::Current => "in sync".to_string(),
        StalenessSignal::Modified { reason } => reason.clone(),
    }
}
