//! `promo segments <file> <action>`: edit the segment list of a file.
//!
//! Renames and removals keep the sync state's identity map in step with the
//! file, so the next sync updates renamed segments instead of recreating them.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use tabled::{settings::Style, Table, Tabled};

use promo_core::{settings, IdentityMap, PromotionSettings, SegmentEditor};
use promo_sync::state_store;

use super::{home_dir, load_settings, matching_state};

#[derive(Args, Debug)]
pub struct SegmentsArgs {
    /// Settings file to edit.
    pub file: PathBuf,

    #[command(subcommand)]
    pub action: SegmentAction,
}

#[derive(Subcommand, Debug)]
pub enum SegmentAction {
    /// List segments in order.
    List,

    /// Append a segment; without a name a placeholder is used.
    Add {
        name: Option<String>,
        #[arg(long, short = 'c', default_value = "")]
        category: String,
    },

    /// Remove a segment.
    Remove { name: String },

    /// Rename a segment, keeping its category and identifier.
    Rename { old: String, new: String },

    /// Set the product category of a segment.
    Category { name: String, category: String },

    /// Shuffle the assigned categories across segments.
    Shuffle,

    /// Replace the list with suggestions for a theme.
    Generate {
        /// Theme to generate for. Defaults to the file's theme.
        #[arg(long)]
        theme: Option<String>,
    },
}

#[derive(Tabled)]
struct SegmentRow {
    #[tabled(rename = "#")]
    position: usize,
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "category")]
    category: String,
    #[tabled(rename = "id")]
    id: String,
}

impl SegmentsArgs {
    pub fn run(self) -> Result<()> {
        let home = home_dir()?;
        let mut settings = load_settings(&self.file)?;

        if let SegmentAction::List = self.action {
            print_list(&settings);
            return Ok(());
        }

        let mut state = matching_state(&home, &self.file, &settings)?;
        let mut identity = match &state {
            Some(state) => state.segments.clone(),
            None => IdentityMap::from_segments(&settings.segments),
        };

        let message = apply(&mut settings, &mut identity, self.action)?;

        settings::save_at(&self.file, &settings)
            .with_context(|| format!("failed to write '{}'", self.file.display()))?;
        if let Some(state) = state.as_mut() {
            state.segments = identity;
            save_state(&home, &self.file, state)?;
        }

        println!("✓ {message}");
        Ok(())
    }
}

fn apply(
    settings: &mut PromotionSettings,
    identity: &mut IdentityMap,
    action: SegmentAction,
) -> Result<String> {
    let theme = settings.theme.clone();
    let mut editor = SegmentEditor::new(&mut settings.segments, identity);
    let message = match action {
        SegmentAction::List => String::new(),
        SegmentAction::Add { name: None, .. } => format!("Added '{}'", editor.add()),
        SegmentAction::Add {
            name: Some(name),
            category,
        } => {
            editor.add_named(&name, &category)?;
            format!("Added '{}'", name.trim())
        }
        SegmentAction::Remove { name } => {
            let removed = editor.remove(&name)?;
            match removed.id {
                Some(id) => format!("Removed '{name}' (#{id} is deleted on next sync)"),
                None => format!("Removed '{name}'"),
            }
        }
        SegmentAction::Rename { old, new } => {
            editor.rename(&old, &new)?;
            format!("Renamed '{old}' to '{new}'")
        }
        SegmentAction::Category { name, category } => {
            editor.set_category(&name, &category)?;
            format!("'{name}' now maps to '{category}'")
        }
        SegmentAction::Shuffle => {
            if editor.shuffle_categories(&mut rand::thread_rng()) {
                "Shuffled categories".to_string()
            } else {
                "Fewer than two categories assigned; nothing to shuffle".to_string()
            }
        }
        SegmentAction::Generate { theme: requested } => {
            let theme = requested.unwrap_or(theme);
            let count = editor.replace_with_generated(&theme);
            format!("Generated {count} segments for theme '{theme}'")
        }
    };
    Ok(message)
}

fn save_state(home: &Path, file: &Path, state: &promo_sync::SyncState) -> Result<()> {
    let key = settings::settings_key(file);
    state_store::save_at(home, &key, state)
        .with_context(|| format!("failed to save sync state for '{}'", file.display()))
}

fn print_list(settings: &PromotionSettings) {
    if settings.segments.is_empty() {
        println!("No segments in '{}'.", settings.name);
        return;
    }
    let rows: Vec<SegmentRow> = settings
        .segments
        .iter()
        .enumerate()
        .map(|(i, s)| SegmentRow {
            position: i + 1,
            name: s.name.clone(),
            category: s.category.clone(),
            id: s.id.map(|id| id.to_string()).unwrap_or_default(),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}
