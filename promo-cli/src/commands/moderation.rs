//! `promo moderation <action>`: review seller applications of a promotion.

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand, ValueEnum};
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use promo_client::AdminClient;
use promo_core::{
    moderation::{statistics, Application, ApplicationId, ApplicationStatus},
    PromotionId,
};

use super::Remote;

#[derive(Args, Debug)]
pub struct ModerationArgs {
    #[command(subcommand)]
    pub action: ModerationAction,
}

#[derive(Subcommand, Debug)]
pub enum ModerationAction {
    /// List applications of a promotion with per-status counts.
    List {
        promotion: i64,
        #[arg(long, value_enum, default_value_t = StatusFilter::All)]
        status: StatusFilter,
    },

    /// Approve one application.
    Approve { application: i64 },

    /// Reject one application.
    Reject {
        application: i64,
        #[arg(long, short = 'r')]
        reason: String,
    },

    /// Approve every pending application without stop factors.
    ApproveClean { promotion: i64 },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    All,
    Pending,
    Approved,
    Rejected,
}

impl StatusFilter {
    fn status(self) -> Option<ApplicationStatus> {
        match self {
            Self::All => None,
            Self::Pending => Some(ApplicationStatus::Pending),
            Self::Approved => Some(ApplicationStatus::Approved),
            Self::Rejected => Some(ApplicationStatus::Rejected),
        }
    }
}

#[derive(Tabled)]
struct ApplicationRow {
    #[tabled(rename = "id")]
    id: i64,
    #[tabled(rename = "seller")]
    seller: i64,
    #[tabled(rename = "segment")]
    segment: i64,
    #[tabled(rename = "product")]
    product: String,
    #[tabled(rename = "price")]
    price: i64,
    #[tabled(rename = "discount")]
    discount: String,
    #[tabled(rename = "stop factors")]
    stop_factors: String,
    #[tabled(rename = "status")]
    status: String,
}

impl ModerationArgs {
    pub fn run(self, remote: &Remote) -> Result<()> {
        let admin = AdminClient::new(&remote.config()?);
        match self.action {
            ModerationAction::List { promotion, status } => {
                let id = PromotionId(promotion);
                let apps = admin
                    .applications(id, status.status())
                    .with_context(|| format!("failed to list applications of promotion {id}"))?;
                print_list(&apps);
            }
            ModerationAction::Approve { application } => {
                let id = ApplicationId(application);
                admin
                    .approve_application(id)
                    .with_context(|| format!("failed to approve application {id}"))?;
                println!("{} Application {id} approved", "✓".green());
            }
            ModerationAction::Reject {
                application,
                reason,
            } => {
                let reason = reason.trim();
                if reason.is_empty() {
                    bail!("a rejection reason is required");
                }
                let id = ApplicationId(application);
                admin
                    .reject_application(id, reason)
                    .with_context(|| format!("failed to reject application {id}"))?;
                println!("{} Application {id} rejected: {reason}", "✓".green());
            }
            ModerationAction::ApproveClean { promotion } => {
                let id = PromotionId(promotion);
                let result = admin
                    .approve_clean(id)
                    .with_context(|| format!("failed to load applications of promotion {id}"))?;
                println!(
                    "{} {} approved, {} left for review",
                    "✓".green(),
                    result.approved.len(),
                    result.flagged
                );
                for (app, error) in &result.failed {
                    println!("  {} {app}: {error}", "✗".red());
                }
                if !result.failed.is_empty() {
                    bail!("{} approval(s) failed", result.failed.len());
                }
            }
        }
        Ok(())
    }
}

fn print_list(apps: &[Application]) {
    let stats = statistics(apps);
    println!(
        "{} applications | {} pending | {} approved | {} rejected",
        stats.total, stats.pending, stats.approved, stats.rejected
    );
    if apps.is_empty() {
        return;
    }
    let rows: Vec<ApplicationRow> = apps
        .iter()
        .map(|app| ApplicationRow {
            id: app.id.0,
            seller: app.seller_id,
            segment: app.segment_id.0,
            product: app.product_name.clone(),
            price: app.price,
            discount: format!("{}%", app.discount),
            stop_factors: if app.stop_factors.is_empty() {
                "—".to_string()
            } else {
                app.stop_factors.join(", ").red().to_string()
            },
            status: status_label(app.status),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}

fn status_label(status: ApplicationStatus) -> String {
    match status {
        ApplicationStatus::Pending => status.as_str().yellow().to_string(),
        ApplicationStatus::Approved => status.as_str().green().to_string(),
        ApplicationStatus::Rejected => status.as_str().red().to_string(),
    }
}
