//! Promo: promotion settings CLI for admins and sellers.
//!
//! # Usage
//!
//! ```text
//! promo init <file> [--name <name>]
//! promo pull <promotion-id> <file> [--force]
//! promo sync <file> [--dry-run] [--reload] [--fail-fast]
//! promo diff <file>
//! promo status <file>... [--json]
//! promo forget <file>
//! promo check <file>
//! promo segments <file> list|add|remove|rename|category|shuffle|generate
//! promo slots <promotion-id> <segment-id>
//! promo bid <promotion-id> <segment-id> --position <n> (--amount <x> | --fixed) --product <id>
//! promo moderation list|approve|reject|approve-clean
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    bid::{BidArgs, SlotsArgs},
    check::CheckArgs,
    diff::DiffArgs,
    forget::ForgetArgs,
    init::InitArgs,
    moderation::ModerationArgs,
    pull::PullArgs,
    segments::SegmentsArgs,
    status::StatusArgs,
    sync::SyncArgs,
    Remote,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "promo",
    version,
    about = "Edit promotion settings locally and sync them to the promotion service",
    long_about = None,
)]
struct Cli {
    /// Log progress (overridden by RUST_LOG).
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Service root URL; defaults to PROMO_API_BASE_URL.
    #[arg(long, global = true, value_name = "URL")]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a settings file with default values.
    Init(InitArgs),

    /// Load an existing promotion into a settings file.
    Pull(PullArgs),

    /// Save a settings file to the promotion service.
    Sync(SyncArgs),

    /// Show a unified diff between the service and a settings file.
    Diff(DiffArgs),

    /// Show whether settings files changed since their last sync.
    Status(StatusArgs),

    /// Drop the recorded sync state of a settings file.
    Forget(ForgetArgs),

    /// Check that a promotion is ready to start.
    Check(CheckArgs),

    /// Edit the segment list of a settings file.
    Segments(SegmentsArgs),

    /// List the slots of a segment.
    Slots(SlotsArgs),

    /// Bid on an auction slot or buy a fixed-price slot.
    Bid(BidArgs),

    /// Review seller applications of a promotion.
    Moderation(ModerationArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let remote = Remote {
        base_url: cli.base_url,
    };
    match cli.command {
        Commands::Init(args) => args.run(),
        Commands::Pull(args) => args.run(&remote),
        Commands::Sync(args) => args.run(&remote),
        Commands::Diff(args) => args.run(&remote),
        Commands::Status(args) => args.run(),
        Commands::Forget(args) => args.run(),
        Commands::Check(args) => args.run(),
        Commands::Segments(args) => args.run(),
        Commands::Slots(args) => args.run(&remote),
        Commands::Bid(args) => args.run(&remote),
        Commands::Moderation(args) => args.run(&remote),
    }
}

/// Library crates log through the `log` facade; the subscriber picks those
/// records up as well.
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
