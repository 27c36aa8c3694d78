//! flagsync — publish authored feature-flag YAML as a relay archive.
//!
//! # Usage
//!
//! ```text
//! flagsync sync --project <dir> --source <path|url> [--dest <path>] [--dry-run] [--json]
//! flagsync diff --project <dir> --source <path|url>
//! flagsync show <path|url> [--json]
//! flagsync validate --project <dir>
//! ```
//!
//! `--project`, `--source`, and `--dest` fall back to the
//! `FLAGSYNC_PROJECT`, `FLAGSYNC_SOURCE`, and `FLAGSYNC_DEST` environment
//! variables.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{diff::DiffArgs, show::ShowArgs, sync::SyncArgs, validate::ValidateArgs};

#[derive(Parser, Debug)]
#[command(
    name = "flagsync",
    version,
    about = "Synchronize feature-flag YAML definitions into a relay archive",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Reconcile the project against the published archive and publish.
    Sync(SyncArgs),

    /// Show unified diffs of what sync would publish.
    Diff(DiffArgs),

    /// Inspect a published archive.
    Show(ShowArgs),

    /// Check that the project tree loads and validates.
    Validate(ValidateArgs),
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Commands::Sync(args) => args.run(),
        Commands::Diff(args) => args.run(),
        Commands::Show(args) => args.run(),
        Commands::Validate(args) => args.run(),
    }
}
