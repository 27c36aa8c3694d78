//! `flagsync sync` — reconcile and publish the project's archive.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;

use flagsync_archive::{pipeline, store_for, SyncSummary};

/// Arguments for `flagsync sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Project root containing project.yaml, flags/, environments/.
    #[arg(long, env = "FLAGSYNC_PROJECT")]
    pub project: PathBuf,

    /// Location of the last-published archive (path or http(s) URL).
    #[arg(long, env = "FLAGSYNC_SOURCE")]
    pub source: String,

    /// Where to publish (defaults to the source when it is a local path).
    #[arg(long, env = "FLAGSYNC_DEST")]
    pub dest: Option<String>,

    /// Reconcile and report without publishing anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let dest = match self.dest {
            Some(dest) => dest,
            None if self.source.starts_with("http://") || self.source.starts_with("https://") => {
                bail!("--dest (or FLAGSYNC_DEST) is required when the source is a URL")
            }
            None => self.source.clone(),
        };

        let source_store = store_for(&self.source);
        let dest_store = store_for(&dest);
        let summary = pipeline::run(
            &self.project,
            source_store.as_ref(),
            dest_store.as_ref(),
            self.dry_run,
        )
        .with_context(|| format!("sync failed for project {}", self.project.display()))?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&summary).context("failed to serialize summary")?
            );
            return Ok(());
        }

        print_summary(&summary, &dest);
        Ok(())
    }
}

fn print_summary(summary: &SyncSummary, dest: &str) {
    let prefix = if summary.dry_run { "[dry-run] " } else { "" };
    for env in &summary.environments {
        println!(
            "{prefix}✓ '{}' v{} (data id {}, {} flags, {} tombstones, {} segments)",
            env.env_key, env.version, env.data_id, env.flags, env.tombstones, env.segments
        );
    }
    for env in &summary.removed_environments {
        println!(
            "{prefix}{} environment '{env}' removed from the project; dropped from the archive",
            "!".yellow()
        );
    }
    if summary.dry_run {
        println!("{prefix}would publish to {dest}");
    } else {
        println!("✓ published to {dest}");
    }
}
