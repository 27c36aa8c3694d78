//! `flagsync diff` — preview what sync would publish.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use flagsync_archive::{diff_project, store_for};

/// Arguments for `flagsync diff`.
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// Project root containing project.yaml, flags/, environments/.
    #[arg(long, env = "FLAGSYNC_PROJECT")]
    pub project: PathBuf,

    /// Location of the last-published archive (path or http(s) URL).
    #[arg(long, env = "FLAGSYNC_SOURCE")]
    pub source: String,
}

impl DiffArgs {
    pub fn run(self) -> Result<()> {
        let store = store_for(&self.source);
        let diffs = diff_project(&self.project, store.as_ref())
            .with_context(|| format!("diff failed for project {}", self.project.display()))?;

        if diffs.is_empty() {
            println!("No changes.");
            return Ok(());
        }

        for diff in &diffs {
            println!("{}", diff.file.bold());
            print!("{}", diff.unified_diff);
            println!();
        }
        println!("{} document(s) would change", diffs.len());
        Ok(())
    }
}
