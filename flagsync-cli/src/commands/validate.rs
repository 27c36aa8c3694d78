//! `flagsync validate` — load the project tree without touching any store.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use flagsync_loader::load_project;

/// Arguments for `flagsync validate`.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Project root containing project.yaml, flags/, environments/.
    #[arg(long, env = "FLAGSYNC_PROJECT")]
    pub project: PathBuf,
}

impl ValidateArgs {
    pub fn run(self) -> Result<()> {
        let archive = load_project(&self.project)
            .with_context(|| format!("validation failed for {}", self.project.display()))?;

        let flags = archive
            .environments
            .values()
            .next()
            .map(|env| env.payload.flags.len())
            .unwrap_or(0);
        println!(
            "{} project ok ({} environments, {} flags)",
            "✓".green(),
            archive.environments.len(),
            flags
        );
        Ok(())
    }
}
