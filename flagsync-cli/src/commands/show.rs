//! `flagsync show` — inspect a published archive.

use anyhow::{Context, Result};
use clap::Args;
use tabled::{settings::Style, Table, Tabled};

use flagsync_archive::store_for;
use flagsync_core::Archive;

/// Arguments for `flagsync show`.
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Archive location (path or http(s) URL).
    pub archive: String,

    /// Emit the full archive as JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

#[derive(Tabled)]
struct EnvRow {
    #[tabled(rename = "environment")]
    environment: String,
    #[tabled(rename = "version")]
    version: u64,
    #[tabled(rename = "data id")]
    data_id: String,
    #[tabled(rename = "flags")]
    flags: usize,
    #[tabled(rename = "tombstones")]
    tombstones: usize,
    #[tabled(rename = "segments")]
    segments: usize,
}

impl ShowArgs {
    pub fn run(self) -> Result<()> {
        let store = store_for(&self.archive);
        let archive = store
            .fetch_existing()
            .with_context(|| format!("failed to fetch archive from {}", self.archive))?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&archive).context("failed to serialize archive")?
            );
            return Ok(());
        }

        print_table(&archive);
        Ok(())
    }
}

fn print_table(archive: &Archive) {
    if archive.environments.is_empty() {
        println!("Archive is empty.");
        return;
    }

    let rows: Vec<EnvRow> = archive
        .environments
        .values()
        .map(|env| {
            let tombstones = env.payload.flags.values().filter(|f| f.deleted).count();
            EnvRow {
                environment: env.metadata.env_key.clone(),
                version: env.metadata.version,
                data_id: env.metadata.data_id.clone(),
                flags: env.payload.flags.len() - tombstones,
                tombstones,
                segments: env.payload.segments.len(),
            }
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}
