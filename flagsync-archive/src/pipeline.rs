//! The sequential sync pipeline: load → fetch → reconcile → publish.
//!
//! One invocation is one unit of work; the only I/O is the store fetch at
//! the start and the atomic publish at the end.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use flagsync_core::{diff_keys, reconcile, Archive, Environment};
use flagsync_loader::load_project;

use crate::error::{StoreError, SyncError};
use crate::store::ArchiveStore;

/// Per-environment slice of a [`SyncSummary`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvReport {
    pub env_key: String,
    pub version: u64,
    pub data_id: String,
    /// Live (non-tombstone) flags.
    pub flags: usize,
    pub tombstones: usize,
    pub segments: usize,
}

/// Outcome of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncSummary {
    pub environments: Vec<EnvReport>,
    /// Environments present in the old archive but absent from the project
    /// tree. They are dropped from the published archive, not tombstoned.
    pub removed_environments: Vec<String>,
    /// When the archive was published; `None` on a dry run.
    pub published_at: Option<DateTime<Utc>>,
    pub dry_run: bool,
}

/// Run the full pipeline for the project at `project_root`.
///
/// Fetches the last-published archive from `source` (a missing archive
/// means first publish), reconciles it with the freshly rendered project,
/// and publishes the result to `dest` unless `dry_run` is set.
pub fn run(
    project_root: &Path,
    source: &dyn ArchiveStore,
    dest: &dyn ArchiveStore,
    dry_run: bool,
) -> Result<SyncSummary, SyncError> {
    let rendered = load_project(project_root)?;
    tracing::debug!(
        "rendered {} environment(s) from {}",
        rendered.environments.len(),
        project_root.display()
    );

    let existing = fetch_or_empty(source)?;
    let removed_environments: Vec<String> =
        diff_keys(&existing.environments, &rendered.environments)
            .removed
            .into_iter()
            .collect();
    for env in &removed_environments {
        tracing::warn!("environment '{env}' no longer in the project; dropping from the archive");
    }

    let reconciled = reconcile(&existing, rendered)?;
    let environments = reconciled.environments.values().map(report).collect();

    let published_at = if dry_run {
        tracing::info!("[dry-run] skipping publish to {}", dest.location());
        None
    } else {
        dest.save_new(&reconciled)?;
        tracing::info!("published archive to {}", dest.location());
        Some(Utc::now())
    };

    Ok(SyncSummary {
        environments,
        removed_environments,
        published_at,
        dry_run,
    })
}

/// Fetch the existing archive, treating "not found" as first publish.
pub fn fetch_or_empty(store: &dyn ArchiveStore) -> Result<Archive, StoreError> {
    match store.fetch_existing() {
        Ok(archive) => Ok(archive),
        Err(StoreError::NotFound { location }) => {
            tracing::info!("no existing archive at {location}; starting from empty");
            Ok(Archive::new_empty())
        }
        Err(err) => Err(err),
    }
}

fn report(env: &Environment) -> EnvReport {
    let tombstones = env.payload.flags.values().filter(|f| f.deleted).count();
    EnvReport {
        env_key: env.metadata.env_key.clone(),
        version: env.metadata.version,
        data_id: env.metadata.data_id.clone(),
        flags: env.payload.flags.len() - tombstones,
        tombstones,
        segments: env.payload.segments.len(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
