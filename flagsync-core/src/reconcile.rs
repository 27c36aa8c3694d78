//! Reconciliation engine — merges the last-published archive with a freshly
//! rendered one.
//!
//! The `new` side arrives version-naive (the loader knows nothing about
//! version history); this module resolves every version number, carries
//! deleted flags forward as tombstones, and recomputes each environment's
//! data id. Pure data transformation: no I/O, safe to re-run — a no-change
//! reconciliation reproduces the old archive's versions exactly.

use crate::error::ReconcileError;
use crate::keydiff::diff_keys;
use crate::types::{Archive, Environment, Flag};

/// Merge `old` (the last-published state) with `new` (the freshly rendered
/// desired state) into the archive that should be published.
///
/// Per environment key:
/// - only in `new`: environment and every flag start at version 1;
/// - only in `old`: no action — the environment is absent from the output
///   (deliberately unhandled; see DESIGN.md);
/// - in both: versions are carried from `old` and bumped by exactly 1 where
///   content (version-normalized) changed, flags missing from `new` are
///   carried forward as tombstones, and the data id is recomputed.
pub fn reconcile(old: &Archive, new: Archive) -> Result<Archive, ReconcileError> {
    let keys = diff_keys(&old.environments, &new.environments);
    let mut envs = new.environments;
    let mut out = Archive::new_empty();

    for key in keys.added {
        if let Some(env) = envs.remove(&key) {
            out.environments.insert(key, bootstrap_environment(env));
        }
    }

    for key in keys.existing {
        let (Some(prev), Some(env)) = (old.environments.get(&key), envs.remove(&key)) else {
            continue;
        };
        out.environments.insert(key, merge_environment(prev, env));
    }

    // keys.removed — environments present only in `old` — are dropped, not
    // tombstoned. Known gap, preserved as-is.

    Ok(out)
}

/// First publish of an environment: no history to consult.
fn bootstrap_environment(mut env: Environment) -> Environment {
    env.metadata.version = 1;
    for flag in env.payload.flags.values_mut() {
        flag.version = 1;
    }
    env.metadata.data_id = env.derived_data_id();
    env
}

/// Merge one environment that exists on both sides.
fn merge_environment(prev: &Environment, mut next: Environment) -> Environment {
    // The loader has no notion of versions; the old record is the baseline.
    next.metadata.version = prev.metadata.version;
    next.metadata.data_id = prev.metadata.data_id.clone();
    if !next.metadata.content_equal(&prev.metadata) {
        next.metadata.version += 1;
    }

    let keys = diff_keys(&prev.payload.flags, &next.payload.flags);

    for key in &keys.added {
        if let Some(flag) = next.payload.flags.get_mut(key) {
            flag.version = 1;
        }
    }

    for key in &keys.existing {
        let Some(old_flag) = prev.payload.flags.get(key) else {
            continue;
        };
        if let Some(flag) = next.payload.flags.get_mut(key) {
            flag.version = old_flag.version;
            if !flag.content_equal(old_flag) {
                flag.version += 1;
            }
        }
    }

    for key in &keys.removed {
        if let Some(old_flag) = prev.payload.flags.get(key) {
            next.payload
                .flags
                .insert(key.clone(), tombstone(old_flag.clone()));
        }
    }

    next.metadata.data_id = next.derived_data_id();
    next
}

/// A flag removed from the authored definitions stays in the archive as a
/// tombstone: the relay needs the key present with `deleted: true` and a
/// bumped version so streaming clients invalidate it.
fn tombstone(mut flag: Flag) -> Flag {
    flag.version += 1;
    flag.deleted = true;
    flag
}
