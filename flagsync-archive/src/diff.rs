//! Pre-publish review: unified diffs of what `sync` would change.
//!
//! Renders the same JSON documents the codec packs, so the diff shows
//! exactly the bytes that would land in the published archive. No files
//! are written.

use std::collections::BTreeSet;
use std::path::Path;

use similar::TextDiff;

use flagsync_core::{reconcile, Archive};
use flagsync_loader::load_project;

use crate::codec;
use crate::error::SyncError;
use crate::pipeline::fetch_or_empty;
use crate::store::ArchiveStore;

/// A single changed archive document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    pub file: String,
    pub unified_diff: String,
}

/// Diff the reconciled result of `project_root` against the archive at
/// `source`, without publishing anything.
pub fn diff_project(
    project_root: &Path,
    source: &dyn ArchiveStore,
) -> Result<Vec<FileDiff>, SyncError> {
    let rendered = load_project(project_root)?;
    let old = fetch_or_empty(source)?;
    let reconciled = reconcile(&old, rendered)?;
    diff_archives(&old, &reconciled)
}

/// Document-level unified diffs between two archives.
pub fn diff_archives(old: &Archive, new: &Archive) -> Result<Vec<FileDiff>, SyncError> {
    let old_docs = codec::documents(old)?;
    let new_docs = codec::documents(new)?;

    let names: BTreeSet<&String> = old_docs.keys().chain(new_docs.keys()).collect();
    let mut diffs = Vec::new();
    for name in names {
        let before = doc_text(old_docs.get(name.as_str()));
        let after = doc_text(new_docs.get(name.as_str()));
        if before == after {
            continue;
        }

        let old_header = format!("a/{name}");
        let new_header = format!("b/{name}");
        let unified = TextDiff::from_lines(&before, &after)
            .unified_diff()
            .header(&old_header, &new_header)
            .context_radius(3)
            .to_string();

        diffs.push(FileDiff {
            file: (*name).clone(),
            unified_diff: unified,
        });
    }
    Ok(diffs)
}

fn doc_text(doc: Option<&Vec<u8>>) -> String {
    doc.map(|bytes| String::from_utf8_lossy(bytes).into_owned())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
