//! # flagsync-archive
//!
//! Wire codec, archive stores, and the sync pipeline.
//!
//! Call [`pipeline::run`] to load a project, reconcile it against the
//! last-published archive, and publish the result; [`diff::diff_project`]
//! previews the same change as unified diffs without writing anything.

pub mod codec;
pub mod diff;
pub mod error;
pub mod pipeline;
pub mod store;

pub use diff::{diff_archives, diff_project, FileDiff};
pub use error::{CodecError, StoreError, SyncError};
pub use pipeline::{fetch_or_empty, run, EnvReport, SyncSummary};
pub use store::{store_for, ArchiveStore, FileStore, HttpStore};
