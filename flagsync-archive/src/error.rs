//! Error types for flagsync-archive.

use thiserror::Error;

use flagsync_core::ReconcileError;
use flagsync_loader::LoadError;

/// Errors from the wire codec (tar+gzip pack/unpack and JSON documents).
#[derive(Debug, Error)]
pub enum CodecError {
    /// Underlying I/O failure while packing or unpacking the tarball.
    #[error("archive I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON document inside the archive failed to serialize/parse.
    #[error("JSON error in {name}: {source}")]
    Json {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    /// Two environments share an env id, so they map to the same document
    /// filenames; encoding would drop one of them.
    #[error("duplicate envId '{env_id}': two environments map to the same archive documents")]
    DuplicateEnvId { env_id: String },

    /// A `<envId>-data.json` payload without its `<envId>.json` metadata.
    #[error("data file {data_file} has no matching metadata file")]
    MissingMetadata { data_file: String },

    /// The stored checksum does not match the archive contents.
    #[error("checksum mismatch: archive says {expected}, contents hash to {actual}")]
    ChecksumMismatch { expected: String, actual: String },
}

/// Errors from an [`ArchiveStore`](crate::store::ArchiveStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// No archive has ever been published at this location.
    ///
    /// The only recoverable store error: callers substitute an empty
    /// archive and proceed with first publish.
    #[error("no archive found at {location}")]
    NotFound { location: String },

    /// The fetched bytes were not a valid archive, or encoding failed.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// An I/O error, with the store location for context.
    #[error("I/O error at {location}: {source}")]
    Io {
        location: String,
        #[source]
        source: std::io::Error,
    },

    /// An HTTP transport or non-404 status error.
    #[error("HTTP error fetching {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: Box<ureq::Error>,
    },

    /// The store can fetch but not publish (HTTP sources).
    #[error("{location} is a read-only archive source")]
    ReadOnly { location: String },
}

/// Convenience constructor for [`StoreError::Io`].
pub(crate) fn io_err(location: impl Into<String>, source: std::io::Error) -> StoreError {
    StoreError::Io {
        location: location.into(),
        source,
    }
}

/// All errors that can arise from a sync pipeline run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The project tree failed to load or validate.
    #[error("project load error: {0}")]
    Load(#[from] LoadError),

    /// The reconciliation engine failed (no defined cause today).
    #[error("reconcile error: {0}")]
    Reconcile(#[from] ReconcileError),

    /// Fetch or publish failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Serializing archive documents failed.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
}
