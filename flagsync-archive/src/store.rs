//! Archive stores — where the previously published archive comes from and
//! where the reconciled one goes.
//!
//! [`FileStore`] reads and atomically writes a local `.tar.gz`;
//! [`HttpStore`] is a read-only source for relays that serve their current
//! archive over HTTP. "Not found" is a distinguishable variant so the
//! pipeline can substitute an empty archive on first publish.

use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;

use flagsync_core::Archive;

use crate::codec;
use crate::error::{io_err, StoreError};

/// Fetch/persist boundary for published archives.
pub trait ArchiveStore {
    /// Human-readable location, for logs and error context.
    fn location(&self) -> String;

    /// The last-published archive, or [`StoreError::NotFound`] if nothing
    /// has ever been published here. Any other error must abort the run.
    fn fetch_existing(&self) -> Result<Archive, StoreError>;

    /// Persist the reconciled archive as the new published state.
    fn save_new(&self, archive: &Archive) -> Result<(), StoreError>;
}

/// Pick a store implementation from a location string.
///
/// `http://`/`https://` locations fetch over HTTP (read-only); anything
/// else is a local filesystem path.
pub fn store_for(location: &str) -> Box<dyn ArchiveStore> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Box::new(HttpStore::new(location))
    } else {
        Box::new(FileStore::new(location))
    }
}

// ---------------------------------------------------------------------------
// FileStore
// ---------------------------------------------------------------------------

/// A published archive at a local filesystem path.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ArchiveStore for FileStore {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch_existing(&self) -> Result<Archive, StoreError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotFound {
                    location: self.location(),
                })
            }
            Err(err) => return Err(io_err(self.location(), err)),
        };
        Ok(codec::decode(&bytes)?)
    }

    /// Write to a `.tmp` sibling, then rename — the published archive is
    /// swapped as a unit, never observed half-written.
    fn save_new(&self, archive: &Archive) -> Result<(), StoreError> {
        let bytes = codec::encode(archive)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| io_err(parent.display().to_string(), e))?;
            }
        }

        let tmp = PathBuf::from(format!("{}.tmp", self.path.display()));
        std::fs::write(&tmp, &bytes).map_err(|e| io_err(tmp.display().to_string(), e))?;
        if let Err(err) = std::fs::rename(&tmp, &self.path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(io_err(self.location(), err));
        }
        tracing::info!("wrote archive: {}", self.path.display());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// HttpStore
// ---------------------------------------------------------------------------

/// Overall request deadline — a hung relay must not stall the run.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// A read-only archive source fetched over HTTP.
#[derive(Debug, Clone)]
pub struct HttpStore {
    url: String,
    timeout: Duration,
}

impl HttpStore {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_timeout(url, HTTP_TIMEOUT)
    }

    /// Same store with a caller-chosen request deadline.
    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            timeout,
        }
    }
}

impl ArchiveStore for HttpStore {
    fn location(&self) -> String {
        self.url.clone()
    }

    fn fetch_existing(&self) -> Result<Archive, StoreError> {
        let agent = ureq::AgentBuilder::new().timeout(self.timeout).build();
        let response = agent.get(&self.url).call().map_err(|err| match err {
            ureq::Error::Status(404, _) => StoreError::NotFound {
                location: self.url.clone(),
            },
            other => StoreError::Http {
                url: self.url.clone(),
                source: Box::new(other),
            },
        })?;

        let mut bytes = Vec::new();
        response
            .into_reader()
            .read_to_end(&mut bytes)
            .map_err(|e| io_err(self.url.clone(), e))?;
        Ok(codec::decode(&bytes)?)
    }

    fn save_new(&self, _archive: &Archive) -> Result<(), StoreError> {
        Err(StoreError::ReadOnly {
            location: self.url.clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
