//! Error types for flagsync-loader.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while rendering a project tree into an archive.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Underlying I/O failure, with the offending path.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error on load — includes file path and line context from serde_yaml.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `project.yaml` missing at the project root.
    #[error("project file not found at {path}")]
    ProjectNotFound { path: PathBuf },

    /// An environment directory without an `env.yaml`.
    #[error("environment '{env}' has no env.yaml at {path}")]
    EnvironmentConfigMissing { env: String, path: PathBuf },

    /// The project defines no environments — there is nothing to publish.
    #[error("no environment directories under {path}")]
    NoEnvironments { path: PathBuf },

    /// A rollout percentage outside 0–100.
    #[error("flag '{flag}': rollout percentage {value} is outside 0–100")]
    InvalidPercentage { flag: String, value: f64 },

    /// Two environment configs carrying the same `envId`. The archive holds
    /// one document pair per id, so one environment would silently vanish.
    #[error("environments '{first}' and '{second}' both declare envId '{env_id}'")]
    DuplicateEnvId {
        env_id: String,
        first: String,
        second: String,
    },

    /// A per-environment override file with no matching base flag.
    #[error("environment '{env}' overrides unknown flag '{flag}' ({path})")]
    UnknownOverride {
        env: String,
        flag: String,
        path: PathBuf,
    },
}

/// Convenience constructor for [`LoadError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> LoadError {
    LoadError::Io {
        path: path.into(),
        source,
    }
}
