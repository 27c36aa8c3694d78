//! # flagsync-loader
//!
//! Renders a human-authored project tree into a fresh, version-naive
//! [`Archive`]. Version numbers, tombstones, and data ids are the
//! reconciler's job — everything rendered here carries `version: 0`.
//!
//! # Project layout
//!
//! ```text
//! <project root>/
//!   project.yaml                  project key + display name
//!   flags/<flag key>.yaml         base flag definition (FlagSpec)
//!   segments/<segment key>.yaml   optional, passthrough wire objects
//!   environments/<env key>/
//!     env.yaml                    environment config (EnvSpec)
//!     <flag key>.yaml             optional override, replaces the base
//! ```

pub mod error;
pub mod spec;

use std::collections::BTreeMap;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::Value;

use flagsync_core::{Archive, EnvMetadata, Environment, Flag, Payload, SdkKey};

pub use error::LoadError;
pub use spec::{EnvSpec, FlagSpec, ProjectSpec};

use crate::error::io_err;

/// Render the archive for the project rooted at `root`.
///
/// Structural validation of the authored YAML happens here; the reconciler
/// is never handed a partially parsed archive.
pub fn load_project(root: &Path) -> Result<Archive, LoadError> {
    let project_path = root.join("project.yaml");
    if !project_path.exists() {
        return Err(LoadError::ProjectNotFound { path: project_path });
    }
    let project: ProjectSpec = read_yaml(&project_path)?;

    let base_flags = load_flag_specs(&root.join("flags"))?;
    let segments = load_segments(&root.join("segments"))?;

    let environments_dir = root.join("environments");
    let env_dirs = list_subdirs(&environments_dir)?;
    if env_dirs.is_empty() {
        return Err(LoadError::NoEnvironments {
            path: environments_dir,
        });
    }

    let mut environments = BTreeMap::new();
    let mut seen_ids: BTreeMap<String, String> = BTreeMap::new();
    for env_key in env_dirs {
        let env_dir = environments_dir.join(&env_key);
        let env = load_environment(&env_dir, &env_key, &project, &base_flags, &segments)?;
        // Archive documents are named by env id; a duplicate would make two
        // environments collide on the same files.
        if let Some(first) = seen_ids.insert(env.metadata.env_id.clone(), env_key.clone()) {
            return Err(LoadError::DuplicateEnvId {
                env_id: env.metadata.env_id.clone(),
                first,
                second: env_key,
            });
        }
        environments.insert(env_key, env);
    }

    Ok(Archive { environments })
}

fn load_environment(
    env_dir: &Path,
    env_key: &str,
    project: &ProjectSpec,
    base_flags: &BTreeMap<String, FlagSpec>,
    segments: &BTreeMap<String, Value>,
) -> Result<Environment, LoadError> {
    let config_path = env_dir.join("env.yaml");
    if !config_path.exists() {
        return Err(LoadError::EnvironmentConfigMissing {
            env: env_key.to_string(),
            path: config_path,
        });
    }
    let config: EnvSpec = read_yaml(&config_path)?;

    let overrides = load_flag_specs(env_dir)?;
    for key in overrides.keys() {
        if !base_flags.contains_key(key) {
            return Err(LoadError::UnknownOverride {
                env: env_key.to_string(),
                flag: key.clone(),
                path: env_dir.join(format!("{key}.yaml")),
            });
        }
    }

    let mut flags: BTreeMap<String, Flag> = BTreeMap::new();
    for (key, base) in base_flags {
        let spec = overrides.get(key).unwrap_or(base).clone();
        flags.insert(key.clone(), spec.into_flag(key)?);
    }

    Ok(Environment {
        metadata: EnvMetadata {
            env_id: config.env_id,
            env_key: env_key.to_string(),
            env_name: config.name,
            mob_key: config.mob_key,
            proj_key: project.key.clone(),
            proj_name: project.name.clone(),
            sdk_key: SdkKey {
                value: config.sdk_key,
            },
            default_ttl: config.ttl,
            secure_mode: config.secure_mode,
            version: 0,
            data_id: String::new(),
        },
        payload: Payload {
            segments: segments.clone(),
            flags,
        },
    })
}

/// All `<stem>.yaml` files in `dir` as [`FlagSpec`]s, keyed by stem.
///
/// `env.yaml` is the environment config, never a flag. A missing directory
/// is an empty map.
fn load_flag_specs(dir: &Path) -> Result<BTreeMap<String, FlagSpec>, LoadError> {
    let mut specs = BTreeMap::new();
    for (stem, path) in list_yaml_files(dir)? {
        if stem == "env" {
            continue;
        }
        specs.insert(stem, read_yaml(&path)?);
    }
    Ok(specs)
}

/// Segments are loaded as raw wire objects and carried through untouched.
fn load_segments(dir: &Path) -> Result<BTreeMap<String, Value>, LoadError> {
    let mut segments = BTreeMap::new();
    for (stem, path) in list_yaml_files(dir)? {
        segments.insert(stem, read_yaml(&path)?);
    }
    Ok(segments)
}

fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    serde_yaml::from_str(&contents).map_err(|e| LoadError::Parse {
        path: path.to_path_buf(),
        source: e,
    })
}

/// `(stem, path)` for every `*.yaml` directly under `dir`, sorted by name.
fn list_yaml_files(dir: &Path) -> Result<Vec<(String, std::path::PathBuf)>, LoadError> {
    if !dir.exists() {
        return Ok(vec![]);
    }
    let mut entries: Vec<_> = std::fs::read_dir(dir)
        .map_err(|e| io_err(dir, e))?
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_file()).unwrap_or(false))
        .collect();
    entries.sort_by_key(|e| e.file_name());

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("yaml") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        files.push((stem.to_string(), path));
    }
    Ok(files)
}

/// Names of all subdirectories of `dir`, sorted. Missing dir is empty.
fn list_subdirs(dir: &Path) -> Result<Vec<String>, LoadError> {
    if !dir.exists() {
        return Ok(vec![]);
    }
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map_err(|e| io_err(dir, e))?
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    Ok(names)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
