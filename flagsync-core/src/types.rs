//! Wire-format data model for the published flag archive.
//!
//! Field names serialize in the camelCase shape the downstream relay
//! consumes. Environments, flags and segments live in `BTreeMap`s so every
//! serialization of the same archive is byte-identical.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Archive
// ---------------------------------------------------------------------------

/// The top-level published artifact: one [`Environment`] per environment key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Archive {
    pub environments: BTreeMap<String, Environment>,
}

impl Archive {
    /// An archive with zero environments.
    ///
    /// Used as the `old` side of reconciliation when the store reports that
    /// no archive has ever been published, so that first publish goes
    /// through the ordinary "new environment" path.
    pub fn new_empty() -> Self {
        Self::default()
    }
}

// ---------------------------------------------------------------------------
// Environment
// ---------------------------------------------------------------------------

/// One flag-serving environment: identifying metadata plus the flag/segment
/// payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    pub metadata: EnvMetadata,
    pub payload: Payload,
}

impl Environment {
    /// Structural equality with all version bookkeeping normalized away.
    ///
    /// Compares metadata (ignoring `version` and `data_id`), every flag
    /// (ignoring each flag's `version`), and segments verbatim.
    pub fn content_equal(&self, other: &Environment) -> bool {
        self.metadata.content_equal(&other.metadata) && self.payload.content_equal(&other.payload)
    }

    /// Derive the revision token for this environment.
    ///
    /// Decimal string of the environment version plus the sum of all flag
    /// versions; changes whenever any contained version changes, even if the
    /// metadata itself did not.
    pub fn derived_data_id(&self) -> String {
        let total = self.metadata.version
            + self
                .payload
                .flags
                .values()
                .map(|f| f.version)
                .sum::<u64>();
        total.to_string()
    }
}

/// Identifying/config fields for an environment, as serialized into the
/// `<envId>.json` metadata document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvMetadata {
    pub env_id: String,
    pub env_key: String,
    pub env_name: String,
    pub mob_key: String,
    pub proj_key: String,
    pub proj_name: String,
    pub sdk_key: SdkKey,
    pub default_ttl: u32,
    pub secure_mode: bool,
    pub version: u64,
    pub data_id: String,
}

impl EnvMetadata {
    /// Field-wise equality ignoring `version` and the derived `data_id`.
    pub fn content_equal(&self, other: &EnvMetadata) -> bool {
        let mut a = self.clone();
        let mut b = other.clone();
        a.version = 0;
        b.version = 0;
        a.data_id = String::new();
        b.data_id = String::new();
        a == b
    }
}

/// The SDK key sub-object of the metadata document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SdkKey {
    pub value: String,
}

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// Flags and segments for one environment, as serialized into the
/// `<envId>-data.json` document.
///
/// Segments are carried through as raw wire objects; this tool never
/// reconciles them beyond passthrough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Payload {
    pub segments: BTreeMap<String, Value>,
    pub flags: BTreeMap<String, Flag>,
}

impl Payload {
    /// Flag-by-flag content equality (versions ignored), segments verbatim.
    pub fn content_equal(&self, other: &Payload) -> bool {
        if self.segments != other.segments || self.flags.len() != other.flags.len() {
            return false;
        }
        self.flags.iter().all(|(key, flag)| {
            other
                .flags
                .get(key)
                .is_some_and(|o| flag.content_equal(o))
        })
    }
}

// ---------------------------------------------------------------------------
// Flag
// ---------------------------------------------------------------------------

/// One feature flag's fully realized targeting configuration for a single
/// environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flag {
    pub key: String,
    pub on: bool,
    pub variations: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub off_variation: Option<usize>,
    pub fallthrough: Fallthrough,
    pub salt: String,
    pub version: u64,
    pub deleted: bool,
}

impl Flag {
    /// Structural equality ignoring `version`.
    ///
    /// Two independently constructed but field-identical flags compare
    /// equal; a differing `deleted` marker counts as a content change.
    pub fn content_equal(&self, other: &Flag) -> bool {
        let mut a = self.clone();
        let mut b = other.clone();
        a.version = 0;
        b.version = 0;
        a == b
    }
}

/// Default/fallthrough behavior: either a fixed variation index or a
/// percentage rollout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Fallthrough {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variation: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rollout: Option<Rollout>,
}

/// A percentage rollout across variation indices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rollout {
    pub variations: Vec<WeightedVariation>,
}

/// One slice of a rollout. Weights are in units of 0.001% and sum to
/// 100_000 across a rollout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightedVariation {
    pub variation: usize,
    pub weight: u32,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn boolean_flag(key: &str, on: bool, version: u64) -> Flag {
        Flag {
            key: key.to_string(),
            on,
            variations: vec![json!(true), json!(false)],
            off_variation: Some(1),
            fallthrough: Fallthrough {
                variation: Some(0),
                rollout: None,
            },
            salt: key.to_string(),
            version,
            deleted: false,
        }
    }

    fn metadata(key: &str, version: u64) -> EnvMetadata {
        EnvMetadata {
            env_id: format!("{key}-id"),
            env_key: key.to_string(),
            env_name: key.to_string(),
            mob_key: "mob".to_string(),
            proj_key: "demo".to_string(),
            proj_name: "Demo".to_string(),
            sdk_key: SdkKey {
                value: "sdk-secret".to_string(),
            },
            default_ttl: 5,
            secure_mode: false,
            version,
            data_id: version.to_string(),
        }
    }

    #[test]
    fn flag_content_equal_ignores_version() {
        let a = boolean_flag("f1", true, 3);
        let b = boolean_flag("f1", true, 9);
        assert!(a.content_equal(&b));
        assert_ne!(a, b, "plain equality must still see the version");
    }

    #[test]
    fn flag_content_equal_sees_deleted_marker() {
        let a = boolean_flag("f1", true, 3);
        let mut b = boolean_flag("f1", true, 3);
        b.deleted = true;
        assert!(!a.content_equal(&b));
    }

    #[test]
    fn metadata_content_equal_ignores_version_and_data_id() {
        let a = metadata("production", 2);
        let b = metadata("production", 7);
        assert!(a.content_equal(&b));
    }

    #[test]
    fn metadata_content_equal_sees_field_change() {
        let a = metadata("production", 2);
        let mut b = metadata("production", 2);
        b.default_ttl = 60;
        assert!(!a.content_equal(&b));
    }

    #[test]
    fn data_id_sums_environment_and_flag_versions() {
        let mut flags = BTreeMap::new();
        flags.insert("f1".to_string(), boolean_flag("f1", true, 3));
        flags.insert("f2".to_string(), boolean_flag("f2", false, 4));
        let env = Environment {
            metadata: metadata("production", 2),
            payload: Payload {
                segments: BTreeMap::new(),
                flags,
            },
        };
        assert_eq!(env.derived_data_id(), "9");
    }

    #[test]
    fn payload_content_equal_is_deep() {
        let mut a = Payload::default();
        a.flags
            .insert("f1".to_string(), boolean_flag("f1", true, 1));
        let mut b = Payload::default();
        b.flags
            .insert("f1".to_string(), boolean_flag("f1", true, 5));
        assert!(a.content_equal(&b));

        b.flags.get_mut("f1").unwrap().on = false;
        assert!(!a.content_equal(&b));
    }

    #[test]
    fn flag_serializes_camel_case() {
        let flag = boolean_flag("f1", true, 1);
        let doc = serde_json::to_value(&flag).unwrap();
        assert_eq!(doc["offVariation"], json!(1));
        assert_eq!(doc["fallthrough"]["variation"], json!(0));
        assert!(doc.get("off_variation").is_none());
    }
}
