//! Authored YAML schema for flags, environments, and the project index.
//!
//! Flag kinds are a tagged enum with a single exhaustive conversion to the
//! wire format — adding a kind means the compiler walks you to every match.

use serde::{Deserialize, Serialize};
use serde_json::json;

use flagsync_core::{Fallthrough, Flag, Rollout, WeightedVariation};

use crate::error::LoadError;

/// Rollout weights are in units of 0.001%.
const WEIGHT_SCALE: f64 = 1000.0;
const FULL_WEIGHT: u32 = 100_000;

// ---------------------------------------------------------------------------
// Flag definitions
// ---------------------------------------------------------------------------

/// One authored flag definition, either the base file or a per-environment
/// override (an override replaces the base wholesale).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FlagSpec {
    /// A plain boolean flag: serves `true` when enabled, `false` otherwise.
    Boolean { enabled: bool },
    /// A boolean flag with a percentage rollout over the `true` variation.
    Rollout { enabled: bool, percentage: f64 },
}

impl FlagSpec {
    /// Render the wire-format flag for this definition.
    ///
    /// The result is version-naive (`version: 0`); the reconciler owns
    /// version assignment. The salt is the flag key — it must be stable
    /// across runs or every run would look like a content change.
    pub fn into_flag(self, key: &str) -> Result<Flag, LoadError> {
        let (on, fallthrough) = match self {
            FlagSpec::Boolean { enabled } => (
                enabled,
                Fallthrough {
                    variation: Some(0),
                    rollout: None,
                },
            ),
            FlagSpec::Rollout {
                enabled,
                percentage,
            } => {
                if !(0.0..=100.0).contains(&percentage) {
                    return Err(LoadError::InvalidPercentage {
                        flag: key.to_string(),
                        value: percentage,
                    });
                }
                let weight = (percentage * WEIGHT_SCALE).round() as u32;
                (
                    enabled,
                    Fallthrough {
                        variation: None,
                        rollout: Some(Rollout {
                            variations: vec![
                                WeightedVariation {
                                    variation: 0,
                                    weight,
                                },
                                WeightedVariation {
                                    variation: 1,
                                    weight: FULL_WEIGHT - weight,
                                },
                            ],
                        }),
                    },
                )
            }
        };

        Ok(Flag {
            key: key.to_string(),
            on,
            variations: vec![json!(true), json!(false)],
            off_variation: Some(1),
            fallthrough,
            salt: key.to_string(),
            version: 0,
            deleted: false,
        })
    }
}

// ---------------------------------------------------------------------------
// Project and environment definitions
// ---------------------------------------------------------------------------

/// `project.yaml` at the project root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSpec {
    pub key: String,
    pub name: String,
}

/// `environments/<env key>/env.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvSpec {
    pub env_id: String,
    pub name: String,
    pub mob_key: String,
    pub sdk_key: String,
    #[serde(default = "default_ttl")]
    pub ttl: u32,
    #[serde(default)]
    pub secure_mode: bool,
}

fn default_ttl() -> u32 {
    5
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boolean_spec_renders_fixed_fallthrough() {
        let spec: FlagSpec = serde_yaml::from_str("kind: boolean\nenabled: true\n").unwrap();
        let flag = spec.into_flag("my-flag").unwrap();
        assert!(flag.on);
        assert_eq!(flag.fallthrough.variation, Some(0));
        assert!(flag.fallthrough.rollout.is_none());
        assert_eq!(flag.off_variation, Some(1));
        assert_eq!(flag.version, 0);
        assert_eq!(flag.salt, "my-flag");
    }

    #[test]
    fn rollout_spec_renders_scaled_weights() {
        let spec = FlagSpec::Rollout {
            enabled: true,
            percentage: 25.0,
        };
        let flag = spec.into_flag("gradual").unwrap();
        let rollout = flag.fallthrough.rollout.expect("rollout");
        assert_eq!(rollout.variations[0].weight, 25_000);
        assert_eq!(rollout.variations[1].weight, 75_000);
        assert_eq!(
            rollout.variations[0].weight + rollout.variations[1].weight,
            100_000
        );
    }

    #[test]
    fn fractional_percentage_rounds_to_weight_units() {
        let spec = FlagSpec::Rollout {
            enabled: true,
            percentage: 0.5,
        };
        let flag = spec.into_flag("tiny").unwrap();
        let rollout = flag.fallthrough.rollout.expect("rollout");
        assert_eq!(rollout.variations[0].weight, 500);
    }

    #[test]
    fn out_of_range_percentage_is_rejected() {
        let spec = FlagSpec::Rollout {
            enabled: true,
            percentage: 120.0,
        };
        let err = spec.into_flag("bad").unwrap_err();
        assert!(matches!(err, LoadError::InvalidPercentage { .. }));
    }

    #[test]
    fn identical_specs_render_content_equal_flags() {
        let a = FlagSpec::Boolean { enabled: true }.into_flag("f").unwrap();
        let b = FlagSpec::Boolean { enabled: true }.into_flag("f").unwrap();
        assert!(a.content_equal(&b), "rendering must be deterministic");
    }

    #[test]
    fn env_spec_defaults() {
        let spec: EnvSpec = serde_yaml::from_str(
            "envId: e-1\nname: Production\nmobKey: mob-1\nsdkKey: sdk-1\n",
        )
        .unwrap();
        assert_eq!(spec.ttl, 5);
        assert!(!spec.secure_mode);
    }
}
