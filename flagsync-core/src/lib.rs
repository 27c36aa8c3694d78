//! flagsync core library — archive data model, key-set differ, and the
//! reconciliation engine.
//!
//! Public API surface:
//! - [`types`] — wire-format archive model
//! - [`keydiff`] — key-set partition used at the environment and flag level
//! - [`reconcile`] — the state-transition algorithm
//! - [`error`] — [`ReconcileError`]

pub mod error;
pub mod keydiff;
pub mod reconcile;
pub mod types;

pub use error::ReconcileError;
pub use keydiff::{diff_keys, KeyDiff};
pub use reconcile::reconcile;
pub use types::{
    Archive, EnvMetadata, Environment, Fallthrough, Flag, Payload, Rollout, SdkKey,
    WeightedVariation,
};
