//! Error types for flagsync-core.

use thiserror::Error;

/// Errors from [`reconcile`](crate::reconcile::reconcile).
///
/// No failure condition is currently defined for well-formed input; the
/// reconciler's `Result` return keeps the signature stable if one is ever
/// added. Malformed input is a Project Loader bug, not something the
/// reconciler recovers from.
#[derive(Debug, Error)]
pub enum ReconcileError {}
