//! Error taxonomy for rope operations.
//!
//! Index-based mutation (`insert`/`delete`/`replace`/`split`/slice ranges)
//! never returns an error: out-of-range indices clamp silently and inverted
//! ranges become no-ops, per the clamping policy. `RopeError` only surfaces
//! from the weight-based API (where a caller asked for an exact position
//! that cannot be produced by clamping) and from the undo graph.

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum RopeError {
    /// Allocator failure. The rope is left in its pre-call state.
    #[error("allocation failed")]
    OutOfMemory,

    /// A weight-based operation was asked for an exact position past the
    /// rope's total weight and could not clamp (e.g. `split_at_weight_exact`).
    #[error("weight index out of bounds")]
    OutOfBounds,

    /// `undo` with no undo history, `redo` with no redo history, or `redo`
    /// called after the tree was mutated since the last `undo`.
    #[error("no history available for this operation")]
    Stop,

    /// Debug-only structural assertion failure (e.g. a marker invariant).
    #[error("rope invariant violated: {0}")]
    InvariantViolation(&'static str),
}

pub type Result<T> = std::result::Result<T, RopeError>;
