//! `TextBuffer`'s error surface. Most edit operations clamp silently per
//! the rope's own policy; `TextError` only surfaces allocator failure
//! (propagated from `core-rope`) and debug-only invariant assertions.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TextError {
    #[error(transparent)]
    Rope(#[from] core_rope::RopeError),

    #[error("text buffer invariant violated: {0}")]
    InvariantViolation(&'static str),
}

pub type Result<T> = std::result::Result<T, TextError>;
