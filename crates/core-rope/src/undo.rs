//! The rope's undo graph: a linear stack of root snapshots with a single
//! redo branch, discarded as soon as a new edit is stored.
//!
//! Grounded in the shape of `core-state::undo::UndoEngine` (push/undo/redo
//! with a capped history depth) but storing structurally-shared tree roots
//! instead of whole-buffer clones — the persistent tree makes a snapshot
//! free, so there is no need for the teacher's insert-run coalescing or
//! content-hash dedup.

use std::rc::Rc;

use tracing::{debug, warn};

use crate::error::{Result, RopeError};
use crate::node::Node;

pub struct UndoGraph<T> {
    undo_stack: Vec<Rc<Node<T>>>,
    redo_stack: Vec<Rc<Node<T>>>,
    max_depth: usize,
}

impl<T> UndoGraph<T> {
    pub(crate) fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_depth,
        }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Record `current_root` (the state *before* the caller's pending edit)
    /// as an undo point, discarding any redo branch.
    pub(crate) fn push(&mut self, current_root: Rc<Node<T>>) {
        if !self.redo_stack.is_empty() {
            debug!(target: "rope.undo", discarded = self.redo_stack.len(), "discarding redo branch");
            self.redo_stack.clear();
        }
        self.undo_stack.push(current_root);
        if self.undo_stack.len() > self.max_depth {
            let overflow = self.undo_stack.len() - self.max_depth;
            self.undo_stack.drain(0..overflow);
            warn!(target: "rope.undo", trimmed = overflow, max_depth = self.max_depth, "undo history trimmed");
        }
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Pop the most recent undo point, pushing `current_root` onto the redo
    /// stack, and return the root to restore.
    pub(crate) fn undo(&mut self, current_root: Rc<Node<T>>) -> Result<Rc<Node<T>>> {
        let prev = self.undo_stack.pop().ok_or(RopeError::Stop)?;
        self.redo_stack.push(current_root);
        debug!(target: "rope.undo", depth = self.undo_stack.len(), "undo");
        Ok(prev)
    }

    /// Pop the most recent redo point, pushing `current_root` back onto the
    /// undo stack, and return the root to restore.
    pub(crate) fn redo(&mut self, current_root: Rc<Node<T>>) -> Result<Rc<Node<T>>> {
        let next = self.redo_stack.pop().ok_or(RopeError::Stop)?;
        self.undo_stack.push(current_root);
        debug!(target: "rope.undo", depth = self.undo_stack.len(), "redo");
        Ok(next)
    }

    pub(crate) fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
