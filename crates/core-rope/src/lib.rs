//! A generic persistent, weight-indexed rope.
//!
//! `Rope<T>` is a balanced binary tree of items. Every leaf carries an
//! additive [`Metrics`] triple (`count`, `weight`, `aux`) so callers can
//! index either by ordinal position (`count`) or by either of two
//! caller-defined cumulative measures (`weight`, `aux`) — a text buffer uses
//! `weight` for grapheme-count offsets and `aux` for byte-length offsets
//! over the same tree of segments.
//!
//! Mutation is presented as a mutable API (`insert`, `delete`, ...) but
//! internally every call replaces the tree's root with a new one built from
//! shared subtrees; nothing already reachable from another `Rope<T>` value
//! (or a retained undo snapshot) is ever mutated in place.

mod marker;
mod node;
mod undo;
mod weight;

pub mod error;

pub use error::{Result, RopeError};
pub use marker::MarkerCache;
pub use node::WalkControl;
pub use undo::UndoGraph;
pub use weight::WeightFinger;

use std::fmt::Debug;
use std::rc::Rc;

use node::Node;
use tracing::trace;

/// Additive, cumulative counters carried by every subtree.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Metrics {
    pub count: u32,
    pub weight: u64,
    pub aux: u64,
}

impl Metrics {
    pub fn add(&self, other: &Metrics) -> Metrics {
        Metrics {
            count: self.count + other.count,
            weight: self.weight + other.weight,
            aux: self.aux + other.aux,
        }
    }
}

/// The element type a [`Rope`] is built from.
///
/// `empty()` must produce the unique "sentinel" value used to represent an
/// absent leaf; `is_empty()` identifies it. A sentinel item is never counted
/// in `count`/`weight`/`aux` and never appears inside a non-trivial tree —
/// it can only be the sole leaf of a logically-empty rope.
pub trait RopeItem: Clone + Debug {
    fn empty() -> Self;
    fn is_empty(&self) -> bool;
    /// Contribution to the primary weight dimension (e.g. grapheme count).
    fn weight(&self) -> u64;
    /// Contribution to the secondary weight dimension (e.g. byte length).
    fn aux(&self) -> u64 {
        0
    }
    /// Marker tag attached to this item, if any.
    fn marker(&self) -> Option<u32> {
        None
    }
}

/// A persistent, balanced, metric-indexed tree of `T`.
pub struct Rope<T> {
    root: Rc<Node<T>>,
    markers: MarkerCache,
    undo: UndoGraph<T>,
}

impl<T: RopeItem> Rope<T> {
    /// An empty rope (a single sentinel leaf).
    pub fn new() -> Self {
        Self {
            root: node::make_leaf(T::empty()),
            markers: MarkerCache::new(),
            undo: UndoGraph::new(usize::MAX),
        }
    }

    pub fn with_max_undo_depth(max_undo_depth: usize) -> Self {
        Self {
            root: node::make_leaf(T::empty()),
            markers: MarkerCache::new(),
            undo: UndoGraph::new(max_undo_depth),
        }
    }

    pub fn from_item(item: T) -> Self {
        let mut rope = Self::new();
        rope.root = node::make_leaf(item);
        rope.rebuild_markers();
        rope
    }

    pub fn from_slice(items: &[T]) -> Self {
        let mut rope = Self::new();
        rope.root = node::build_balanced(items);
        rope.rebuild_markers();
        rope
    }

    /// Number of non-empty leaves.
    pub fn count(&self) -> u32 {
        node::count_of(&self.root)
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    pub fn metrics(&self) -> Metrics {
        node::metrics_of(&self.root)
    }

    pub fn total_weight(&self) -> u64 {
        self.metrics().weight
    }

    pub fn total_aux(&self) -> u64 {
        self.metrics().aux
    }

    /// Depth of the current root, for tests asserting the balance invariant.
    pub fn depth(&self) -> u32 {
        node::depth_of(&self.root)
    }

    pub fn is_balanced(&self) -> bool {
        node::is_balanced(&self.root)
    }

    /// The i-th item (0-indexed), if present.
    pub fn get(&self, i: u32) -> Option<&T> {
        node::get(&self.root, i)
    }

    /// Visit every item from the start in order, stopping early if `visit`
    /// returns a stop control.
    pub fn walk(&self, mut visit: impl FnMut(&T, u32) -> WalkControl) {
        let mut next_index = 0;
        node::walk_from(&self.root, 0, &mut next_index, &mut visit);
    }

    /// Visit items starting at leaf-index `start`.
    pub fn walk_from(&self, start: u32, mut visit: impl FnMut(&T, u32) -> WalkControl) {
        let mut next_index = 0;
        node::walk_from(&self.root, start, &mut next_index, &mut visit);
    }

    /// Insert `item` at leaf-index `idx`, clamped into `[0, count]`.
    pub fn insert(&mut self, idx: u32, item: T) {
        self.insert_slice(idx, std::slice::from_ref(&item));
    }

    /// Insert a run of items at leaf-index `idx`, clamped into `[0, count]`.
    pub fn insert_slice(&mut self, idx: u32, items: &[T]) {
        if items.is_empty() {
            return;
        }
        let idx = idx.min(self.count());
        let (left, right) = node::split_at_count(&self.root, idx);
        let middle = node::build_balanced(items);
        let joined = node::join(node::join(left, middle), right);
        trace!(target: "rope", idx, inserted = items.len(), "insert_slice");
        self.root = joined;
        self.rebuild_markers();
    }

    pub fn append(&mut self, item: T) {
        let idx = self.count();
        self.insert(idx, item);
    }

    pub fn prepend(&mut self, item: T) {
        self.insert(0, item);
    }

    /// Delete the item at leaf-index `idx`, if present.
    pub fn delete(&mut self, idx: u32) {
        self.delete_range(idx, idx.saturating_add(1));
    }

    /// Delete leaf-indices `[start, end)`, clamped and made a no-op if
    /// `start >= end` after clamping.
    pub fn delete_range(&mut self, start: u32, end: u32) {
        let count = self.count();
        let start = start.min(count);
        let end = end.min(count);
        if start >= end {
            return;
        }
        let (left, rest) = node::split_at_count(&self.root, start);
        let (_, right) = node::split_at_count(&rest, end - start);
        trace!(target: "rope", start, end, "delete_range");
        self.root = node::join(left, right);
        self.rebuild_markers();
    }

    /// Replace `item` at leaf-index `idx` in place (delete then insert).
    pub fn replace(&mut self, idx: u32, item: T) {
        if idx >= self.count() {
            return;
        }
        self.delete(idx);
        self.insert(idx, item);
    }

    /// Split into two ropes at leaf-index `idx`. Markers and undo history
    /// are not carried into the results, matching the "new rope" semantics
    /// of a structural split.
    pub fn split(&self, idx: u32) -> (Rope<T>, Rope<T>) {
        let idx = idx.min(self.count());
        let (left, right) = node::split_at_count(&self.root, idx);
        (Self::from_root(left), Self::from_root(right))
    }

    /// Concatenate two ropes into a new one. Markers and undo history are
    /// not carried into the result.
    pub fn concat(a: &Rope<T>, b: &Rope<T>) -> Rope<T> {
        Self::from_root(node::join(a.root.clone(), b.root.clone()))
    }

    pub fn to_array(&self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.count() as usize);
        node::flatten(&self.root, &mut out);
        out
    }

    pub fn to_text(&self) -> String {
        format!("[root {}]", node::to_text(&self.root))
    }

    // -- markers -----------------------------------------------------

    pub fn marker_count(&self, tag: u32) -> u32 {
        self.markers.count(tag)
    }

    /// The leaf-index of the `n`-th (0-indexed) item tagged `tag`, if any.
    pub fn get_marker(&self, tag: u32, n: u32) -> Option<u32> {
        self.markers.nth(tag, n)
    }

    fn rebuild_markers(&mut self) {
        self.markers.rebuild(&self.root);
    }

    // -- weight-indexed API is in weight.rs ---------------------------

    // -- undo graph ----------------------------------------------------

    /// Snapshot the current root as an undo point, discarding any redo
    /// branch recorded since the last `undo`.
    pub fn store_undo(&mut self) {
        self.undo.push(self.root.clone());
    }

    pub fn can_undo(&self) -> bool {
        self.undo.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.undo.can_redo()
    }

    pub fn undo(&mut self) -> Result<()> {
        let root = self.undo.undo(self.root.clone())?;
        self.root = root;
        self.rebuild_markers();
        Ok(())
    }

    pub fn redo(&mut self) -> Result<()> {
        let root = self.undo.redo(self.root.clone())?;
        self.root = root;
        self.rebuild_markers();
        Ok(())
    }

    pub fn clear_history(&mut self) {
        self.undo.clear();
    }

    pub fn max_undo_depth(&self) -> usize {
        self.undo.max_depth()
    }

    fn from_root(root: Rc<Node<T>>) -> Self {
        let mut rope = Self {
            root,
            markers: MarkerCache::new(),
            undo: UndoGraph::new(usize::MAX),
        };
        rope.rebuild_markers();
        rope
    }
}

impl<T: RopeItem> Default for Rope<T> {
    fn default() -> Self {
        Self::new()
    }
}
