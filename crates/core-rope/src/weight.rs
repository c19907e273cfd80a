//! Weight-indexed lookups and splits.
//!
//! A rope carries two independent cumulative measures per [`Metrics`]
//! (`weight`, `aux`); this module implements `findByWeight`/`splitByWeight`
//! against either one, selected by [`Dim`]. Splitting strictly inside a leaf
//! needs help from the caller since `core-rope` has no idea how to cut a `T`
//! in half — that's the "caller-supplied splitter" from the rope's weight
//! API: a closure `Fn(&T, u64) -> (T, T)` given an item and an in-leaf
//! offset (in the chosen dimension), returning the left and right parts.

use std::rc::Rc;

use crate::node::{self, Node};
use crate::{Metrics, Rope, RopeItem};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dim {
    Weight,
    Aux,
}

fn metric(m: Metrics, dim: Dim) -> u64 {
    match dim {
        Dim::Weight => m.weight,
        Dim::Aux => m.aux,
    }
}

fn item_metric<T: RopeItem>(item: &T, dim: Dim) -> u64 {
    match dim {
        Dim::Weight => item.weight(),
        Dim::Aux => item.aux(),
    }
}

/// The result of a weight-based lookup: which leaf the target position
/// falls in, the cumulative weight at that leaf's start (`start_weight`),
/// and the remaining offset within the leaf (in the dimension searched),
/// clamped to the leaf's own extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeightFinger {
    pub leaf_index: u32,
    pub start_weight: u64,
    pub offset: u64,
}

fn find<T: RopeItem>(
    node: &Node<T>,
    target: u64,
    dim: Dim,
    leaf_index: &mut u32,
    start_weight: u64,
) -> Option<WeightFinger> {
    match node {
        Node::Leaf(item) => {
            if item.is_empty() {
                None
            } else {
                let w = item_metric(item, dim);
                Some(WeightFinger {
                    leaf_index: *leaf_index,
                    start_weight,
                    offset: target.min(w),
                })
            }
        }
        Node::Internal { left, right, .. } => {
            let lw = metric(node::metrics_of(left), dim);
            if target < lw || node::count_of(right) == 0 {
                find(left, target, dim, leaf_index, start_weight)
            } else {
                *leaf_index += node::count_of(left);
                find(right, target - lw, dim, leaf_index, start_weight + lw)
            }
        }
    }
}

/// Locate the leaf containing cumulative position `target` in dimension
/// `dim`. Returns `None` for an empty rope or when `target` is at or past
/// the rope's total weight in that dimension.
pub(crate) fn find_by_weight<T: RopeItem>(root: &Node<T>, target: u64, dim: Dim) -> Option<WeightFinger> {
    if target >= metric(node::metrics_of(root), dim) {
        return None;
    }
    let mut leaf_index = 0;
    find(root, target, dim, &mut leaf_index, 0)
}

/// Split the tree so everything before cumulative position `target` (in
/// dimension `dim`) lands in the left result and everything from `target`
/// onward lands in the right result, cutting the straddling leaf in two
/// via `splitter(item, offset_into_item)`.
pub(crate) fn split_by_weight<T: RopeItem>(
    node: &Rc<Node<T>>,
    target: u64,
    dim: Dim,
    splitter: &dyn Fn(&T, u64) -> (T, T),
) -> (Rc<Node<T>>, Rc<Node<T>>) {
    match &**node {
        Node::Leaf(item) => {
            if item.is_empty() || target == 0 {
                (node::make_leaf(T::empty()), node.clone())
            } else {
                let w = item_metric(item, dim);
                if target >= w {
                    (node.clone(), node::make_leaf(T::empty()))
                } else {
                    let (l, r) = splitter(item, target);
                    (node::make_leaf(l), node::make_leaf(r))
                }
            }
        }
        Node::Internal { left, right, .. } => {
            let lw = metric(node::metrics_of(left), dim);
            if target <= lw {
                let (ll, lr) = split_by_weight(left, target, dim, splitter);
                (ll, node::join(lr, right.clone()))
            } else {
                let (rl, rr) = split_by_weight(right, target - lw, dim, splitter);
                (node::join(left.clone(), rl), rr)
            }
        }
    }
}

impl<T: RopeItem> Rope<T> {
    /// Locate the leaf holding cumulative `weight()` position `target`.
    pub fn find_by_weight(&self, target: u64) -> Option<WeightFinger> {
        find_by_weight(&self.root, target, Dim::Weight)
    }

    /// Locate the leaf holding cumulative `aux()` position `target`.
    pub fn find_by_aux(&self, target: u64) -> Option<WeightFinger> {
        find_by_weight(&self.root, target, Dim::Aux)
    }

    /// Split at a `weight()` position, cutting a straddling leaf with
    /// `splitter`.
    pub fn split_by_weight(
        &self,
        target: u64,
        splitter: impl Fn(&T, u64) -> (T, T),
    ) -> (Rope<T>, Rope<T>) {
        let target = target.min(self.total_weight());
        let (l, r) = split_by_weight(&self.root, target, Dim::Weight, &splitter);
        (Self::from_root(l), Self::from_root(r))
    }

    /// Split at an `aux()` position, cutting a straddling leaf with
    /// `splitter`.
    pub fn split_by_aux(
        &self,
        target: u64,
        splitter: impl Fn(&T, u64) -> (T, T),
    ) -> (Rope<T>, Rope<T>) {
        let target = target.min(self.total_aux());
        let (l, r) = split_by_weight(&self.root, target, Dim::Aux, &splitter);
        (Self::from_root(l), Self::from_root(r))
    }

    /// Delete the half-open `weight()` range `[start, end)`, splitting any
    /// straddling leaves with `splitter`.
    pub fn delete_range_by_weight(
        &mut self,
        start: u64,
        end: u64,
        splitter: impl Fn(&T, u64) -> (T, T) + Copy,
    ) {
        let total = self.total_weight();
        let start = start.min(total);
        let end = end.min(total);
        if start >= end {
            return;
        }
        let (left, _mid_and_right) = split_by_weight(&self.root, start, Dim::Weight, &splitter);
        let (_, right) = split_by_weight(&self.root, end, Dim::Weight, &splitter);
        self.root = node::join(left, right);
        self.rebuild_markers();
    }

    /// Insert `items` (a balanced run) at `weight()` position `target`,
    /// splitting any straddling leaf with `splitter`.
    pub fn insert_slice_by_weight(
        &mut self,
        target: u64,
        items: &[T],
        splitter: impl Fn(&T, u64) -> (T, T),
    ) {
        if items.is_empty() {
            return;
        }
        let target = target.min(self.total_weight());
        let (left, right) = split_by_weight(&self.root, target, Dim::Weight, &splitter);
        let middle = node::build_balanced(items);
        self.root = node::join(node::join(left, middle), right);
        self.rebuild_markers();
    }

    /// Delete the half-open `aux()` range `[start, end)`, splitting any
    /// straddling leaves with `splitter`.
    pub fn delete_range_by_aux(
        &mut self,
        start: u64,
        end: u64,
        splitter: impl Fn(&T, u64) -> (T, T) + Copy,
    ) {
        let total = self.total_aux();
        let start = start.min(total);
        let end = end.min(total);
        if start >= end {
            return;
        }
        let (left, _mid_and_right) = split_by_weight(&self.root, start, Dim::Aux, &splitter);
        let (_, right) = split_by_weight(&self.root, end, Dim::Aux, &splitter);
        self.root = node::join(left, right);
        self.rebuild_markers();
    }

    /// Insert `items` (a balanced run) at `aux()` position `target`,
    /// splitting any straddling leaf with `splitter`.
    pub fn insert_slice_by_aux(
        &mut self,
        target: u64,
        items: &[T],
        splitter: impl Fn(&T, u64) -> (T, T),
    ) {
        if items.is_empty() {
            return;
        }
        let target = target.min(self.total_aux());
        let (left, right) = split_by_weight(&self.root, target, Dim::Aux, &splitter);
        let middle = node::build_balanced(items);
        self.root = node::join(node::join(left, middle), right);
        self.rebuild_markers();
    }
}
