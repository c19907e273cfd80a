//! The balanced binary tree underlying `Rope<T>`.
//!
//! Nodes are reference-counted and never mutated in place; every structural
//! change produces new nodes along the path from the change to the root and
//! shares everything else with the previous tree. This is the "arena
//! outlives all snapshots" idea from the rope's undo design, expressed with
//! `Rc` instead of a literal arena since safe Rust has no ambient one.

use std::rc::Rc;

use crate::{Metrics, RopeItem};

pub(crate) enum Node<T> {
    Leaf(T),
    Internal {
        left: Rc<Node<T>>,
        right: Rc<Node<T>>,
        metrics: Metrics,
        depth: u32,
    },
}

pub(crate) fn leaf_metrics<T: RopeItem>(item: &T) -> Metrics {
    if item.is_empty() {
        Metrics::default()
    } else {
        Metrics {
            count: 1,
            weight: item.weight(),
            aux: item.aux(),
        }
    }
}

pub(crate) fn metrics_of<T: RopeItem>(node: &Node<T>) -> Metrics {
    match node {
        Node::Leaf(item) => leaf_metrics(item),
        Node::Internal { metrics, .. } => *metrics,
    }
}

pub(crate) fn depth_of<T>(node: &Node<T>) -> u32 {
    match node {
        Node::Leaf(_) => 0,
        Node::Internal { depth, .. } => *depth,
    }
}

pub(crate) fn make_leaf<T: RopeItem>(item: T) -> Rc<Node<T>> {
    Rc::new(Node::Leaf(item))
}

/// Combine two subtrees into a single internal node without rebalancing.
fn combine<T: RopeItem>(left: Rc<Node<T>>, right: Rc<Node<T>>) -> Rc<Node<T>> {
    let metrics = metrics_of(&left).add(&metrics_of(&right));
    let depth = 1 + depth_of(&left).max(depth_of(&right));
    Rc::new(Node::Internal {
        left,
        right,
        metrics,
        depth,
    })
}

pub(crate) fn is_sentinel<T: RopeItem>(node: &Node<T>) -> bool {
    matches!(node, Node::Leaf(item) if item.is_empty())
}

fn balance_factor<T>(node: &Node<T>) -> i64 {
    match node {
        Node::Leaf(_) => 0,
        Node::Internal { left, right, .. } => depth_of(left) as i64 - depth_of(right) as i64,
    }
}

fn children<T: RopeItem>(node: &Rc<Node<T>>) -> Option<(Rc<Node<T>>, Rc<Node<T>>)> {
    match &**node {
        Node::Internal { left, right, .. } => Some((left.clone(), right.clone())),
        Node::Leaf(_) => None,
    }
}

fn rotate_left<T: RopeItem>(left: Rc<Node<T>>, right: Rc<Node<T>>) -> Rc<Node<T>> {
    let (rl, rr) = children(&right).expect("rotate_left requires internal right child");
    combine(combine(left, rl), rr)
}

fn rotate_right<T: RopeItem>(left: Rc<Node<T>>, right: Rc<Node<T>>) -> Rc<Node<T>> {
    let (ll, lr) = children(&left).expect("rotate_right requires internal left child");
    combine(ll, combine(lr, right))
}

/// Combine two subtrees and rebalance the single resulting node if its
/// immediate balance factor is out of range. This is the workhorse both
/// `combine_balanced` (used after ordinary inserts/deletes along the spine)
/// and `join` (used for concatenation of arbitrarily deep subtrees) rely on.
pub(crate) fn combine_balanced<T: RopeItem>(left: Rc<Node<T>>, right: Rc<Node<T>>) -> Rc<Node<T>> {
    if is_sentinel(&left) {
        return right;
    }
    if is_sentinel(&right) {
        return left;
    }
    let node = combine(left, right);
    let bf = balance_factor(&node);
    if bf.abs() <= 1 {
        return node;
    }
    let (l, r) = children(&node).unwrap();
    if bf > 1 {
        // left-heavy
        if balance_factor(&l) < 0 {
            // left-right case: rotate left child left first
            let (ll, lr) = children(&l).unwrap();
            let new_left = rotate_left(ll, lr);
            rotate_right(new_left, r)
        } else {
            rotate_right(l, r)
        }
    } else {
        // right-heavy
        if balance_factor(&r) > 0 {
            let (rl, rr) = children(&r).unwrap();
            let new_right = rotate_right(rl, rr);
            rotate_left(l, new_right)
        } else {
            rotate_left(l, r)
        }
    }
}

/// Join two (already internally balanced) subtrees of arbitrary depth into a
/// single balanced tree. When one side is much deeper, descend along its
/// spine on the side adjacent to the other tree and join at a comparable
/// depth, rebalancing back up to the root. Standard join-based balanced
/// tree concatenation.
pub(crate) fn join<T: RopeItem>(left: Rc<Node<T>>, right: Rc<Node<T>>) -> Rc<Node<T>> {
    if is_sentinel(&left) {
        return right;
    }
    if is_sentinel(&right) {
        return left;
    }
    let dl = depth_of(&left);
    let dr = depth_of(&right);
    if dl > dr + 1 {
        let (ll, lr) = children(&left).expect("deeper side must be internal");
        let new_right = join(lr, right);
        combine_balanced(ll, new_right)
    } else if dr > dl + 1 {
        let (rl, rr) = children(&right).expect("deeper side must be internal");
        let new_left = join(left, rl);
        combine_balanced(new_left, rr)
    } else {
        combine_balanced(left, right)
    }
}

pub(crate) fn count_of<T: RopeItem>(node: &Node<T>) -> u32 {
    metrics_of(node).count
}

/// Find the i-th non-empty leaf (0-indexed) by descending on the `count`
/// metric.
pub(crate) fn get<T: RopeItem>(node: &Node<T>, i: u32) -> Option<&T> {
    match node {
        Node::Leaf(item) => {
            if i == 0 && !item.is_empty() {
                Some(item)
            } else {
                None
            }
        }
        Node::Internal { left, right, .. } => {
            let lc = count_of(left);
            if i < lc {
                get(left, i)
            } else {
                get(right, i - lc)
            }
        }
    }
}

/// Split a tree so the left result contains the first `idx` non-empty
/// leaves (in order) and the right result contains the rest. `idx` must
/// already be clamped to `[0, count]` by the caller.
pub(crate) fn split_at_count<T: RopeItem>(
    node: &Rc<Node<T>>,
    idx: u32,
) -> (Rc<Node<T>>, Rc<Node<T>>) {
    match &**node {
        Node::Leaf(item) => {
            if item.is_empty() {
                (make_leaf(T::empty()), make_leaf(T::empty()))
            } else if idx == 0 {
                (make_leaf(T::empty()), node.clone())
            } else {
                (node.clone(), make_leaf(T::empty()))
            }
        }
        Node::Internal { left, right, .. } => {
            let lc = count_of(left);
            if idx <= lc {
                let (ll, lr) = split_at_count(left, idx);
                (ll, join(lr, right.clone()))
            } else {
                let (rl, rr) = split_at_count(right, idx - lc);
                (join(left.clone(), rl), rr)
            }
        }
    }
}

/// Visitor outcome controlling whether `walk`/`walk_from` continues.
pub struct WalkControl {
    pub keep_walking: bool,
}

impl WalkControl {
    pub fn cont() -> Self {
        Self { keep_walking: true }
    }
    pub fn stop() -> Self {
        Self {
            keep_walking: false,
        }
    }
}

/// In-order traversal delivering `(leaf, index)` to `visit`, starting at
/// leaf-index `start`. Returns `false` once the callback asks to stop so the
/// caller can short-circuit.
pub(crate) fn walk_from<T: RopeItem>(
    node: &Node<T>,
    start: u32,
    next_index: &mut u32,
    visit: &mut dyn FnMut(&T, u32) -> WalkControl,
) -> bool {
    match node {
        Node::Leaf(item) => {
            if item.is_empty() {
                return true;
            }
            if *next_index >= start {
                let ctl = visit(item, *next_index);
                *next_index += 1;
                ctl.keep_walking
            } else {
                *next_index += 1;
                true
            }
        }
        Node::Internal { left, right, .. } => {
            let lc = count_of(left);
            if start >= *next_index + lc {
                // entire left subtree precedes the requested start; skip fast
                *next_index += lc;
                walk_from(right, start, next_index, visit)
            } else {
                if !walk_from(left, start, next_index, visit) {
                    return false;
                }
                walk_from(right, start, next_index, visit)
            }
        }
    }
}

/// Rebuild a balanced tree from a flattened leaf vector (bottom-up), used by
/// `from_slice` and by the explicit `rebalance()` entry point.
pub(crate) fn build_balanced<T: RopeItem>(items: &[T]) -> Rc<Node<T>> {
    if items.is_empty() {
        return make_leaf(T::empty());
    }
    if items.len() == 1 {
        return make_leaf(items[0].clone());
    }
    let mid = items.len() / 2;
    let left = build_balanced(&items[..mid]);
    let right = build_balanced(&items[mid..]);
    combine(left, right)
}

/// Flatten all non-empty leaves into a vector, in order.
pub(crate) fn flatten<T: RopeItem>(node: &Node<T>, out: &mut Vec<T>) {
    match node {
        Node::Leaf(item) => {
            if !item.is_empty() {
                out.push(item.clone());
            }
        }
        Node::Internal { left, right, .. } => {
            flatten(left, out);
            flatten(right, out);
        }
    }
}

pub(crate) fn is_balanced<T>(node: &Node<T>) -> bool {
    match node {
        Node::Leaf(_) => true,
        Node::Internal { left, right, .. } => {
            (depth_of(left) as i64 - depth_of(right) as i64).abs() <= 1
                && is_balanced(left)
                && is_balanced(right)
        }
    }
}

/// Bracketed debug representation: `[leaf <tag> w<weight>]` for leaves,
/// `[branch <left> <right>]` for internal nodes, wrapped once more in
/// `[root ...]` at the top level by the caller.
pub(crate) fn to_text<T: RopeItem>(node: &Node<T>) -> String {
    match node {
        Node::Leaf(item) => {
            if item.is_empty() {
                "[leaf empty]".to_string()
            } else {
                format!("[leaf {item:?} w{}]", item.weight())
            }
        }
        Node::Internal {
            left,
            right,
            metrics,
            ..
        } => {
            format!(
                "[branch w{} {} {}]",
                metrics.weight,
                to_text(left),
                to_text(right)
            )
        }
    }
}
