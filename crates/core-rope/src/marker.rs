//! Marker cache: an ordered index from marker tag to the leaves carrying it.
//!
//! Markers are plain `u32` tags an item can carry (`RopeItem::marker`).
//! Looking a marker up by occurrence number needs an ordered list per tag;
//! rather than thread an incremental diff through every tree edit, the
//! cache is rebuilt by a single linear in-order walk after every mutation.
//! This trades some work on large ropes for a cache that can never drift
//! out of sync with the tree — a deliberate simplification over the
//! "rebuilt for the minimal affected range" incremental design, recorded in
//! DESIGN.md.

use std::collections::HashMap;

use crate::node::{self, Node};
use crate::RopeItem;

pub struct MarkerCache {
    // tag -> leaf indices carrying it, in tree order
    by_tag: HashMap<u32, Vec<u32>>,
}

impl MarkerCache {
    pub fn new() -> Self {
        Self {
            by_tag: HashMap::new(),
        }
    }

    pub fn count(&self, tag: u32) -> u32 {
        self.by_tag.get(&tag).map(|v| v.len() as u32).unwrap_or(0)
    }

    pub fn nth(&self, tag: u32, n: u32) -> Option<u32> {
        self.by_tag.get(&tag)?.get(n as usize).copied()
    }

    pub(crate) fn rebuild<T: RopeItem>(&mut self, root: &Node<T>) {
        self.by_tag.clear();
        let mut leaf_index = 0u32;
        walk(root, &mut leaf_index, &mut self.by_tag);
    }
}

impl Default for MarkerCache {
    fn default() -> Self {
        Self::new()
    }
}

fn walk<T: RopeItem>(node: &Node<T>, leaf_index: &mut u32, by_tag: &mut HashMap<u32, Vec<u32>>) {
    match node {
        Node::Leaf(item) => {
            if item.is_empty() {
                return;
            }
            if let Some(tag) = item.marker() {
                by_tag.entry(tag).or_default().push(*leaf_index);
            }
            *leaf_index += 1;
        }
        Node::Internal { left, right, .. } => {
            walk(left, leaf_index, by_tag);
            walk(right, leaf_index, by_tag);
        }
    }
}
