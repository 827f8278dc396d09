//! Arena storage for tree-based heaps
//!
//! The binomial and Fibonacci heaps keep their nodes in a [`NodeArena`], a thin
//! wrapper around a generational [`SlotMap`]. Parent, child and sibling links
//! are [`NodeKey`]s rather than pointers, so:
//!
//! - the arena is the single owner of every node, and dropping or clearing it
//!   releases whole forests without recursive teardown
//! - splicing circular sibling rings is plain key rewriting
//! - a key to a removed node fails to resolve instead of dangling, which is what
//!   makes Fibonacci heap handles safe to hold after a `pop`

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};
use std::ops::{Index, IndexMut};

new_key_type! {
    /// Generational index of a node inside a [`NodeArena`]
    pub struct NodeKey;
}

/// Nodes that hold links to other nodes of the same arena
///
/// Used when one arena absorbs another: every key stored in the moved node
/// must be rewritten to the key the target arena assigned.
pub(crate) trait Relink {
    fn relink(&mut self, map: &FxHashMap<NodeKey, NodeKey>);
}

/// Owner of all nodes of one heap
#[derive(Debug, Clone)]
pub(crate) struct NodeArena<N> {
    nodes: SlotMap<NodeKey, N>,
}

impl<N> Default for NodeArena<N> {
    fn default() -> Self {
        Self {
            nodes: SlotMap::with_key(),
        }
    }
}

impl<N> NodeArena<N> {
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn insert(&mut self, node: N) -> NodeKey {
        self.nodes.insert(node)
    }

    /// Inserts a node that needs to know its own key (self-linked rings)
    #[inline]
    pub fn insert_with_key(&mut self, f: impl FnOnce(NodeKey) -> N) -> NodeKey {
        self.nodes.insert_with_key(f)
    }

    #[inline]
    pub fn remove(&mut self, key: NodeKey) -> Option<N> {
        self.nodes.remove(key)
    }

    #[inline]
    pub fn get(&self, key: NodeKey) -> Option<&N> {
        self.nodes.get(key)
    }

    #[inline]
    pub fn get_mut(&mut self, key: NodeKey) -> Option<&mut N> {
        self.nodes.get_mut(key)
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    pub fn values(&self) -> impl Iterator<Item = &N> {
        self.nodes.values()
    }
}

impl<N: Relink> NodeArena<N> {
    /// Moves every node of `other` into this arena
    ///
    /// Returns the mapping from `other`'s keys to the new keys. Links between
    /// moved nodes are rewritten through the same mapping.
    pub fn absorb(&mut self, other: NodeArena<N>) -> FxHashMap<NodeKey, NodeKey> {
        let mut map = FxHashMap::default();
        map.reserve(other.len());

        for (old_key, node) in other.nodes {
            let new_key = self.nodes.insert(node);
            map.insert(old_key, new_key);
        }
        for new_key in map.values() {
            self.nodes[*new_key].relink(&map);
        }
        map
    }
}

impl<N> Index<NodeKey> for NodeArena<N> {
    type Output = N;

    #[inline]
    fn index(&self, key: NodeKey) -> &N {
        &self.nodes[key]
    }
}

impl<N> IndexMut<NodeKey> for NodeArena<N> {
    #[inline]
    fn index_mut(&mut self, key: NodeKey) -> &mut N {
        &mut self.nodes[key]
    }
}

/// Rewrites an optional link through a key map
#[inline]
pub(crate) fn remap(link: Option<NodeKey>, map: &FxHashMap<NodeKey, NodeKey>) -> Option<NodeKey> {
    link.map(|key| map[&key])
}
