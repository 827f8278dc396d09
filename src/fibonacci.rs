//! Fibonacci Heap implementation
//!
//! A Fibonacci heap is a data structure for priority queue operations with:
//! - O(1) amortized insert, decrease_key and peek
//! - O(log n) amortized delete_min
//!
//! The structure consists of a collection of heap-ordered trees. Roots are linked
//! in a circular doubly linked list and the heap caches the top root. Inserts are
//! lazy: a new element is just another root. All restructuring is deferred to
//! `pop`, which consolidates the roots until no two share a degree.
//!
//! Each node carries a `marked` flag. A non-root node is marked when it loses its
//! first child to a cut; losing a second child cuts the node itself (cascading
//! cut). This keeps the degree of every node logarithmic in its subtree size,
//! which bounds the consolidation scratch array by ⌊log_φ n⌋ + 2 slots.

use crate::compare::{Comparer, MinComparer};
use crate::storage::{remap, NodeArena, NodeKey, Relink};
use crate::traits::{DecreaseKeyHeap, Handle, Heap, HeapError, MergeableHeap};
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use tracing::trace;

/// Golden ratio; the degree of a node with subtree size n is at most log_φ n
const PHI: f64 = 1.618_033_988_749_895;

/// Handle to an element in a Fibonacci heap
///
/// The handle stays safe to hold after its element is popped: the arena key is
/// generational, so a stale handle is rejected with [`HeapError::InvalidHandle`].
/// A handle is only meaningful for the heap that issued it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct FibonacciHandle {
    node: NodeKey,
}

impl Handle for FibonacciHandle {}

#[derive(Debug, Clone)]
struct Node<K, V> {
    key: K,
    value: V,
    parent: Option<NodeKey>,
    /// Any node of the child ring
    child: Option<NodeKey>,
    left: NodeKey,
    right: NodeKey,
    degree: usize,
    marked: bool,
}

impl<K, V> Relink for Node<K, V> {
    fn relink(&mut self, map: &FxHashMap<NodeKey, NodeKey>) {
        self.parent = remap(self.parent, map);
        self.child = remap(self.child, map);
        self.left = map[&self.left];
        self.right = map[&self.right];
    }
}

/// Fibonacci Heap
///
/// # Example
///
/// ```rust
/// use rust_priority_heaps::fibonacci::FibonacciHeap;
/// use rust_priority_heaps::Heap;
///
/// let mut heap = FibonacciHeap::new();
/// heap.push(5, "five").unwrap();
/// heap.push(3, "three").unwrap();
/// assert!(!heap.is_normalized());
///
/// assert_eq!(heap.pop(), Some((3, "three")));
/// assert!(heap.is_normalized());
/// ```
#[derive(Debug, Clone)]
pub struct FibonacciHeap<K, V, C = MinComparer> {
    nodes: NodeArena<Node<K, V>>,
    /// Root with the top key; any root reaches the whole root ring
    top: Option<NodeKey>,
    /// Degree-indexed scratch slots for consolidation, all `None` between pops
    marks: Vec<Option<NodeKey>>,
    comparer: C,
}

/// Upper bound on any node degree for a heap of `len` elements, plus one slot
fn degree_bound(len: usize) -> usize {
    if len < 2 {
        return 2;
    }
    ((len as f64).ln() / PHI.ln()).floor() as usize + 2
}

impl<K: PartialOrd, V> FibonacciHeap<K, V> {
    /// Creates an empty min-heap
    pub fn new() -> Self {
        Self::with_comparer(MinComparer)
    }
}

impl<K, V, C: Comparer<K> + Default> Default for FibonacciHeap<K, V, C> {
    fn default() -> Self {
        Self::with_comparer(C::default())
    }
}

impl<K, V, C: Comparer<K>> FibonacciHeap<K, V, C> {
    /// Creates an empty heap ordered by `comparer`
    pub fn with_comparer(comparer: C) -> Self {
        Self {
            nodes: NodeArena::default(),
            top: None,
            marks: Vec::new(),
            comparer,
        }
    }

    /// Returns true if no two roots share a degree
    ///
    /// Always true right after `pop`; lazy pushes may break it again.
    pub fn is_normalized(&self) -> bool {
        let mut seen = FxHashSet::default();
        self.roots().all(|root| seen.insert(self.nodes[root].degree))
    }

    /// Number of trees in the root ring
    pub fn tree_count(&self) -> usize {
        self.roots().count()
    }

    /// Returns true if `handle` still refers to an element of this heap
    pub fn contains(&self, handle: &FibonacciHandle) -> bool {
        self.nodes.get(handle.node).is_some()
    }

    /// Number of degree slots currently reserved for consolidation
    pub fn degree_capacity(&self) -> usize {
        self.marks.len()
    }

    /// Iterates over all elements in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.nodes.values().map(|node| (&node.key, &node.value))
    }

    fn roots(&self) -> impl Iterator<Item = NodeKey> + '_ {
        self.top.into_iter().flat_map(move |top| self.ring(top))
    }

    /// Walks a sibling ring starting at `start`
    fn ring(&self, start: NodeKey) -> impl Iterator<Item = NodeKey> + '_ {
        std::iter::successors(Some(start), move |&key| {
            let right = self.nodes[key].right;
            (right != start).then_some(right)
        })
    }

    /// Joins two disjoint rings into one
    fn join_rings(&mut self, a: NodeKey, b: NodeKey) {
        let a_left = self.nodes[a].left;
        let b_left = self.nodes[b].left;
        self.nodes[a_left].right = b;
        self.nodes[b].left = a_left;
        self.nodes[b_left].right = a;
        self.nodes[a].left = b_left;
    }

    /// Removes `node` from its ring, leaving it as a ring of one
    fn unlink(&mut self, node: NodeKey) {
        let left = self.nodes[node].left;
        let right = self.nodes[node].right;
        self.nodes[left].right = right;
        self.nodes[right].left = left;
        self.nodes[node].left = node;
        self.nodes[node].right = node;
    }

    /// Splices a detached tree into the root ring and updates the top
    fn add_root(&mut self, node: NodeKey) {
        match self.top {
            Some(top) => {
                self.join_rings(top, node);
                if self.comparer.outranks(&self.nodes[node].key, &self.nodes[top].key) {
                    self.top = Some(node);
                }
            }
            None => self.top = Some(node),
        }
    }

    fn insert(&mut self, key: K, value: V) -> NodeKey {
        let node = self.nodes.insert_with_key(|this| Node {
            key,
            value,
            parent: None,
            child: None,
            left: this,
            right: this,
            degree: 0,
            marked: false,
        });
        self.add_root(node);
        node
    }

    /// Links root `child` under root `parent`
    fn link(&mut self, child: NodeKey, parent: NodeKey) {
        self.unlink(child);
        self.nodes[child].parent = Some(parent);
        self.nodes[child].marked = false;

        match self.nodes[parent].child {
            Some(first) => self.join_rings(first, child),
            None => self.nodes[parent].child = Some(child),
        }
        self.nodes[parent].degree += 1;
    }

    /// Combines roots of equal degree until all root degrees are distinct
    ///
    /// The scratch array is regrown to the degree bound for the current size
    /// before every pass, so it never has to be sized up front.
    fn consolidate(&mut self, start: NodeKey) {
        let bound = degree_bound(self.nodes.len());
        if self.marks.len() < bound {
            trace!(from = self.marks.len(), to = bound, "growing fibonacci degree table");
            self.marks.resize(bound, None);
        }

        let roots: SmallVec<[NodeKey; 32]> = self.ring(start).collect();
        for root in roots {
            let mut x = root;
            let mut degree = self.nodes[x].degree;
            loop {
                if degree >= self.marks.len() {
                    self.marks.resize(degree + 1, None);
                }
                let Some(mut y) = self.marks[degree].take() else {
                    break;
                };
                if self.comparer.outranks(&self.nodes[y].key, &self.nodes[x].key) {
                    std::mem::swap(&mut x, &mut y);
                }
                self.link(y, x);
                degree += 1;
            }
            self.marks[degree] = Some(x);
        }

        let mut top: Option<NodeKey> = None;
        for slot in self.marks.iter_mut() {
            if let Some(root) = slot.take() {
                top = match top {
                    Some(t) if !self.comparer.outranks(&self.nodes[root].key, &self.nodes[t].key) => {
                        Some(t)
                    }
                    _ => Some(root),
                };
            }
        }
        self.top = top;
    }

    /// Moves `node` from its parent's child ring to the root ring
    fn cut(&mut self, node: NodeKey, parent: NodeKey) {
        if self.nodes[parent].child == Some(node) {
            let right = self.nodes[node].right;
            self.nodes[parent].child = (right != node).then_some(right);
        }
        self.unlink(node);
        self.nodes[parent].degree -= 1;
        self.nodes[node].parent = None;
        self.nodes[node].marked = false;
        self.add_root(node);
    }

    /// Marks `node`, or cuts it and continues upward if it was already marked
    fn cascading_cut(&mut self, mut node: NodeKey) {
        while let Some(parent) = self.nodes[node].parent {
            if !self.nodes[node].marked {
                self.nodes[node].marked = true;
                return;
            }
            self.cut(node, parent);
            node = parent;
        }
    }
}

impl<K, V, C: Comparer<K>> Heap<K, V> for FibonacciHeap<K, V, C> {
    fn clear(&mut self) {
        self.nodes.clear();
        self.top = None;
    }

    fn is_empty(&self) -> bool {
        self.top.is_none()
    }

    fn len(&self) -> usize {
        self.nodes.len()
    }

    /// O(1): the new element becomes a root, no consolidation
    fn push(&mut self, key: K, value: V) -> Result<(), HeapError> {
        self.insert(key, value);
        Ok(())
    }

    fn peek(&self) -> Option<(&K, &V)> {
        self.top.map(|key| {
            let node = &self.nodes[key];
            (&node.key, &node.value)
        })
    }

    /// Removes the top root, promotes its children and consolidates
    fn pop(&mut self) -> Option<(K, V)> {
        let top = self.top?;

        if let Some(first) = self.nodes[top].child.take() {
            let mut child = first;
            loop {
                let node = &mut self.nodes[child];
                node.parent = None;
                node.marked = false;
                child = node.right;
                if child == first {
                    break;
                }
            }
            self.join_rings(top, first);
            self.nodes[top].degree = 0;
        }

        let next = self.nodes[top].right;
        self.unlink(top);
        if next == top {
            self.top = None;
        } else {
            self.top = Some(next);
            self.consolidate(next);
        }

        let node = self.nodes.remove(top)?;
        Some((node.key, node.value))
    }
}

impl<K, V, C: Comparer<K>> DecreaseKeyHeap<K, V> for FibonacciHeap<K, V, C> {
    type Handle = FibonacciHandle;

    fn push_with_handle(&mut self, key: K, value: V) -> Self::Handle {
        FibonacciHandle {
            node: self.insert(key, value),
        }
    }

    /// O(1) amortized: cut the node if it now outranks its parent
    fn decrease_key(&mut self, handle: &Self::Handle, new_key: K) -> Result<(), HeapError> {
        let node = handle.node;
        let entry = self.nodes.get_mut(node).ok_or(HeapError::InvalidHandle)?;
        if self.comparer.outranks(&entry.key, &new_key) {
            return Err(HeapError::KeyNotDecreased);
        }
        entry.key = new_key;

        if let Some(parent) = self.nodes[node].parent {
            if self.comparer.outranks(&self.nodes[node].key, &self.nodes[parent].key) {
                self.cut(node, parent);
                self.cascading_cut(parent);
            }
        }

        if let Some(top) = self.top {
            if self.comparer.outranks(&self.nodes[node].key, &self.nodes[top].key) {
                self.top = Some(node);
            }
        }
        Ok(())
    }
}

impl<K, V, C: Comparer<K>> MergeableHeap<K, V> for FibonacciHeap<K, V, C> {
    /// Moves `other`'s nodes into this arena and splices the root rings
    ///
    /// **Time Complexity**: O(m) for `other`'s m nodes; no consolidation
    fn merge(&mut self, other: Self) {
        let map = self.nodes.absorb(other.nodes);
        if let Some(other_top) = remap(other.top, &map) {
            self.add_root(other_top);
        }
    }
}
