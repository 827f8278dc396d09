//! Binomial Heap implementation
//!
//! A binomial heap is a collection of binomial trees with:
//! - O(log n) insert and delete_min
//! - O(log n) merge
//!
//! # Algorithm Overview
//!
//! A binomial heap maintains a forest of binomial trees where:
//! - Each tree satisfies the heap property
//! - At most one tree of each degree (0, 1, 2, ..., log n)
//! - This is analogous to binary representation of n
//!
//! **Binomial Tree Bₖ**: Recursively defined:
//! - B₀ is a single node
//! - Bₖ is formed by linking two B_{k-1} trees
//! - Bₖ has exactly 2ᵏ nodes and height k
//!
//! The roots form a singly-linked list ordered by increasing degree. Every
//! node's children form a singly-linked list ordered by decreasing degree, so
//! linking a new child is a push onto the front of that list.
//!
//! **Key Operations**:
//! - **Insert**: O(log n) worst - union a single-node tree into the root list
//!   (like adding 1 to a binary number)
//! - **Delete-min**: O(log n) worst - detach the top root, reverse its children
//!   into a root list, union it back
//! - **Merge**: O(log n) union of two root lists, after moving the other heap's
//!   nodes into this heap's arena
//!
//! The top root is cached after every mutation by scanning the O(log n) roots,
//! so `peek` is O(1).

use crate::compare::{Comparer, MinComparer};
use crate::storage::{remap, NodeArena, NodeKey, Relink};
use crate::traits::{Heap, HeapError, MergeableHeap};
use rustc_hash::FxHashMap;

/// Internal node structure for binomial heap
///
/// **Binomial Tree Structure**: a node of degree k has exactly k children with
/// degrees k-1, k-2, ..., 0 in `child`/`sibling` order.
#[derive(Debug, Clone)]
struct Node<K, V> {
    key: K,
    value: V,
    /// Number of children
    degree: usize,
    /// First (highest-degree) child
    child: Option<NodeKey>,
    /// Next root for roots, next (lower-degree) sibling for children
    sibling: Option<NodeKey>,
}

impl<K, V> Relink for Node<K, V> {
    fn relink(&mut self, map: &FxHashMap<NodeKey, NodeKey>) {
        self.child = remap(self.child, map);
        self.sibling = remap(self.sibling, map);
    }
}

/// Binomial Heap
///
/// # Example
///
/// ```rust
/// use rust_priority_heaps::binomial::BinomialHeap;
/// use rust_priority_heaps::Heap;
///
/// let mut heap = BinomialHeap::new();
/// heap.push(5, "five").unwrap();
/// heap.push(1, "one").unwrap();
/// assert_eq!(heap.peek(), Some((&1, &"one")));
/// assert_eq!(heap.tree_count(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct BinomialHeap<K, V, C = MinComparer> {
    nodes: NodeArena<Node<K, V>>,
    /// First root (lowest degree)
    head: Option<NodeKey>,
    /// Root holding the top key
    top: Option<NodeKey>,
    comparer: C,
}

impl<K: PartialOrd, V> BinomialHeap<K, V> {
    /// Creates an empty min-heap
    pub fn new() -> Self {
        Self::with_comparer(MinComparer)
    }
}

impl<K, V, C: Comparer<K> + Default> Default for BinomialHeap<K, V, C> {
    fn default() -> Self {
        Self::with_comparer(C::default())
    }
}

impl<K, V, C: Comparer<K>> BinomialHeap<K, V, C> {
    /// Creates an empty heap ordered by `comparer`
    pub fn with_comparer(comparer: C) -> Self {
        Self {
            nodes: NodeArena::default(),
            head: None,
            top: None,
            comparer,
        }
    }

    /// Number of trees in the root list
    ///
    /// Equals the number of set bits in `len()`.
    pub fn tree_count(&self) -> usize {
        self.roots().count()
    }

    /// Iterates over all elements in arbitrary order
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.nodes.values().map(|node| (&node.key, &node.value))
    }

    fn roots(&self) -> impl Iterator<Item = NodeKey> + '_ {
        std::iter::successors(self.head, move |&key| self.nodes[key].sibling)
    }

    /// Makes `child` the first child of `parent`
    ///
    /// Both must be roots of equal degree; `parent` gains one degree.
    fn link(&mut self, child: NodeKey, parent: NodeKey) {
        self.nodes[child].sibling = self.nodes[parent].child;
        self.nodes[parent].child = Some(child);
        self.nodes[parent].degree += 1;
    }

    /// Merges two degree-ordered root lists into one degree-ordered list
    ///
    /// Trees are not linked here; equal degrees end up adjacent.
    fn merge_root_lists(&mut self, mut a: Option<NodeKey>, mut b: Option<NodeKey>) -> Option<NodeKey> {
        let mut head = None;
        let mut tail: Option<NodeKey> = None;

        loop {
            let next = match (a, b) {
                (Some(x), Some(y)) => {
                    if self.nodes[x].degree <= self.nodes[y].degree {
                        a = self.nodes[x].sibling;
                        x
                    } else {
                        b = self.nodes[y].sibling;
                        y
                    }
                }
                // The remainder keeps its own sibling chain
                (Some(rest), None) | (None, Some(rest)) => {
                    a = None;
                    b = None;
                    rest
                }
                (None, None) => break,
            };

            match tail {
                Some(t) => self.nodes[t].sibling = Some(next),
                None => head = Some(next),
            }
            tail = Some(next);
        }

        head
    }

    /// Unions a degree-ordered root list into this heap's root list
    ///
    /// **Algorithm**: merge both lists by degree, then walk them linking pairs of
    /// equal degree. When three trees of one degree meet (two from the inputs plus
    /// a carry), the first is skipped and the other two are linked, which is
    /// exactly carry propagation in binary addition.
    ///
    /// **Invariant**: afterwards root degrees are strictly increasing.
    fn union(&mut self, other: Option<NodeKey>) {
        let mut head = self.merge_root_lists(self.head, other);
        let Some(mut x) = head else {
            self.head = None;
            return;
        };
        let mut prev: Option<NodeKey> = None;

        while let Some(next) = self.nodes[x].sibling {
            let after = self.nodes[next].sibling;
            let degree = self.nodes[x].degree;

            let skip = degree != self.nodes[next].degree
                || after.is_some_and(|a| self.nodes[a].degree == degree);

            if skip {
                prev = Some(x);
                x = next;
            } else if !self.comparer.outranks(&self.nodes[next].key, &self.nodes[x].key) {
                // x keeps its place and adopts next
                self.nodes[x].sibling = after;
                self.link(next, x);
            } else {
                // next takes x's place and adopts x
                match prev {
                    Some(p) => self.nodes[p].sibling = Some(next),
                    None => head = Some(next),
                }
                self.link(x, next);
                x = next;
            }
        }

        self.head = head;
    }

    /// Recomputes the cached top by scanning the root list
    fn refresh_top(&mut self) {
        let mut best: Option<NodeKey> = None;
        for root in self.roots() {
            best = match best {
                Some(b) if !self.comparer.outranks(&self.nodes[root].key, &self.nodes[b].key) => {
                    Some(b)
                }
                _ => Some(root),
            };
        }
        self.top = best;
    }

    /// Removes `target` from the root list
    fn detach_root(&mut self, target: NodeKey) {
        let mut prev: Option<NodeKey> = None;
        let mut cur = self.head;
        while let Some(c) = cur {
            if c == target {
                break;
            }
            prev = Some(c);
            cur = self.nodes[c].sibling;
        }

        let after = self.nodes[target].sibling.take();
        match prev {
            Some(p) => self.nodes[p].sibling = after,
            None => self.head = after,
        }
    }
}

impl<K, V, C: Comparer<K>> Heap<K, V> for BinomialHeap<K, V, C> {
    fn clear(&mut self) {
        self.nodes.clear();
        self.head = None;
        self.top = None;
    }

    fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Inserts a new element into the heap
    ///
    /// **Time Complexity**: O(log n) worst-case
    fn push(&mut self, key: K, value: V) -> Result<(), HeapError> {
        let node = self.nodes.insert(Node {
            key,
            value,
            degree: 0,
            child: None,
            sibling: None,
        });
        self.union(Some(node));
        self.refresh_top();
        Ok(())
    }

    fn peek(&self) -> Option<(&K, &V)> {
        self.top.map(|key| {
            let node = &self.nodes[key];
            (&node.key, &node.value)
        })
    }

    /// Removes and returns the top element
    ///
    /// **Time Complexity**: O(log n) worst-case
    ///
    /// **Binomial Tree Property**: when the root of a Bₖ tree is removed, its
    /// children are Bₖ₋₁, ..., B₀ trees. Reversing the child list yields a valid
    /// degree-ordered root list.
    fn pop(&mut self) -> Option<(K, V)> {
        let top = self.top?;
        self.detach_root(top);

        let mut reversed = None;
        let mut child = self.nodes[top].child.take();
        while let Some(c) = child {
            child = self.nodes[c].sibling;
            self.nodes[c].sibling = reversed;
            reversed = Some(c);
        }
        self.union(reversed);

        let node = self.nodes.remove(top)?;
        self.refresh_top();
        Some((node.key, node.value))
    }
}

impl<K, V, C: Comparer<K>> MergeableHeap<K, V> for BinomialHeap<K, V, C> {
    /// Moves `other`'s nodes into this arena, then unions the root lists
    ///
    /// **Time Complexity**: O(m) to move `other`'s m nodes plus O(log n) for the union
    fn merge(&mut self, other: Self) {
        let map = self.nodes.absorb(other.nodes);
        let other_head = remap(other.head, &map);
        self.union(other_head);
        self.refresh_top();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::MaxComparer;

    impl<K, V, C: Comparer<K>> BinomialHeap<K, V, C> {
        /// Checks root order, heap order and the shape of every binomial tree
        fn assert_invariants(&self) {
            let mut last_degree = None;
            let mut total = 0;
            for root in self.roots() {
                let degree = self.nodes[root].degree;
                if let Some(last) = last_degree {
                    assert!(degree > last, "root degrees must strictly increase");
                }
                last_degree = Some(degree);
                total += self.assert_tree(root);
            }
            assert_eq!(total, self.len());
        }

        fn assert_tree(&self, key: NodeKey) -> usize {
            let node = &self.nodes[key];
            let mut size = 1;
            let mut expected = node.degree;
            let mut child = node.child;
            while let Some(c) = child {
                expected -= 1;
                assert_eq!(self.nodes[c].degree, expected);
                assert!(!self.comparer.outranks(&self.nodes[c].key, &node.key));
                size += self.assert_tree(c);
                child = self.nodes[c].sibling;
            }
            assert_eq!(expected, 0);
            assert_eq!(size, 1 << node.degree);
            size
        }
    }

    #[test]
    fn test_basic_operations() {
        let mut heap = BinomialHeap::new();
        for key in [5, 3, 8, 1, 4] {
            heap.push(key, key * 10).unwrap();
            heap.assert_invariants();
        }
        assert_eq!(heap.len(), 5);
        assert_eq!(heap.peek(), Some((&1, &10)));

        let mut out = Vec::new();
        while let Some((key, value)) = heap.pop() {
            assert_eq!(value, key * 10);
            heap.assert_invariants();
            out.push(key);
        }
        assert_eq!(out, vec![1, 3, 4, 5, 8]);
        assert_eq!(heap.pop(), None);
    }

    #[test]
    fn test_tree_count_follows_binary_representation() {
        let mut heap = BinomialHeap::new();
        for i in 0..37u32 {
            heap.push(i, ()).unwrap();
            assert_eq!(heap.tree_count(), heap.len().count_ones() as usize);
        }
        heap.pop();
        heap.assert_invariants();
        assert_eq!(heap.tree_count(), 36usize.count_ones() as usize);
    }

    #[test]
    fn test_merge() {
        let mut heap1 = BinomialHeap::new();
        let mut heap2 = BinomialHeap::new();
        for i in (0..20).step_by(2) {
            heap1.push(i, "even").unwrap();
            heap2.push(i + 1, "odd").unwrap();
        }

        heap1.merge(heap2);
        heap1.assert_invariants();
        assert_eq!(heap1.len(), 20);

        for i in 0..20 {
            let (key, value) = heap1.pop().unwrap();
            assert_eq!(key, i);
            assert_eq!(value, if i % 2 == 0 { "even" } else { "odd" });
        }
    }

    #[test]
    fn test_max_comparer_and_duplicates() {
        let mut heap = BinomialHeap::with_comparer(MaxComparer);
        for key in [2, 7, 7, 1, 7, 3] {
            heap.push(key, ()).unwrap();
        }
        heap.assert_invariants();

        let keys: Vec<i32> = std::iter::from_fn(|| heap.pop().map(|(k, _)| k)).collect();
        assert_eq!(keys, vec![7, 7, 7, 3, 2, 1]);
    }

    #[test]
    fn test_clear_then_reuse() {
        let mut heap = BinomialHeap::new();
        for i in 0..10 {
            heap.push(i, i).unwrap();
        }
        heap.clear();
        assert!(heap.is_empty());
        assert_eq!(heap.len(), 0);
        assert_eq!(heap.peek(), None);

        heap.push(42, 0).unwrap();
        assert_eq!(heap.pop(), Some((42, 0)));
    }
}
