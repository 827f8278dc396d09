//! Binary Heap implementation
//!
//! An array-backed binary heap. Element `i` has children `2i + 1` and `2i + 2`
//! and parent `(i - 1) / 2`.
//!
//! Unlike `Vec`, growth is explicit: the heap tracks a logical capacity and
//! grows it by a fixed resize increment when full. An increment of 0 turns the
//! heap into a fixed-capacity queue whose `push` fails instead of allocating.
//!
//! # Time Complexity
//!
//! | Operation | Complexity |
//! |-----------|------------|
//! | `push`    | O(log n)   |
//! | `pop`     | O(log n)   |
//! | `peek`    | O(1)       |
//! | `merge`   | O(m log n) |
//!
//! # Example
//!
//! ```rust
//! use rust_priority_heaps::Heap;
//! use rust_priority_heaps::binary::{BinaryHeap, BinaryHeapConfig};
//!
//! let config = BinaryHeapConfig::default()
//!     .with_initial_capacity(2)
//!     .with_resize_count(0);
//! let mut heap = BinaryHeap::with_config(config);
//! heap.push(3, "three").unwrap();
//! heap.push(1, "one").unwrap();
//! assert!(heap.push(2, "two").is_err());
//!
//! assert_eq!(heap.pop(), Some((1, "one")));
//! assert_eq!(heap.pop(), Some((3, "three")));
//! assert_eq!(heap.pop(), None);
//! ```

use crate::compare::{Comparer, MinComparer};
use crate::traits::{Heap, HeapError, MergeableHeap};
use tracing::{error, trace};

/// Number of elements added per automatic growth step unless configured otherwise
pub const DEFAULT_RESIZE_COUNT: usize = 10;

/// Construction-time settings for [`BinaryHeap`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BinaryHeapConfig {
    /// Slots allocated up front
    pub initial_capacity: usize,
    /// Slots added each time the heap is full; 0 disables growth
    pub resize_count: usize,
}

impl Default for BinaryHeapConfig {
    fn default() -> Self {
        Self {
            initial_capacity: 0,
            resize_count: DEFAULT_RESIZE_COUNT,
        }
    }
}

impl BinaryHeapConfig {
    /// Sets the number of slots allocated up front
    pub fn with_initial_capacity(mut self, initial_capacity: usize) -> Self {
        self.initial_capacity = initial_capacity;
        self
    }

    /// Sets the growth increment; 0 disables growth
    pub fn with_resize_count(mut self, resize_count: usize) -> Self {
        self.resize_count = resize_count;
        self
    }
}

/// An array-backed binary heap
///
/// This heap stores (key, value) pairs and always returns the element whose key
/// ranks first under the comparer `C` (the smallest key by default).
#[derive(Debug, Clone)]
pub struct BinaryHeap<K, V, C = MinComparer> {
    /// The heap data stored as a vector of (key, value) pairs
    data: Vec<(K, V)>,
    /// Logical capacity; pushing beyond it triggers growth
    capacity: usize,
    config: BinaryHeapConfig,
    comparer: C,
}

impl<K: PartialOrd, V> BinaryHeap<K, V> {
    /// Creates an empty min-heap with the default configuration
    pub fn new() -> Self {
        Self::with_config_and_comparer(BinaryHeapConfig::default(), MinComparer)
    }

    /// Creates an empty min-heap with the given configuration
    pub fn with_config(config: BinaryHeapConfig) -> Self {
        Self::with_config_and_comparer(config, MinComparer)
    }
}

impl<K, V, C: Comparer<K>> BinaryHeap<K, V, C> {
    /// Creates an empty heap ordered by `comparer`
    pub fn with_comparer(comparer: C) -> Self {
        Self::with_config_and_comparer(BinaryHeapConfig::default(), comparer)
    }

    /// Creates an empty heap with the given configuration and comparer
    pub fn with_config_and_comparer(config: BinaryHeapConfig, comparer: C) -> Self {
        Self {
            data: Vec::with_capacity(config.initial_capacity),
            capacity: config.initial_capacity,
            config,
            comparer,
        }
    }

    /// Returns the logical capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the growth increment (0 means growth is disabled)
    pub fn resize_count(&self) -> usize {
        self.config.resize_count
    }

    /// Changes the growth increment for future pushes
    pub fn set_resize_count(&mut self, resize_count: usize) {
        self.config.resize_count = resize_count;
    }

    /// Forgets all elements but keeps the allocated storage
    ///
    /// Unlike [`Heap::clear`], the logical capacity is preserved, so a
    /// fixed-capacity heap can be refilled without allocating.
    pub fn reset(&mut self) {
        self.data.clear();
    }

    /// Iterates over all elements in storage order (not priority order)
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.data.iter().map(|(k, v)| (k, v))
    }

    /// Consumes the heap, returning its elements in priority order
    pub fn into_sorted_vec(mut self) -> Vec<(K, V)> {
        let mut sorted = Vec::with_capacity(self.data.len());
        while let Some(entry) = self.pop() {
            sorted.push(entry);
        }
        sorted
    }

    /// Raises the logical capacity by one resize increment
    fn grow(&mut self) -> Result<(), HeapError> {
        let increment = self.config.resize_count;
        if increment == 0 {
            return Err(HeapError::CapacityExhausted {
                capacity: self.capacity,
            });
        }

        let new_capacity = self
            .capacity
            .checked_add(increment)
            .ok_or(HeapError::AllocationFailed)?;
        self.data
            .try_reserve_exact(new_capacity - self.data.len())
            .map_err(|_| HeapError::AllocationFailed)?;

        trace!(from = self.capacity, to = new_capacity, "growing binary heap");
        self.capacity = new_capacity;
        Ok(())
    }

    /// Move element at index up to maintain heap property
    fn sift_up(&mut self, mut index: usize) {
        while index > 0 {
            let parent = (index - 1) / 2;
            if self
                .comparer
                .outranks(&self.data[index].0, &self.data[parent].0)
            {
                self.data.swap(index, parent);
                index = parent;
            } else {
                break;
            }
        }
    }

    /// Move element at index down to maintain heap property
    fn sift_down(&mut self, mut index: usize) {
        let len = self.data.len();
        loop {
            let left = 2 * index + 1;
            let right = 2 * index + 2;
            let mut best = index;

            if left < len && self.comparer.outranks(&self.data[left].0, &self.data[best].0) {
                best = left;
            }
            if right < len && self.comparer.outranks(&self.data[right].0, &self.data[best].0) {
                best = right;
            }

            if best != index {
                self.data.swap(index, best);
                index = best;
            } else {
                break;
            }
        }
    }
}

impl<K, V, C: Comparer<K>> Heap<K, V> for BinaryHeap<K, V, C> {
    /// Drops all elements and returns the storage to its configured initial size
    fn clear(&mut self) {
        self.data = Vec::with_capacity(self.config.initial_capacity);
        self.capacity = self.config.initial_capacity;
    }

    fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn len(&self) -> usize {
        self.data.len()
    }

    fn push(&mut self, key: K, value: V) -> Result<(), HeapError> {
        if self.data.len() >= self.capacity {
            self.grow()?;
        }
        self.data.push((key, value));
        self.sift_up(self.data.len() - 1);
        Ok(())
    }

    fn peek(&self) -> Option<(&K, &V)> {
        self.data.first().map(|(k, v)| (k, v))
    }

    fn pop(&mut self) -> Option<(K, V)> {
        if self.data.is_empty() {
            return None;
        }

        let last_idx = self.data.len() - 1;
        self.data.swap(0, last_idx);
        let result = self.data.pop();

        if !self.data.is_empty() {
            self.sift_down(0);
        }

        result
    }
}

impl<K, V, C: Comparer<K>> MergeableHeap<K, V> for BinaryHeap<K, V, C> {
    /// Pushes every element of `other`
    ///
    /// Merging never drops elements: when the combined length exceeds the
    /// logical capacity, the capacity is raised to exactly that length, even
    /// with growth disabled. Later pushes are limited by the new capacity as
    /// usual. If the up-front reservation fails, the elements are still moved
    /// and storage grows per element, which aborts only if the allocator does.
    fn merge(&mut self, other: Self) {
        let needed = self.data.len() + other.data.len();
        if needed > self.capacity {
            if let Err(err) = self.data.try_reserve_exact(needed - self.data.len()) {
                error!(%err, needed, "could not reserve storage for merge");
            }
            trace!(from = self.capacity, to = needed, "raising capacity for merge");
            self.capacity = needed;
        }
        for (key, value) in other.data {
            self.data.push((key, value));
            self.sift_up(self.data.len() - 1);
        }
    }
}

impl<K, V, C: Comparer<K> + Default> Default for BinaryHeap<K, V, C> {
    fn default() -> Self {
        Self::with_comparer(C::default())
    }
}
