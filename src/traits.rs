//! Common traits for heap data structures
//!
//! This module provides the trait hierarchy shared by every heap in the crate:
//!
//! - [`Heap`]: the priority-queue contract (`push`, `peek`, `pop`, `len`,
//!   `is_empty`, `clear`) implemented by all variants
//! - [`MergeableHeap`]: absorbing another heap of the same type
//! - [`DecreaseKeyHeap`]: handle-based re-ranking of an element already in the heap
//!
//! [`Heap`] is object safe, so the variants can be used interchangeably behind
//! `Box<dyn Heap<K, V>>`.

use crate::sync::LockError;
use thiserror::Error;

/// Error type for heap operations
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeapError {
    /// The heap is full and automatic growth is disabled
    #[error("heap capacity of {capacity} elements exhausted and growth is disabled")]
    CapacityExhausted {
        /// The logical capacity that was reached
        capacity: usize,
    },
    /// Growing the backing storage failed
    #[error("failed to grow heap storage")]
    AllocationFailed,
    /// The new key ranks below the current key
    #[error("new key does not outrank the current key")]
    KeyNotDecreased,
    /// The handle is no longer valid (element was removed)
    #[error("handle is no longer valid (element was removed)")]
    InvalidHandle,
    /// The mutex guarding a shared heap could not be acquired or released
    #[error(transparent)]
    Lock(#[from] LockError),
}

/// A handle to an element in the heap, used for decrease_key operations
///
/// This is an opaque type that identifies a specific element in the heap.
/// A handle is only meaningful for the heap that issued it.
pub trait Handle: Clone + PartialEq + Eq {}

/// Base trait for heap/priority queue data structures
///
/// Heaps store (key, value) pairs and hand out the pair whose key ranks first
/// under the heap's [`Comparer`](crate::compare::Comparer). With the default
/// [`MinComparer`](crate::compare::MinComparer) that is the smallest key.
///
/// # Example
///
/// ```rust
/// use rust_priority_heaps::Heap;
/// use rust_priority_heaps::binary::BinaryHeap;
///
/// let mut heap = BinaryHeap::new();
/// heap.push(3, "three").unwrap();
/// heap.push(1, "one").unwrap();
/// heap.push(2, "two").unwrap();
///
/// assert_eq!(heap.peek(), Some((&1, &"one")));
/// assert_eq!(heap.pop(), Some((1, "one")));
/// ```
pub trait Heap<K, V> {
    /// Removes all elements, releasing internal nodes
    fn clear(&mut self);

    /// Returns true if the heap is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the number of elements in the heap
    fn len(&self) -> usize;

    /// Inserts an element with the given key
    ///
    /// Duplicate keys are allowed. On error the heap is left unchanged.
    ///
    /// # Errors
    /// Only array-backed heaps fail, with [`HeapError::CapacityExhausted`] when
    /// growth is disabled or [`HeapError::AllocationFailed`] when growth fails.
    fn push(&mut self, key: K, value: V) -> Result<(), HeapError>;

    /// Returns the top key and value without removing them
    ///
    /// # Time Complexity
    /// O(1) for all implementations
    fn peek(&self) -> Option<(&K, &V)>;

    /// Removes and returns the top key and value
    ///
    /// Returns `None` on an empty heap, any number of times, without side effects.
    fn pop(&mut self) -> Option<(K, V)>;
}

impl<K, V, H: Heap<K, V> + ?Sized> Heap<K, V> for Box<H> {
    fn clear(&mut self) {
        (**self).clear()
    }

    fn is_empty(&self) -> bool {
        (**self).is_empty()
    }

    fn len(&self) -> usize {
        (**self).len()
    }

    fn push(&mut self, key: K, value: V) -> Result<(), HeapError> {
        (**self).push(key, value)
    }

    fn peek(&self) -> Option<(&K, &V)> {
        (**self).peek()
    }

    fn pop(&mut self) -> Option<(K, V)> {
        (**self).pop()
    }
}

/// Heaps that can absorb another heap of the same type
pub trait MergeableHeap<K, V>: Heap<K, V> {
    /// Moves every element of `other` into `self`
    ///
    /// Handles issued by `other` must not be used afterwards.
    fn merge(&mut self, other: Self)
    where
        Self: Sized;
}

/// Extended heap trait with `decrease_key` support
///
/// # Example
///
/// ```rust
/// use rust_priority_heaps::{DecreaseKeyHeap, Heap};
/// use rust_priority_heaps::fibonacci::FibonacciHeap;
///
/// let mut heap = FibonacciHeap::new();
/// heap.push(7, "other").unwrap();
/// let handle = heap.push_with_handle(10, "item");
/// heap.decrease_key(&handle, 5).unwrap();
/// assert_eq!(heap.peek(), Some((&5, &"item")));
/// ```
pub trait DecreaseKeyHeap<K, V>: Heap<K, V> {
    /// The handle type for this heap
    type Handle: Handle;

    /// Inserts an element, returning a handle for later `decrease_key` calls
    fn push_with_handle(&mut self, key: K, value: V) -> Self::Handle;

    /// Moves an element toward the top by giving it a better-ranked key
    ///
    /// # Errors
    /// [`HeapError::InvalidHandle`] if the element is no longer in the heap,
    /// [`HeapError::KeyNotDecreased`] if `new_key` ranks below the current key.
    fn decrease_key(&mut self, handle: &Self::Handle, new_key: K) -> Result<(), HeapError>;
}
