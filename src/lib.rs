//! Priority Queues for Rust
//!
//! This crate provides three priority queues behind one object-safe [`Heap`] trait,
//! plus a platform-bridged [`Mutex`](sync::Mutex) for sharing a heap across threads.
//!
//! # Features
//!
//! - **Binary Heap**: array-backed; O(log n) push and pop, O(1) peek; explicit,
//!   configurable growth
//! - **Binomial Heap**: forest of binomial trees; O(log n) push, pop and merge
//! - **Fibonacci Heap**: O(1) amortized push, peek and decrease_key; O(log n)
//!   amortized pop via lazy consolidation
//! - **Comparers**: min-heap, max-heap or any closure, over any `PartialOrd` key
//! - **Sync**: [`sync::Mutex`] over pthread, Windows critical sections or mutex
//!   objects, and [`sync::SharedHeap`] to guard a heap with it
//!
//! # Example
//!
//! ```rust
//! use rust_priority_heaps::fibonacci::FibonacciHeap;
//! use rust_priority_heaps::{DecreaseKeyHeap, Heap};
//!
//! let mut heap = FibonacciHeap::new();
//! let handle1 = heap.push_with_handle(5, "item1");
//! heap.push(3, "item2").unwrap();
//! heap.decrease_key(&handle1, 1).unwrap();
//! assert_eq!(heap.peek(), Some((&1, &"item1")));
//! ```
//!
//! All variants are interchangeable behind a trait object:
//!
//! ```rust
//! use rust_priority_heaps::binary::BinaryHeap;
//! use rust_priority_heaps::binomial::BinomialHeap;
//! use rust_priority_heaps::fibonacci::FibonacciHeap;
//! use rust_priority_heaps::Heap;
//!
//! let heaps: Vec<Box<dyn Heap<i32, ()>>> = vec![
//!     Box::new(BinaryHeap::new()),
//!     Box::new(BinomialHeap::new()),
//!     Box::new(FibonacciHeap::new()),
//! ];
//! for mut heap in heaps {
//!     for key in [5, 3, 8, 1, 4] {
//!         heap.push(key, ()).unwrap();
//!     }
//!     assert_eq!(heap.pop(), Some((1, ())));
//! }
//! ```

pub mod binary;
pub mod binomial;
pub mod compare;
pub mod fibonacci;
mod storage;
pub mod sync;
pub mod traits;

// Re-export the main traits for convenience
pub use compare::{Comparer, FnComparer, MaxComparer, MinComparer};
pub use traits::{DecreaseKeyHeap, Handle, Heap, HeapError, MergeableHeap};
