//! Extreme stress tests that really push the heaps to their limits
//!
//! These tests perform large numbers of operations in various patterns
//! to catch edge cases and verify correctness under load.

use rust_priority_heaps::binary::{BinaryHeap, BinaryHeapConfig};
use rust_priority_heaps::binomial::BinomialHeap;
use rust_priority_heaps::fibonacci::FibonacciHeap;
use rust_priority_heaps::{DecreaseKeyHeap, Heap, MergeableHeap};

/// Simple linear congruential generator so runs are reproducible
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        self.0 >> 33
    }
}

/// Test massive numbers of inserts and pops
fn test_massive_operations<H: Heap<i32, i32> + Default>() {
    let mut heap = H::default();

    for i in 0..10_000 {
        heap.push(i, i).unwrap();
    }
    assert_eq!(heap.len(), 10_000);

    for i in 0..10_000 {
        assert_eq!(heap.pop(), Some((i, i)));
    }
    assert!(heap.is_empty());
}

/// Pseudo-random keys with many duplicates, popped in bursts
fn test_random_bursts<H: Heap<u64, u64> + Default>() {
    let mut heap = H::default();
    let mut rng = Lcg(42);
    let mut reference = Vec::new();

    for round in 0..50 {
        for _ in 0..200 {
            let key = rng.next() % 500;
            heap.push(key, round).unwrap();
            reference.push(key);
        }
        reference.sort_unstable_by(|a, b| b.cmp(a));
        for _ in 0..150 {
            let expected = reference.pop();
            assert_eq!(heap.pop().map(|(k, _)| k), expected);
        }
        assert_eq!(heap.len(), reference.len());
    }
}

/// Repeated merging of many small heaps into one
fn test_many_merges<H: MergeableHeap<i32, i32> + Default>() {
    let mut heap = H::default();
    for chunk in 0..200 {
        let mut small = H::default();
        for i in 0..10 {
            small.push(chunk * 10 + i, i).unwrap();
        }
        heap.merge(small);
    }
    assert_eq!(heap.len(), 2000);

    for expected in 0..2000 {
        assert_eq!(heap.pop().map(|(k, _)| k), Some(expected));
    }
}

/// Test many decrease_key operations
fn test_many_decrease_keys<H: DecreaseKeyHeap<i32, i32> + Default>() {
    let mut heap = H::default();
    let mut handles = Vec::new();

    for i in 0..2000 {
        handles.push(heap.push_with_handle(100_000 + i, i));
    }
    // Force consolidation so the cuts hit real trees
    heap.push(-1, -1).unwrap();
    assert_eq!(heap.pop(), Some((-1, -1)));

    for (i, handle) in handles.iter().enumerate().rev() {
        assert!(heap.decrease_key(handle, i as i32).is_ok());
    }

    for i in 0..2000 {
        assert_eq!(heap.pop(), Some((i, i)));
    }
}

#[test]
fn test_massive_operations_all() {
    test_massive_operations::<BinaryHeap<i32, i32>>();
    test_massive_operations::<BinomialHeap<i32, i32>>();
    test_massive_operations::<FibonacciHeap<i32, i32>>();
}

#[test]
fn test_random_bursts_all() {
    test_random_bursts::<BinaryHeap<u64, u64>>();
    test_random_bursts::<BinomialHeap<u64, u64>>();
    test_random_bursts::<FibonacciHeap<u64, u64>>();
}

#[test]
fn test_many_merges_all() {
    test_many_merges::<BinaryHeap<i32, i32>>();
    test_many_merges::<BinomialHeap<i32, i32>>();
    test_many_merges::<FibonacciHeap<i32, i32>>();
}

#[test]
fn test_fibonacci_many_decrease_keys() {
    test_many_decrease_keys::<FibonacciHeap<i32, i32>>();
}

#[test]
fn test_binary_growth_under_load() {
    let config = BinaryHeapConfig::default()
        .with_initial_capacity(1)
        .with_resize_count(1);
    let mut heap = BinaryHeap::with_config(config);
    for i in (0..5000).rev() {
        heap.push(i, ()).unwrap();
    }
    assert_eq!(heap.capacity(), 5000);
    assert_eq!(heap.pop(), Some((0, ())));
}

#[test]
fn test_fibonacci_degree_table_keeps_up() {
    let mut heap = FibonacciHeap::new();
    let mut size = 2usize;
    // Grow in stages so the degree table must be regrown between pops.
    // Each pop leaves roots behind, so every stage consolidates.
    for stage in 0..4 {
        for i in 0..size {
            heap.push(i as i64 + stage * 1_000_000, ()).unwrap();
        }
        heap.pop();
        assert!(!heap.is_empty());
        assert!(heap.is_normalized());
        let needed = (heap.len() as f64).log2().ceil() as usize + 1;
        assert!(heap.degree_capacity() >= needed);
        size *= 30;
    }
}
