//! Parallel property-based tests comparing all heap implementations
//!
//! These tests generate random sequences of operations and apply them to ALL heap
//! implementations simultaneously. Tie order among equal keys may differ between
//! variants, so only keys are compared.
//!
//! ## Testing Strategy
//!
//! 1. **Generate random inputs**: Sequences of operations (push, pop, merge, clear)
//! 2. **Apply to all heaps**: Run the same sequence on every implementation
//! 3. **Compare intermediate results**: After each operation, verify all heaps
//!    report the same top key and length
//! 4. **Compare final results**: Drain all heaps and verify they produce identical
//!    key sequences

use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;
use rust_priority_heaps::binary::BinaryHeap;
use rust_priority_heaps::binomial::BinomialHeap;
use rust_priority_heaps::fibonacci::FibonacciHeap;
use rust_priority_heaps::{Comparer, Heap, MaxComparer, MergeableHeap, MinComparer};

/// All three variants driven in lockstep
struct Trio<C: Comparer<i32>> {
    binary: BinaryHeap<i32, u32, C>,
    binomial: BinomialHeap<i32, u32, C>,
    fibonacci: FibonacciHeap<i32, u32, C>,
}

impl<C: Comparer<i32> + Default> Trio<C> {
    fn new() -> Self {
        Self {
            binary: BinaryHeap::default(),
            binomial: BinomialHeap::default(),
            fibonacci: FibonacciHeap::default(),
        }
    }

    fn push(&mut self, key: i32, value: u32) {
        self.binary.push(key, value).unwrap();
        self.binomial.push(key, value).unwrap();
        self.fibonacci.push(key, value).unwrap();
    }

    fn merge(&mut self, other: Self) {
        self.binary.merge(other.binary);
        self.binomial.merge(other.binomial);
        self.fibonacci.merge(other.fibonacci);
    }

    fn clear(&mut self) {
        self.binary.clear();
        self.binomial.clear();
        self.fibonacci.clear();
    }

    fn pop_keys(&mut self) -> [Option<i32>; 3] {
        [
            self.binary.pop().map(|(k, _)| k),
            self.binomial.pop().map(|(k, _)| k),
            self.fibonacci.pop().map(|(k, _)| k),
        ]
    }

    fn check_agreement(&self) -> Result<(), TestCaseError> {
        let len = self.binary.len();
        prop_assert_eq!(self.binomial.len(), len);
        prop_assert_eq!(self.fibonacci.len(), len);

        let top = self.binary.peek().map(|(k, _)| *k);
        prop_assert_eq!(self.binomial.peek().map(|(k, _)| *k), top);
        prop_assert_eq!(self.fibonacci.peek().map(|(k, _)| *k), top);
        Ok(())
    }

    fn drain(&mut self) -> Result<Vec<i32>, TestCaseError> {
        let mut keys = Vec::new();
        loop {
            let [a, b, c] = self.pop_keys();
            prop_assert_eq!(a, b);
            prop_assert_eq!(a, c);
            match a {
                Some(key) => keys.push(key),
                None => return Ok(keys),
            }
        }
    }
}

fn run_ops<C: Comparer<i32> + Default>(
    initial: Vec<i32>,
    ops: Vec<(u8, i32)>,
) -> Result<Vec<i32>, TestCaseError> {
    let mut trio = Trio::<C>::new();
    let mut next_value = 0u32;

    for key in initial {
        trio.push(key, next_value);
        next_value += 1;
    }
    trio.check_agreement()?;

    for (op, key) in ops {
        match op % 10 {
            0..=4 => {
                trio.push(key, next_value);
                next_value += 1;
            }
            5..=7 => {
                let [a, b, c] = trio.pop_keys();
                prop_assert_eq!(a, b);
                prop_assert_eq!(a, c);
            }
            8 => {
                let mut other = Trio::<C>::new();
                for offset in 0..(key.rem_euclid(8)) {
                    other.push(key - offset, next_value);
                    next_value += 1;
                }
                other.pop_keys();
                trio.merge(other);
            }
            _ => {
                if key % 7 == 0 {
                    trio.clear();
                }
            }
        }
        trio.check_agreement()?;
    }

    trio.drain()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn test_all_heaps_identical_behavior(
        initial in prop::collection::vec(-50i32..50, 0..40),
        ops in prop::collection::vec((any::<u8>(), -50i32..50), 0..150)
    ) {
        let drained = run_ops::<MinComparer>(initial, ops)?;
        prop_assert!(drained.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_all_heaps_identical_behavior_max(
        initial in prop::collection::vec(-50i32..50, 0..40),
        ops in prop::collection::vec((any::<u8>(), -50i32..50), 0..150)
    ) {
        let drained = run_ops::<MaxComparer>(initial, ops)?;
        prop_assert!(drained.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_round_trip_sort_identical(keys in prop::collection::vec(any::<i32>(), 0..400)) {
        let mut trio = Trio::<MinComparer>::new();
        for (i, &key) in keys.iter().enumerate() {
            trio.push(key, i as u32);
        }
        let drained = trio.drain()?;

        let mut expected = keys;
        expected.sort_unstable();
        prop_assert_eq!(drained, expected);
    }
}
