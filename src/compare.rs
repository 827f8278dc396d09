//! Key ordering strategies
//!
//! Every heap decides parent/child order through a [`Comparer`]. A comparer
//! returns [`Ordering::Less`] when its first argument should sit above the
//! second, so [`MinComparer`] builds a min-heap and [`MaxComparer`] a max-heap.
//!
//! Both built-in comparers only need [`PartialOrd`], so floating point keys
//! such as squared distances work directly. Incomparable keys (NaN) are
//! treated as equal.

use std::cmp::Ordering;

/// Orders two keys for a heap
pub trait Comparer<K> {
    /// Compares two keys; `Less` means `a` ranks above `b`
    fn compare(&self, a: &K, b: &K) -> Ordering;

    /// Returns true if `a` strictly ranks above `b`
    #[inline]
    fn outranks(&self, a: &K, b: &K) -> bool {
        self.compare(a, b) == Ordering::Less
    }
}

/// Smallest key first
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MinComparer;

impl<K: PartialOrd> Comparer<K> for MinComparer {
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        a.partial_cmp(b).unwrap_or(Ordering::Equal)
    }
}

/// Largest key first
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaxComparer;

impl<K: PartialOrd> Comparer<K> for MaxComparer {
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        b.partial_cmp(a).unwrap_or(Ordering::Equal)
    }
}

/// Adapts a closure into a [`Comparer`]
///
/// ```rust
/// use rust_priority_heaps::compare::FnComparer;
/// use rust_priority_heaps::binary::BinaryHeap;
/// use rust_priority_heaps::Heap;
///
/// // Order by absolute value
/// let mut heap = BinaryHeap::with_comparer(FnComparer(|a: &i32, b: &i32| a.abs().cmp(&b.abs())));
/// heap.push(-5, ()).unwrap();
/// heap.push(2, ()).unwrap();
/// assert_eq!(heap.pop(), Some((2, ())));
/// ```
#[derive(Clone, Copy)]
pub struct FnComparer<F>(pub F);

impl<K, F> Comparer<K> for FnComparer<F>
where
    F: Fn(&K, &K) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        (self.0)(a, b)
    }
}

impl<F> std::fmt::Debug for FnComparer<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("FnComparer").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_and_max() {
        assert!(MinComparer.outranks(&1, &2));
        assert!(!MinComparer.outranks(&2, &1));
        assert!(MaxComparer.outranks(&2, &1));
        assert!(!MaxComparer.outranks(&1, &1));
    }

    #[test]
    fn test_nan_is_not_outranking() {
        assert!(!MinComparer.outranks(&f32::NAN, &1.0));
        assert!(!MinComparer.outranks(&1.0, &f32::NAN));
        assert_eq!(MaxComparer.compare(&f32::NAN, &0.5), Ordering::Equal);
    }

    #[test]
    fn test_closure() {
        let by_len = FnComparer(|a: &&str, b: &&str| a.len().cmp(&b.len()));
        assert!(by_len.outranks(&"ab", &"abc"));
    }
}
