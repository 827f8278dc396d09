//! A heap paired with the mutex that guards it

use super::mutex::{LockError, Mutex};
use crate::traits::{Heap, HeapError};
use std::cell::UnsafeCell;

/// A heap that can be used from several threads
///
/// Every access runs with the inner [`Mutex`] held for the whole heap call.
///
/// # Example
///
/// ```rust
/// use rust_priority_heaps::binomial::BinomialHeap;
/// use rust_priority_heaps::sync::SharedHeap;
///
/// let events = SharedHeap::new(BinomialHeap::new()).unwrap();
/// std::thread::scope(|s| {
///     for t in 0..4u64 {
///         let events = &events;
///         s.spawn(move || events.push(t * 10, "tick").unwrap());
///     }
/// });
/// assert_eq!(events.len().unwrap(), 4);
/// assert_eq!(events.pop().unwrap(), Some((0, "tick")));
/// ```
pub struct SharedHeap<H> {
    mutex: Mutex,
    heap: UnsafeCell<H>,
}

// SAFETY: the heap is only reached through `with`, which holds the mutex
unsafe impl<H: Send> Sync for SharedHeap<H> {}

impl<H> SharedHeap<H> {
    /// Wraps `heap` behind a default process-scope mutex
    pub fn new(heap: H) -> Result<Self, LockError> {
        Ok(Self::with_mutex(heap, Mutex::new()?))
    }

    /// Wraps `heap` behind an existing mutex
    pub fn with_mutex(heap: H, mutex: Mutex) -> Self {
        Self {
            mutex,
            heap: UnsafeCell::new(heap),
        }
    }

    /// Runs `f` with exclusive access to the heap
    ///
    /// Calling `with` again from inside `f` fails with
    /// [`LockError::WouldDeadlock`].
    pub fn with<R>(&self, f: impl FnOnce(&mut H) -> R) -> Result<R, LockError> {
        let _guard = self.mutex.guard()?;
        // SAFETY: the guard excludes every other access until it drops
        let heap = unsafe { &mut *self.heap.get() };
        Ok(f(heap))
    }

    /// Direct access; `&mut self` already proves exclusivity
    pub fn get_mut(&mut self) -> &mut H {
        self.heap.get_mut()
    }

    /// Consumes the wrapper and returns the heap
    pub fn into_inner(self) -> H {
        self.heap.into_inner()
    }

    /// Pushes under the lock; lock failures surface as [`HeapError::Lock`]
    pub fn push<K, V>(&self, key: K, value: V) -> Result<(), HeapError>
    where
        H: Heap<K, V>,
    {
        self.with(|heap| heap.push(key, value))?
    }

    /// Pops the top pair under the lock
    pub fn pop<K, V>(&self) -> Result<Option<(K, V)>, LockError>
    where
        H: Heap<K, V>,
    {
        self.with(|heap| heap.pop())
    }

    /// Copies out the top pair, since references cannot outlive the lock
    pub fn peek_cloned<K: Clone, V: Clone>(&self) -> Result<Option<(K, V)>, LockError>
    where
        H: Heap<K, V>,
    {
        self.with(|heap| heap.peek().map(|(k, v)| (k.clone(), v.clone())))
    }

    /// Number of elements, read under the lock
    pub fn len<K, V>(&self) -> Result<usize, LockError>
    where
        H: Heap<K, V>,
    {
        self.with(|heap| heap.len())
    }

    /// Returns true if the heap is empty, read under the lock
    pub fn is_empty<K, V>(&self) -> Result<bool, LockError>
    where
        H: Heap<K, V>,
    {
        self.with(|heap| heap.is_empty())
    }

    /// Clears the heap under the lock
    pub fn clear<K, V>(&self) -> Result<(), LockError>
    where
        H: Heap<K, V>,
    {
        self.with(|heap| heap.clear())
    }
}

impl<H> std::fmt::Debug for SharedHeap<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedHeap")
            .field("mutex", &self.mutex)
            .finish_non_exhaustive()
    }
}
