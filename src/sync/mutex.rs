//! The [`Mutex`] facade and its configuration

use super::imp::{self, MutexImpl};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, warn};

/// Error type for mutex operations
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockError {
    /// An OS lock call failed
    #[error("{op} failed with OS error {code}")]
    Os {
        /// The failing OS call
        op: &'static str,
        /// Raw OS error code
        code: i32,
    },
    /// The platform lock could not be created
    #[error("failed to create platform mutex (OS error {code})")]
    Create {
        /// Raw OS error code
        code: i32,
    },
    /// `unlock` was called by a thread that does not hold the lock
    #[error("mutex is not held by the current thread")]
    NotOwner,
    /// The current thread already holds the lock
    #[error("mutex is already held by the current thread")]
    WouldDeadlock,
}

/// Who may share the lock
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum MutexScope {
    /// Threads of this process only (critical section on Windows)
    #[default]
    Process,
    /// Any process on the machine (mutex object on Windows)
    System,
}

/// The primitive backing a [`Mutex`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutexBackend {
    /// Error-checking POSIX mutex
    Pthread,
    /// Windows `CRITICAL_SECTION`
    CriticalSection,
    /// Windows mutex object, named or anonymous
    NamedMutex,
    /// `parking_lot` raw mutex
    ParkingLot,
}

/// Construction options for [`Mutex`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct MutexConfig {
    /// Sharing scope; only Windows distinguishes the two
    pub scope: MutexScope,
    /// Name of a system-scope mutex object, so other processes can open it
    pub name: Option<String>,
}

impl MutexConfig {
    /// Sets the sharing scope
    pub fn with_scope(mut self, scope: MutexScope) -> Self {
        self.scope = scope;
        self
    }

    /// Names the system-scope mutex object
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Per-thread id drawn from a process-wide counter, never reused and never zero
fn current_thread_marker() -> usize {
    static NEXT_MARKER: AtomicUsize = AtomicUsize::new(NO_OWNER + 1);
    thread_local! {
        static MARKER: usize = NEXT_MARKER.fetch_add(1, Ordering::Relaxed);
    }
    MARKER.with(|marker| *marker)
}

const NO_OWNER: usize = 0;

/// A non-reentrant lock over a platform-selected [`MutexImpl`]
///
/// The facade records which thread holds the lock, so misuse that the OS
/// primitives leave undefined is reported instead:
/// unlocking from another thread is [`LockError::NotOwner`] and locking twice
/// from the same thread is [`LockError::WouldDeadlock`].
///
/// # Example
///
/// ```rust
/// use rust_priority_heaps::sync::Mutex;
/// use std::time::Duration;
///
/// let mutex = Mutex::new().unwrap();
/// {
///     let _guard = mutex.guard().unwrap();
///     assert!(mutex.is_held_by_current_thread());
/// }
/// assert!(mutex.try_lock(Duration::ZERO).unwrap());
/// mutex.unlock().unwrap();
/// ```
pub struct Mutex {
    inner: Box<dyn MutexImpl>,
    owner: AtomicUsize,
}

impl Mutex {
    /// Creates a process-scope mutex with the default backend for this target
    pub fn new() -> Result<Self, LockError> {
        Self::with_config(MutexConfig::default())
    }

    /// Creates a mutex with the backend `config` selects for this target
    pub fn with_config(config: MutexConfig) -> Result<Self, LockError> {
        let inner = imp::create(&config)?;
        debug!(backend = ?inner.backend(), scope = ?config.scope, "mutex backend selected");
        Ok(Self::with_impl(inner))
    }

    /// Wraps an explicit backend
    pub fn with_impl(inner: Box<dyn MutexImpl>) -> Self {
        Self {
            inner,
            owner: AtomicUsize::new(NO_OWNER),
        }
    }

    /// The primitive backing this mutex
    pub fn backend(&self) -> MutexBackend {
        self.inner.backend()
    }

    /// Returns true if the calling thread holds the lock
    pub fn is_held_by_current_thread(&self) -> bool {
        self.owner.load(Ordering::Relaxed) == current_thread_marker()
    }

    /// Blocks until the lock is acquired
    pub fn lock(&self) -> Result<(), LockError> {
        let me = current_thread_marker();
        if self.owner.load(Ordering::Relaxed) == me {
            return Err(LockError::WouldDeadlock);
        }
        self.inner.lock()?;
        self.owner.store(me, Ordering::Relaxed);
        Ok(())
    }

    /// Tries to acquire the lock for up to `timeout`
    ///
    /// Returns `Ok(false)` when the timeout elapsed; `Duration::ZERO` makes a
    /// single non-blocking attempt.
    pub fn try_lock(&self, timeout: Duration) -> Result<bool, LockError> {
        let me = current_thread_marker();
        if self.owner.load(Ordering::Relaxed) == me {
            return Err(LockError::WouldDeadlock);
        }
        let acquired = self.inner.try_lock(timeout)?;
        if acquired {
            self.owner.store(me, Ordering::Relaxed);
        }
        Ok(acquired)
    }

    /// Releases the lock held by the calling thread
    pub fn unlock(&self) -> Result<(), LockError> {
        let me = current_thread_marker();
        if self.owner.load(Ordering::Relaxed) != me {
            return Err(LockError::NotOwner);
        }
        self.owner.store(NO_OWNER, Ordering::Relaxed);

        // SAFETY: the owner check above proves this thread holds the lock
        let result = unsafe { self.inner.unlock() };
        if result.is_err() {
            self.owner.store(me, Ordering::Relaxed);
        }
        result
    }

    /// Locks and returns a guard that unlocks on drop
    pub fn guard(&self) -> Result<MutexGuard<'_>, LockError> {
        self.lock()?;
        Ok(MutexGuard::new(self))
    }

    /// Like [`try_lock`](Self::try_lock), returning a guard on success
    pub fn try_guard(&self, timeout: Duration) -> Result<Option<MutexGuard<'_>>, LockError> {
        Ok(self.try_lock(timeout)?.then(|| MutexGuard::new(self)))
    }
}

impl std::fmt::Debug for Mutex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mutex")
            .field("backend", &self.backend())
            .field("locked", &(self.owner.load(Ordering::Relaxed) != NO_OWNER))
            .finish()
    }
}

impl Drop for Mutex {
    fn drop(&mut self) {
        let owner = *self.owner.get_mut();
        match owner {
            NO_OWNER => {}
            owner if owner == current_thread_marker() => {
                if let Err(err) = self.unlock() {
                    error!(%err, "failed to release mutex on drop");
                }
            }
            _ => warn!("dropping a mutex still held by another thread"),
        }
    }
}

/// Holds a [`Mutex`] until dropped
///
/// Not `Send`: the lock must be released by the thread that took it.
#[must_use = "the mutex is released as soon as the guard is dropped"]
pub struct MutexGuard<'a> {
    mutex: &'a Mutex,
    _not_send: PhantomData<*const ()>,
}

impl<'a> MutexGuard<'a> {
    fn new(mutex: &'a Mutex) -> Self {
        Self {
            mutex,
            _not_send: PhantomData,
        }
    }
}

impl std::fmt::Debug for MutexGuard<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MutexGuard").field("mutex", self.mutex).finish()
    }
}

impl Drop for MutexGuard<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.mutex.unlock() {
            error!(%err, "failed to release mutex guard");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::ParkingLotMutex;

    #[test]
    fn test_relock_is_reported() {
        let mutex = Mutex::new().unwrap();
        mutex.lock().unwrap();
        assert_eq!(mutex.lock(), Err(LockError::WouldDeadlock));
        assert_eq!(mutex.try_lock(Duration::ZERO), Err(LockError::WouldDeadlock));
        mutex.unlock().unwrap();
        assert_eq!(mutex.unlock(), Err(LockError::NotOwner));
    }

    #[test]
    fn test_unlock_from_other_thread_is_rejected() {
        let mutex = Mutex::new().unwrap();
        mutex.lock().unwrap();
        let result = std::thread::scope(|s| s.spawn(|| mutex.unlock()).join().unwrap());
        assert_eq!(result, Err(LockError::NotOwner));
        assert!(mutex.is_held_by_current_thread());
        mutex.unlock().unwrap();
    }

    #[test]
    fn test_guard_releases_on_drop() {
        let mutex = Mutex::new().unwrap();
        {
            let _guard = mutex.guard().unwrap();
            assert!(mutex.is_held_by_current_thread());
        }
        assert!(!mutex.is_held_by_current_thread());
        let guard = mutex.try_guard(Duration::ZERO).unwrap();
        assert!(guard.is_some());
    }

    #[test]
    fn test_exited_owner_is_not_mistaken_for_new_thread() {
        let mutex = Mutex::with_impl(Box::new(ParkingLotMutex::new()));
        std::thread::scope(|s| {
            s.spawn(|| mutex.lock().unwrap());
        });
        for _ in 0..8 {
            let (held, acquired, unlock) = std::thread::scope(|s| {
                s.spawn(|| {
                    (
                        mutex.is_held_by_current_thread(),
                        mutex.try_lock(Duration::ZERO),
                        mutex.unlock(),
                    )
                })
                .join()
                .unwrap()
            });
            assert!(!held);
            assert_eq!(acquired, Ok(false));
            assert_eq!(unlock, Err(LockError::NotOwner));
        }
    }

    #[test]
    fn test_parking_lot_backend() {
        let mutex = Mutex::with_impl(Box::new(ParkingLotMutex::new()));
        assert_eq!(mutex.backend(), MutexBackend::ParkingLot);
        mutex.lock().unwrap();
        let acquired = std::thread::scope(|s| {
            s.spawn(|| mutex.try_lock(Duration::from_millis(10)))
                .join()
                .unwrap()
        });
        assert_eq!(acquired, Ok(false));
        mutex.unlock().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_unix_uses_pthread() {
        let config = MutexConfig::default()
            .with_scope(MutexScope::System)
            .with_name("ignored");
        let mutex = Mutex::with_config(config).unwrap();
        assert_eq!(mutex.backend(), MutexBackend::Pthread);
    }

    #[cfg(windows)]
    #[test]
    fn test_windows_scope_selects_backend() {
        let process = Mutex::new().unwrap();
        assert_eq!(process.backend(), MutexBackend::CriticalSection);

        let system = Mutex::with_config(MutexConfig::default().with_scope(MutexScope::System)).unwrap();
        assert_eq!(system.backend(), MutexBackend::NamedMutex);
        assert!(system.try_lock(Duration::from_millis(5)).unwrap());
        system.unlock().unwrap();
    }
}
