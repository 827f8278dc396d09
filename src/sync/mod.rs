//! Mutual exclusion for heaps shared across threads
//!
//! None of the heaps are internally synchronized. A heap used from several
//! threads is wrapped in a [`SharedHeap`] (or guarded by hand with a [`Mutex`])
//! and every heap call runs with the lock held.
//!
//! [`Mutex`] is a facade over a [`MutexImpl`] backend picked once at
//! construction:
//!
//! | target  | [`MutexScope::Process`]     | [`MutexScope::System`]         |
//! |---------|-----------------------------|--------------------------------|
//! | unix    | pthread mutex               | pthread mutex                  |
//! | windows | critical section            | (named) Windows mutex object   |
//! | other   | `parking_lot` raw mutex     | `parking_lot` raw mutex        |
//!
//! Every backend honours the `try_lock` timeout.

mod imp;
mod mutex;
mod shared;

pub use imp::fallback::ParkingLotMutex;
pub use imp::MutexImpl;
pub use mutex::{LockError, Mutex, MutexBackend, MutexConfig, MutexGuard, MutexScope};
pub use shared::SharedHeap;
