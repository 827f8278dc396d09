//! Portable backend built on `parking_lot`

use super::MutexImpl;
use crate::sync::mutex::{LockError, MutexBackend};
use parking_lot::lock_api::{RawMutex as _, RawMutexTimed as _};
use std::time::Duration;

/// Portable lock backed by [`parking_lot::RawMutex`]
///
/// Used on targets without a native backend, and available everywhere through
/// [`Mutex::with_impl`](crate::sync::Mutex::with_impl).
pub struct ParkingLotMutex {
    raw: parking_lot::RawMutex,
}

impl ParkingLotMutex {
    /// Creates an unlocked mutex
    pub fn new() -> Self {
        Self {
            raw: parking_lot::RawMutex::INIT,
        }
    }
}

impl Default for ParkingLotMutex {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ParkingLotMutex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParkingLotMutex")
            .field("locked", &self.raw.is_locked())
            .finish()
    }
}

impl MutexImpl for ParkingLotMutex {
    fn lock(&self) -> Result<(), LockError> {
        self.raw.lock();
        Ok(())
    }

    fn try_lock(&self, timeout: Duration) -> Result<bool, LockError> {
        if timeout.is_zero() {
            Ok(self.raw.try_lock())
        } else {
            Ok(self.raw.try_lock_for(timeout))
        }
    }

    unsafe fn unlock(&self) -> Result<(), LockError> {
        self.raw.unlock();
        Ok(())
    }

    fn backend(&self) -> MutexBackend {
        MutexBackend::ParkingLot
    }
}
