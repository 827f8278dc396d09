//! Platform lock backends

pub(crate) mod fallback;
#[cfg(unix)]
mod unix;
#[cfg(windows)]
mod windows;

use super::mutex::{LockError, MutexBackend, MutexConfig};
use std::time::Duration;

/// A raw OS lock behind the [`Mutex`](super::Mutex) facade
///
/// Implementations only provide mutual exclusion. Ownership bookkeeping
/// (who may unlock, relocking from the owner) lives in the facade.
pub trait MutexImpl: Send + Sync {
    /// Blocks until the lock is acquired
    fn lock(&self) -> Result<(), LockError>;

    /// Tries to acquire the lock for up to `timeout`
    ///
    /// Returns `Ok(false)` if the timeout elapsed. A zero timeout makes a
    /// single attempt.
    fn try_lock(&self, timeout: Duration) -> Result<bool, LockError>;

    /// Releases the lock
    ///
    /// # Safety
    ///
    /// The calling thread must hold the lock.
    unsafe fn unlock(&self) -> Result<(), LockError>;

    /// Which primitive this is
    fn backend(&self) -> MutexBackend;
}

/// Picks the backend for the current target and `config.scope`
pub(crate) fn create(config: &MutexConfig) -> Result<Box<dyn MutexImpl>, LockError> {
    #[cfg(unix)]
    {
        if config.name.is_some() {
            tracing::debug!(name = ?config.name, "mutex names are ignored on unix");
        }
        Ok(Box::new(unix::PthreadMutex::new()?))
    }

    #[cfg(windows)]
    {
        use super::mutex::MutexScope;
        match config.scope {
            MutexScope::Process => Ok(Box::new(windows::CriticalSection::new())),
            MutexScope::System => Ok(Box::new(windows::SystemMutex::new(config.name.as_deref())?)),
        }
    }

    #[cfg(not(any(unix, windows)))]
    {
        let _ = config;
        Ok(Box::new(fallback::ParkingLotMutex::new()))
    }
}

/// Retries `attempt` with exponential backoff until it succeeds or `timeout` passes
#[cfg(any(
    windows,
    all(
        unix,
        not(any(target_os = "linux", target_os = "android", target_os = "freebsd"))
    )
))]
pub(crate) fn poll_until(
    timeout: Duration,
    mut attempt: impl FnMut() -> Result<bool, LockError>,
) -> Result<bool, LockError> {
    use std::time::Instant;

    const MAX_BACKOFF: Duration = Duration::from_millis(1);

    let deadline = Instant::now().checked_add(timeout);
    let mut backoff = Duration::from_micros(20);
    loop {
        if attempt()? {
            return Ok(true);
        }
        let now = Instant::now();
        let remaining = match deadline {
            Some(deadline) if now >= deadline => return Ok(false),
            Some(deadline) => deadline - now,
            None => backoff,
        };
        std::thread::sleep(backoff.min(remaining));
        backoff = (backoff * 2).min(MAX_BACKOFF);
    }
}
