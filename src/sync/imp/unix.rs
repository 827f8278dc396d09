//! POSIX backend: a boxed, error-checking pthread mutex

use super::MutexImpl;
use crate::sync::mutex::{LockError, MutexBackend};
use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::time::Duration;
use tracing::error;

/// pthread mutex of type `PTHREAD_MUTEX_ERRORCHECK`
///
/// Boxed because a pthread mutex must not move once initialized.
pub(crate) struct PthreadMutex {
    inner: Box<UnsafeCell<libc::pthread_mutex_t>>,
}

unsafe impl Send for PthreadMutex {}
unsafe impl Sync for PthreadMutex {}

struct PthreadMutexAttr<'a>(&'a mut MaybeUninit<libc::pthread_mutexattr_t>);

impl Drop for PthreadMutexAttr<'_> {
    fn drop(&mut self) {
        unsafe {
            libc::pthread_mutexattr_destroy(self.0.as_mut_ptr());
        }
    }
}

fn os_error(op: &'static str, code: libc::c_int) -> LockError {
    error!(op, code, "pthread mutex operation failed");
    LockError::Os { op, code }
}

fn create_check(code: libc::c_int) -> Result<(), LockError> {
    if code == 0 {
        Ok(())
    } else {
        error!(code, "pthread mutex creation failed");
        Err(LockError::Create { code })
    }
}

impl PthreadMutex {
    pub(crate) fn new() -> Result<Self, LockError> {
        let inner = Box::new(UnsafeCell::new(libc::PTHREAD_MUTEX_INITIALIZER));
        let mut attr = MaybeUninit::<libc::pthread_mutexattr_t>::uninit();
        unsafe {
            create_check(libc::pthread_mutexattr_init(attr.as_mut_ptr()))?;
            let attr = PthreadMutexAttr(&mut attr);
            create_check(libc::pthread_mutexattr_settype(
                attr.0.as_mut_ptr(),
                libc::PTHREAD_MUTEX_ERRORCHECK,
            ))?;
            create_check(libc::pthread_mutex_init(inner.get(), attr.0.as_ptr()))?;
        }
        Ok(Self { inner })
    }

    fn try_once(&self) -> Result<bool, LockError> {
        match unsafe { libc::pthread_mutex_trylock(self.inner.get()) } {
            0 => Ok(true),
            libc::EBUSY => Ok(false),
            code => Err(os_error("pthread_mutex_trylock", code)),
        }
    }

    #[cfg(any(target_os = "linux", target_os = "android", target_os = "freebsd"))]
    fn timed_lock(&self, timeout: Duration) -> Result<bool, LockError> {
        let mut now = MaybeUninit::<libc::timespec>::uninit();
        if unsafe { libc::clock_gettime(libc::CLOCK_REALTIME, now.as_mut_ptr()) } != 0 {
            let code = std::io::Error::last_os_error().raw_os_error().unwrap_or(-1);
            return Err(os_error("clock_gettime", code));
        }
        let deadline = deadline_after(unsafe { now.assume_init() }, timeout);

        match unsafe { libc::pthread_mutex_timedlock(self.inner.get(), &deadline) } {
            0 => Ok(true),
            libc::ETIMEDOUT => Ok(false),
            code => Err(os_error("pthread_mutex_timedlock", code)),
        }
    }

    // No pthread_mutex_timedlock here
    #[cfg(not(any(target_os = "linux", target_os = "android", target_os = "freebsd")))]
    fn timed_lock(&self, timeout: Duration) -> Result<bool, LockError> {
        super::poll_until(timeout, || self.try_once())
    }
}

/// Absolute CLOCK_REALTIME deadline `timeout` after `now`, saturating
#[cfg(any(target_os = "linux", target_os = "android", target_os = "freebsd"))]
fn deadline_after(now: libc::timespec, timeout: Duration) -> libc::timespec {
    const NANOS_PER_SEC: i64 = 1_000_000_000;

    let nanos = now.tv_nsec as i64 + i64::from(timeout.subsec_nanos());
    let secs = i64::try_from(timeout.as_secs())
        .unwrap_or(i64::MAX)
        .saturating_add(now.tv_sec as i64)
        .saturating_add(nanos / NANOS_PER_SEC);

    let mut deadline: libc::timespec = unsafe { std::mem::zeroed() };
    deadline.tv_sec = libc::time_t::try_from(secs).unwrap_or(libc::time_t::MAX);
    deadline.tv_nsec = (nanos % NANOS_PER_SEC) as _;
    deadline
}

impl MutexImpl for PthreadMutex {
    fn lock(&self) -> Result<(), LockError> {
        match unsafe { libc::pthread_mutex_lock(self.inner.get()) } {
            0 => Ok(()),
            code => Err(os_error("pthread_mutex_lock", code)),
        }
    }

    fn try_lock(&self, timeout: Duration) -> Result<bool, LockError> {
        if timeout.is_zero() {
            self.try_once()
        } else {
            self.timed_lock(timeout)
        }
    }

    unsafe fn unlock(&self) -> Result<(), LockError> {
        match libc::pthread_mutex_unlock(self.inner.get()) {
            0 => Ok(()),
            code => Err(os_error("pthread_mutex_unlock", code)),
        }
    }

    fn backend(&self) -> MutexBackend {
        MutexBackend::Pthread
    }
}

impl Drop for PthreadMutex {
    fn drop(&mut self) {
        let code = unsafe { libc::pthread_mutex_destroy(self.inner.get()) };
        if code != 0 {
            error!(code, "pthread_mutex_destroy failed");
        }
    }
}
