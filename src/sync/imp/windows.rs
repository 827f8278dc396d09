//! Windows backends: critical section (process scope) and mutex object (system scope)

use super::MutexImpl;
use crate::sync::mutex::{LockError, MutexBackend};
use std::cell::UnsafeCell;
use std::time::Duration;
use tracing::{error, warn};
use windows_sys::Win32::Foundation::{
    CloseHandle, GetLastError, HANDLE, WAIT_ABANDONED, WAIT_OBJECT_0, WAIT_TIMEOUT,
};
use windows_sys::Win32::System::Threading::{
    CreateMutexW, DeleteCriticalSection, EnterCriticalSection, InitializeCriticalSection,
    LeaveCriticalSection, ReleaseMutex, TryEnterCriticalSection, WaitForSingleObject,
    CRITICAL_SECTION, INFINITE,
};

fn last_error(op: &'static str) -> LockError {
    let code = unsafe { GetLastError() } as i32;
    error!(op, code, "windows mutex operation failed");
    LockError::Os { op, code }
}

/// In-process lock backed by a `CRITICAL_SECTION`
///
/// Critical sections have no timed acquire, so `try_lock` polls
/// `TryEnterCriticalSection` until the timeout elapses.
pub(crate) struct CriticalSection {
    inner: Box<UnsafeCell<CRITICAL_SECTION>>,
}

unsafe impl Send for CriticalSection {}
unsafe impl Sync for CriticalSection {}

impl CriticalSection {
    pub(crate) fn new() -> Self {
        let inner: Box<UnsafeCell<CRITICAL_SECTION>> =
            Box::new(UnsafeCell::new(unsafe { std::mem::zeroed() }));
        unsafe { InitializeCriticalSection(inner.get()) };
        Self { inner }
    }

    fn try_once(&self) -> bool {
        unsafe { TryEnterCriticalSection(self.inner.get()) != 0 }
    }
}

impl MutexImpl for CriticalSection {
    fn lock(&self) -> Result<(), LockError> {
        unsafe { EnterCriticalSection(self.inner.get()) };
        Ok(())
    }

    fn try_lock(&self, timeout: Duration) -> Result<bool, LockError> {
        if timeout.is_zero() {
            return Ok(self.try_once());
        }
        super::poll_until(timeout, || Ok(self.try_once()))
    }

    unsafe fn unlock(&self) -> Result<(), LockError> {
        LeaveCriticalSection(self.inner.get());
        Ok(())
    }

    fn backend(&self) -> MutexBackend {
        MutexBackend::CriticalSection
    }
}

impl Drop for CriticalSection {
    fn drop(&mut self) {
        unsafe { DeleteCriticalSection(self.inner.get()) };
    }
}

/// System-wide lock backed by a Windows mutex object, optionally named
pub(crate) struct SystemMutex {
    handle: HANDLE,
}

impl SystemMutex {
    pub(crate) fn new(name: Option<&str>) -> Result<Self, LockError> {
        let wide: Option<Vec<u16>> = name.map(|name| name.encode_utf16().chain(Some(0)).collect());
        let name_ptr = wide.as_ref().map_or(std::ptr::null(), |wide| wide.as_ptr());

        let handle = unsafe { CreateMutexW(std::ptr::null(), 0, name_ptr) };
        if handle == 0 {
            let code = unsafe { GetLastError() } as i32;
            error!(code, ?name, "CreateMutexW failed");
            return Err(LockError::Create { code });
        }
        Ok(Self { handle })
    }

    fn wait(&self, millis: u32) -> Result<bool, LockError> {
        match unsafe { WaitForSingleObject(self.handle, millis) } {
            WAIT_OBJECT_0 => Ok(true),
            WAIT_ABANDONED => {
                warn!("acquired a mutex abandoned by a terminated owner");
                Ok(true)
            }
            WAIT_TIMEOUT => Ok(false),
            _ => Err(last_error("WaitForSingleObject")),
        }
    }
}

impl MutexImpl for SystemMutex {
    fn lock(&self) -> Result<(), LockError> {
        self.wait(INFINITE).map(drop)
    }

    fn try_lock(&self, timeout: Duration) -> Result<bool, LockError> {
        // INFINITE is u32::MAX; stay one below it
        let millis = timeout.as_millis().min(u128::from(INFINITE - 1)) as u32;
        self.wait(millis)
    }

    unsafe fn unlock(&self) -> Result<(), LockError> {
        if ReleaseMutex(self.handle) == 0 {
            return Err(last_error("ReleaseMutex"));
        }
        Ok(())
    }

    fn backend(&self) -> MutexBackend {
        MutexBackend::NamedMutex
    }
}

impl Drop for SystemMutex {
    fn drop(&mut self) {
        if unsafe { CloseHandle(self.handle) } == 0 {
            error!("CloseHandle failed for mutex object");
        }
    }
}
