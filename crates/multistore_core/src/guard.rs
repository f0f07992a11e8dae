//! Shared/exclusive guard around store state.

use parking_lot::RwLock;

/// A read-write lock with scoped access helpers.
///
/// Every access path into the guarded value goes through one of the
/// methods below. Guards are released on every exit, including early
/// returns through `?` and unwinding panics; the lock never poisons.
///
/// The lock is not reentrant. Code running under a guard must receive the
/// already-borrowed state instead of calling back into the guard.
#[derive(Debug, Default)]
pub struct ReadWriteGuard<T> {
    lock: RwLock<T>,
}

impl<T> ReadWriteGuard<T> {
    /// Wraps a value.
    pub fn new(value: T) -> Self {
        Self {
            lock: RwLock::new(value),
        }
    }

    /// Runs `f` with shared access.
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let guard = self.lock.read();
        f(&guard)
    }

    /// Runs `f` with exclusive access.
    pub fn write<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut guard = self.lock.write();
        f(&mut guard)
    }
}
