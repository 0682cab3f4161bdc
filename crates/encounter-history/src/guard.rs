//! Held and deferred locks on a history's entries.
//!
//! [`EntriesGuard`] is proof that the entries lock is held. It dereferences
//! to the [`HistoryBuffer`], so every read and mutation of committed records
//! goes through it and cannot outlive it. Dropping the guard releases the
//! lock.
//!
//! [`DeferredEntriesLock`] names the entries lock without holding it. It has
//! no accessors; callers acquire it once any locks that must precede it in
//! their own lock order are held.
//!
//! A poisoned entries mutex is recovered rather than propagated: the buffer
//! is only mutated by a single `push`, which cannot leave it half-written.

use std::ops::{Deref, DerefMut};
use std::sync::{Mutex, MutexGuard, PoisonError, TryLockError};

use crate::buffer::HistoryBuffer;

/// A held entries lock.
///
/// The producer cannot commit while any guard is alive, so do not call
/// producer operations on a history from a thread holding one of its
/// guards.
pub struct EntriesGuard<'a, P> {
    /// The mutex this guard was issued from, for ownership checks.
    lock: &'a Mutex<HistoryBuffer<P>>,
    /// The held lock.
    inner: MutexGuard<'a, HistoryBuffer<P>>,
}

impl<'a, P> EntriesGuard<'a, P> {
    pub(crate) fn acquire(lock: &'a Mutex<HistoryBuffer<P>>) -> Self {
        let inner = lock.lock().unwrap_or_else(PoisonError::into_inner);
        Self { lock, inner }
    }

    /// Whether this guard was issued for `lock`.
    pub(crate) fn is_for(&self, lock: &Mutex<HistoryBuffer<P>>) -> bool {
        std::ptr::eq(self.lock, lock)
    }
}

impl<P> Deref for EntriesGuard<'_, P> {
    type Target = HistoryBuffer<P>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<P> DerefMut for EntriesGuard<'_, P> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

impl<P> core::fmt::Debug for EntriesGuard<'_, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EntriesGuard")
            .field("len", &self.inner.len())
            .field("capacity", &self.inner.capacity())
            .finish_non_exhaustive()
    }
}

/// An entries lock that has not been acquired yet.
#[must_use = "a deferred lock does nothing until acquired"]
pub struct DeferredEntriesLock<'a, P> {
    lock: &'a Mutex<HistoryBuffer<P>>,
}

impl<'a, P> DeferredEntriesLock<'a, P> {
    pub(crate) const fn new(lock: &'a Mutex<HistoryBuffer<P>>) -> Self {
        Self { lock }
    }

    /// Block until the entries lock is held.
    pub fn acquire(self) -> EntriesGuard<'a, P> {
        EntriesGuard::acquire(self.lock)
    }

    /// Take the entries lock if it is free, handing the deferred lock back
    /// otherwise.
    pub fn try_acquire(self) -> Result<EntriesGuard<'a, P>, Self> {
        match self.lock.try_lock() {
            Ok(inner) => Ok(EntriesGuard {
                lock: self.lock,
                inner,
            }),
            Err(TryLockError::Poisoned(poisoned)) => Ok(EntriesGuard {
                lock: self.lock,
                inner: poisoned.into_inner(),
            }),
            Err(TryLockError::WouldBlock) => Err(self),
        }
    }
}

impl<P> core::fmt::Debug for DeferredEntriesLock<'_, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DeferredEntriesLock").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::num::NonZeroUsize;

    use super::*;

    fn entries() -> Mutex<HistoryBuffer> {
        Mutex::new(HistoryBuffer::new(NonZeroUsize::MIN))
    }

    #[test]
    fn deferred_lock_acquires() {
        let lock = entries();
        let guard = DeferredEntriesLock::new(&lock).acquire();
        assert!(guard.is_for(&lock));
        assert!(guard.is_empty());
    }

    #[test]
    fn try_acquire_hands_back_when_held() {
        let lock = entries();
        let held = EntriesGuard::acquire(&lock);
        let deferred = DeferredEntriesLock::new(&lock);
        let deferred = match deferred.try_acquire() {
            Ok(_) => panic!("lock should be busy"),
            Err(deferred) => deferred,
        };
        drop(held);
        assert!(deferred.try_acquire().is_ok());
    }

    #[test]
    fn guard_knows_its_mutex() {
        let first = entries();
        let second = entries();
        let guard = EntriesGuard::acquire(&first);
        assert!(guard.is_for(&first));
        assert!(!guard.is_for(&second));
    }

    #[test]
    fn poisoned_lock_is_recovered() {
        let lock = entries();
        let outcome: std::thread::Result<()> = std::thread::scope(|scope| {
            scope
                .spawn(|| {
                    let _guard = EntriesGuard::acquire(&lock);
                    panic!("poison the entries lock");
                })
                .join()
        });
        assert!(outcome.is_err());
        assert!(lock.is_poisoned());
        let guard = EntriesGuard::acquire(&lock);
        assert!(guard.is_empty());
    }
}
