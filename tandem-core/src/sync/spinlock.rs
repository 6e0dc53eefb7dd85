use core::fmt;

use tandem_io::arch;
use tandem_io::atomic::full_fence;
use tandem_io::SharedU32;

const FREE: u32 = 0;

/// Test-and-set lock over a single word (0 = free, 1 = held).
///
/// There is no owner field: nothing stops a hart from releasing a lock it
/// does not hold. Prefer [`SpinLock::lock`], whose guard makes the pairing
/// structural.
pub struct SpinLock {
    word: SharedU32,
}

impl SpinLock {
    pub const fn new() -> Self {
        Self { word: SharedU32::new(FREE) }
    }

    /// Spins until the lock is taken.
    ///
    /// # Logic
    /// Reservation-load the word; if it is non-zero start over, otherwise try
    /// a conditional store of 1. A failed store also starts over. The winner
    /// issues a full fence before returning, so nothing inside the critical
    /// section is hoisted above the acquisition.
    pub fn acquire(&self) {
        arch::reserve_acquire(self.word.as_cell());
    }

    /// One acquisition attempt. Returns `false` if the lock was held or the
    /// reservation was lost.
    pub fn try_acquire(&self) -> bool {
        arch::try_reserve_acquire(self.word.as_cell())
    }

    /// Full fence, then a plain store of 0.
    pub fn release(&self) {
        full_fence();
        self.word.store_plain(FREE);
    }

    pub fn lock(&self) -> SpinGuard<'_> {
        self.acquire();
        SpinGuard { lock: self }
    }

    pub fn try_lock(&self) -> Option<SpinGuard<'_>> {
        if self.try_acquire() {
            Some(SpinGuard { lock: self })
        } else {
            None
        }
    }

    /// Racy snapshot, for diagnostics only.
    pub fn is_locked(&self) -> bool {
        self.word.load() != FREE
    }

    /// Forces the lock free. Only the primary calls this, before any
    /// secondary has been released.
    pub fn reset(&self) {
        self.word.store(FREE);
    }
}

impl Default for SpinLock {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SpinLock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpinLock").field("locked", &self.is_locked()).finish()
    }
}

/// Holds a [`SpinLock`]; releases it when dropped.
#[must_use = "the lock is released as soon as the guard is dropped"]
pub struct SpinGuard<'a> {
    lock: &'a SpinLock,
}

impl Drop for SpinGuard<'_> {
    fn drop(&mut self) {
        self.lock.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_utils::thread;
    use tandem_io::SharedU64;

    #[test]
    fn test_guard_releases_on_drop() {
        let lock = SpinLock::new();
        {
            let _guard = lock.lock();
            assert!(lock.is_locked());
            assert!(lock.try_lock().is_none());
        }
        assert!(!lock.is_locked());
        assert!(lock.try_lock().is_some());
        assert!(!lock.is_locked());
    }

    #[test]
    fn test_reset_frees_a_held_lock() {
        let lock = SpinLock::new();
        lock.acquire();
        lock.reset();
        assert!(!lock.is_locked());
    }

    #[test]
    fn test_no_lost_updates_under_contention() {
        const THREADS: u64 = 8;
        const ROUNDS: u64 = 2_000;

        let lock = SpinLock::new();
        // Plain read-then-write: only the lock keeps increments from racing.
        let counter = SharedU64::new(0);

        thread::scope(|s| {
            for _ in 0..THREADS {
                s.spawn(|_| {
                    for _ in 0..ROUNDS {
                        let _guard = lock.lock();
                        let v = counter.load_plain();
                        counter.store_plain(v + 1);
                    }
                });
            }
        })
        .unwrap();

        assert_eq!(counter.load(), THREADS * ROUNDS);
        assert!(!lock.is_locked());
    }
}
