//! Per-account mutual exclusion.
//!
//! Two requests for the same user must not interleave their
//! read-verify-write sequence, while requests for different users run in
//! parallel. Each user name maps to its own mutex for as long as somebody
//! holds or waits on it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Default)]
pub struct AccountLocks {
    slots: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl AccountLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the lock for `user`.
    ///
    /// The entry is released even if `f` panics.
    pub fn with_lock<T>(&self, user: &str, f: impl FnOnce() -> T) -> T {
        let slot = Slot {
            locks: self,
            user,
            mutex: Arc::clone(self.slots().entry(user.to_owned()).or_default()),
        };

        let _guard = slot.mutex.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    }

    /// Number of users that currently have a lock entry.
    pub fn active(&self) -> usize {
        self.slots().len()
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<String, Arc<Mutex<()>>>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// One holder's reference to a user's mutex.
struct Slot<'a> {
    locks: &'a AccountLocks,
    user: &'a str,
    mutex: Arc<Mutex<()>>,
}

impl Drop for Slot<'_> {
    fn drop(&mut self) {
        // Two references left means the map's and ours: nobody else waits.
        let mut slots = self.locks.slots();
        if slots
            .get(self.user)
            .is_some_and(|s| Arc::strong_count(s) == 2 && Arc::ptr_eq(s, &self.mutex))
        {
            slots.remove(self.user);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::panic::{self, AssertUnwindSafe};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn entries_are_released_after_use() {
        let locks = AccountLocks::new();
        let value = locks.with_lock("alice", || {
            assert_eq!(locks.active(), 1);
            42
        });
        assert_eq!(value, 42);
        assert_eq!(locks.active(), 0);
    }

    #[test]
    fn same_user_is_serialized() {
        let locks = Arc::new(AccountLocks::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let max_seen = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let locks = Arc::clone(&locks);
                let inside = Arc::clone(&inside);
                let max_seen = Arc::clone(&max_seen);
                thread::spawn(move || {
                    locks.with_lock("alice", || {
                        let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                        max_seen.fetch_max(now, Ordering::SeqCst);
                        thread::sleep(Duration::from_millis(20));
                        inside.fetch_sub(1, Ordering::SeqCst);
                    });
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(max_seen.load(Ordering::SeqCst), 1);
        assert_eq!(locks.active(), 0);
    }

    #[test]
    fn entry_is_released_when_the_closure_panics() {
        let locks = AccountLocks::new();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            locks.with_lock("alice", || panic!("handler blew up"))
        }));
        assert!(outcome.is_err());
        assert_eq!(locks.active(), 0);

        // The user can still be locked afterwards.
        assert_eq!(locks.with_lock("alice", || 7), 7);
    }

    #[test]
    fn different_users_do_not_block_each_other() {
        let locks = AccountLocks::new();
        locks.with_lock("alice", || {
            // Would deadlock if "bob" shared alice's mutex.
            locks.with_lock("bob", || {});
        });
    }
}
