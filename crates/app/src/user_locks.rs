//! Keyed async mutex serializing conversation turns per user.
//!
//! Each active user id maps to its own `tokio::sync::Mutex`; the map only
//! holds weak references, so an entry dies with the last guard and is pruned
//! on the next acquisition. Different users never wait on each other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use eventbot_domain::id::UserId;
use tokio::sync::OwnedMutexGuard;

type TurnLock = tokio::sync::Mutex<()>;

/// Registry of per-user turn locks.
#[derive(Debug, Default)]
pub struct UserLocks {
    locks: Mutex<HashMap<UserId, Weak<TurnLock>>>,
}

impl UserLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other turn of `user_id` is in flight and claim it.
    ///
    /// The turn lasts as long as the returned guard.
    pub async fn acquire(&self, user_id: &UserId) -> OwnedMutexGuard<()> {
        let lock = self.lock_for(user_id);
        lock.lock_owned().await
    }

    #[cfg(test)]
    fn active(&self) -> usize {
        let locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.values().filter(|weak| weak.strong_count() > 0).count()
    }

    fn lock_for(&self, user_id: &UserId) -> Arc<TurnLock> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.retain(|_, weak| weak.strong_count() > 0);
        if let Some(lock) = locks.get(user_id).and_then(Weak::upgrade) {
            return lock;
        }
        let lock = Arc::new(TurnLock::new(()));
        locks.insert(user_id.clone(), Arc::downgrade(&lock));
        lock
    }
}
