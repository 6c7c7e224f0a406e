use bestpub_model::Isbn;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Per-title mutual exclusion shared by ingestion and publishing.
///
/// Reconciling a title tears its container down and rebuilds it, and
/// publishing walks that same container; holding the title's lock keeps the
/// two from interleaving. Different titles never contend.
#[derive(Debug, Clone, Default)]
pub struct TitleLocks {
    locks: Arc<Mutex<HashMap<Isbn, Arc<AsyncMutex<()>>>>>,
}

/// Held for as long as the title must not be touched by anyone else.
#[must_use]
#[derive(Debug)]
pub struct TitleGuard {
    _guard: OwnedMutexGuard<()>,
}

impl TitleLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `isbn`.
    pub async fn lock(&self, isbn: &Isbn) -> TitleGuard {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            // Nobody else holds or waits on these.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(isbn.clone()).or_default())
        };
        TitleGuard { _guard: lock.lock_owned().await }
    }

    /// Number of titles currently locked or waited on.
    pub fn contended(&self) -> usize {
        let locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.values().filter(|lock| Arc::strong_count(lock) > 1).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn isbn(s: &str) -> Isbn {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn test_same_title_is_exclusive() {
        let locks = TitleLocks::new();
        let guard = locks.lock(&isbn("9780203807217")).await;
        let waiting = tokio::time::timeout(Duration::from_millis(50), locks.lock(&isbn("9780203807217"))).await;
        assert!(waiting.is_err());
        drop(guard);
        let _again = locks.lock(&isbn("9780203807217")).await;
    }

    #[tokio::test]
    async fn test_other_titles_do_not_contend() {
        let locks = TitleLocks::new();
        let _first = locks.lock(&isbn("9780203807217")).await;
        let _second = locks.lock(&isbn("9791234567896")).await;
        assert_eq!(locks.contended(), 2);
    }

    #[tokio::test]
    async fn test_released_locks_are_pruned() {
        let locks = TitleLocks::new();
        drop(locks.lock(&isbn("9780203807217")).await);
        assert_eq!(locks.contended(), 0);
    }
}
