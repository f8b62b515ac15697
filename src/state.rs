//! Shared application state: the pool, the per-activity lock registry and
//! the notification collaborator.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use sqlx::SqlitePool;

use crate::services::notifier::ParticipationNotifier;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub locks: ActivityLocks,
    pub notifier: Arc<dyn ParticipationNotifier>,
}

/// One async mutex per activity id. Capacity-affecting operations on the
/// same activity serialize on it; operations on different activities never
/// contend. The registry itself is only held long enough to look up or
/// create an entry, never across an await point.
#[derive(Clone, Default)]
pub struct ActivityLocks {
    inner: Arc<Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>>,
}

impl ActivityLocks {
    pub async fn acquire(&self, activity_id: &str) -> tokio::sync::OwnedMutexGuard<()> {
        let entry = {
            let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            map.entry(activity_id.to_string())
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
                .clone()
        };
        entry.lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::ActivityLocks;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn same_activity_serializes() {
        let locks = ActivityLocks::default();
        let in_critical = Arc::new(AtomicBool::new(false));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let locks = locks.clone();
            let flag = in_critical.clone();
            handles.push(tokio::spawn(async move {
                let _guard = locks.acquire("a1").await;
                assert!(!flag.swap(true, Ordering::SeqCst));
                tokio::task::yield_now().await;
                flag.store(false, Ordering::SeqCst);
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
    }

    #[tokio::test]
    async fn different_activities_do_not_contend() {
        let locks = ActivityLocks::default();
        let _a = locks.acquire("a1").await;
        // Must not block even while a1 is held.
        let _b = locks.acquire("a2").await;
    }
}
