use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

#[derive(Clone)]
enum LockScope {
    Global(Arc<Mutex<()>>),
    PerEntity(Arc<RwLock<HashMap<String, Arc<Mutex<()>>>>>),
}

/// Serializes read-modify-write sequences on shared article counters.
///
/// The default is one process-wide lock: the view-count flush and every
/// counter mutation take turns regardless of article. With `per_entity`
/// enabled each article gets its own lock and unrelated articles can
/// proceed in parallel. The registry lock is never held across an
/// `.await` on the critical section itself.
#[derive(Clone)]
pub struct MutationGuard {
    scope: LockScope,
}

impl MutationGuard {
    pub fn new(per_entity: bool) -> Self {
        let scope = if per_entity {
            LockScope::PerEntity(Arc::new(RwLock::new(HashMap::new())))
        } else {
            LockScope::Global(Arc::new(Mutex::new(())))
        };
        Self { scope }
    }

    /// Runs `action` while holding the lock for `entity_id`. The lock is
    /// released on every exit path of `action`.
    pub async fn with_lock<F, Fut, T>(&self, entity_id: &str, action: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        match &self.scope {
            LockScope::Global(lock) => {
                let _guard = lock.lock().await;
                action().await
            }
            LockScope::PerEntity(locks) => {
                let lock_arc = {
                    let read = locks.read().await;
                    if let Some(lock) = read.get(entity_id) {
                        lock.clone()
                    } else {
                        drop(read);
                        let mut write = locks.write().await;
                        write
                            .entry(entity_id.to_string())
                            .or_insert_with(|| Arc::new(Mutex::new(())))
                            .clone()
                    }
                };

                let out = {
                    let _guard = lock_arc.lock().await;
                    action().await
                };

                // Exactly 2 refs means map entry + this local clone, nobody waiting.
                if Arc::strong_count(&lock_arc) == 2 {
                    let mut write = locks.write().await;
                    // Re-check under the write lock: a waiter may have cloned
                    // the entry in between.
                    let can_prune = write
                        .get(entity_id)
                        .map(|current| {
                            Arc::ptr_eq(current, &lock_arc) && Arc::strong_count(&lock_arc) == 2
                        })
                        .unwrap_or(false);
                    if can_prune {
                        write.remove(entity_id);
                    }
                }

                out
            }
        }
    }

    /// ロック表に残っているエンティティ数（グローバルモードでは常に 0）
    pub async fn tracked_entities(&self) -> usize {
        match &self.scope {
            LockScope::Global(_) => 0,
            LockScope::PerEntity(locks) => locks.read().await.len(),
        }
    }
}
