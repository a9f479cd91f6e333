//! Keyed debouncing
//!
//! Each key has at most one scheduled action. Scheduling again under the same
//! key before the window elapses aborts the earlier action and restarts the
//! window, so a burst of changes collapses into one call with the final state.
//!
//! # Blocking Lock Usage
//!
//! The pending map is guarded by a `std::sync::Mutex`. The lock is never
//! held across `.await` points; actions run after their entry is removed.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::trace;

struct Pending {
    id: u64,
    handle: JoinHandle<()>,
}

type PendingMap<K> = Arc<Mutex<HashMap<K, Pending>>>;

/// Schedules cancellable, coalescing actions per key
pub struct Debouncer<K> {
    pending: PendingMap<K>,
    next_id: AtomicU64,
}

impl<K> std::fmt::Debug for Debouncer<K>
where
    K: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pending = lock(&self.pending);
        f.debug_struct("Debouncer")
            .field("pending", &pending.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<K> Default for Debouncer<K> {
    fn default() -> Self {
        Self {
            pending: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(0),
        }
    }
}

impl<K> Debouncer<K>
where
    K: Eq + Hash + Clone + std::fmt::Debug + Send + 'static,
{
    /// Create a debouncer with nothing scheduled
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `action` once `window` has passed without another call for `key`.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn schedule<F, Fut>(&self, key: K, window: Duration, action: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let pending = Arc::clone(&self.pending);
        let task_key = key.clone();

        // Held until the entry is inserted so the task cannot fire first.
        let mut map = lock(&self.pending);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(window).await;
            {
                let mut map = lock(&pending);
                match map.get(&task_key) {
                    Some(entry) if entry.id == id => {
                        map.remove(&task_key);
                    }
                    _ => return,
                }
            }
            trace!(key = ?task_key, "Debounce window elapsed");
            action().await;
        });

        if let Some(previous) = map.insert(key, Pending { id, handle }) {
            trace!(previous = previous.id, id, "Coalescing debounced action");
            previous.handle.abort();
        }
    }

    /// Check if an action is waiting under `key`
    pub fn is_pending(&self, key: &K) -> bool {
        lock(&self.pending).contains_key(key)
    }

    /// Drop the action waiting under `key`, if any
    pub fn cancel(&self, key: &K) -> bool {
        match lock(&self.pending).remove(key) {
            Some(entry) => {
                entry.handle.abort();
                true
            }
            None => false,
        }
    }
}

impl<K> Debouncer<K> {
    /// Drop every waiting action
    pub fn cancel_all(&self) {
        for (_, entry) in lock(&self.pending).drain() {
            entry.handle.abort();
        }
    }
}

impl<K> Drop for Debouncer<K> {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

fn lock<K>(pending: &Mutex<HashMap<K, Pending>>) -> MutexGuard<'_, HashMap<K, Pending>> {
    pending.lock().unwrap_or_else(PoisonError::into_inner)
}
