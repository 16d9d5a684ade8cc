//! Debounced background writes of the rate limit map.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use meridian_core::ports::{RateLimitSnapshot, SnapshotStore};

/// Coalesces write requests into at most one pending-or-running write.
///
/// `pending` is the single write slot. `dirty` records changes made after the
/// writer took its snapshot, so the writer goes round once more instead of
/// a second writer being started.
pub(crate) struct DebouncedWriter {
    store: Arc<dyn SnapshotStore>,
    delay: Duration,
    pending: Arc<AtomicBool>,
    dirty: Arc<AtomicBool>,
}

impl DebouncedWriter {
    pub(crate) fn new(store: Arc<dyn SnapshotStore>, delay: Duration) -> Self {
        Self {
            store,
            delay,
            pending: Arc::new(AtomicBool::new(false)),
            dirty: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Request a write of `entries`. Returns immediately.
    pub(crate) fn schedule(&self, entries: &Arc<Mutex<RateLimitSnapshot>>) {
        self.dirty.store(true, Ordering::SeqCst);
        if self.pending.swap(true, Ordering::SeqCst) {
            return;
        }

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            self.pending.store(false, Ordering::SeqCst);
            tracing::debug!("No async runtime, skipping rate limit snapshot write");
            return;
        };

        let store = self.store.clone();
        let delay = self.delay;
        let pending = self.pending.clone();
        let dirty = self.dirty.clone();
        let entries = entries.clone();

        runtime.spawn(async move {
            loop {
                tokio::time::sleep(delay).await;

                dirty.store(false, Ordering::SeqCst);
                let snapshot = {
                    let guard = entries.lock().unwrap_or_else(PoisonError::into_inner);
                    guard.clone()
                };

                match store.save(&snapshot).await {
                    Ok(()) => {
                        tracing::trace!(entries = snapshot.len(), "Rate limit snapshot written")
                    }
                    Err(e) => tracing::debug!(error = %e, "Rate limit snapshot write failed"),
                }

                pending.store(false, Ordering::SeqCst);
                // Either nothing changed, or a newer writer already took the slot.
                if !dirty.load(Ordering::SeqCst) || pending.swap(true, Ordering::SeqCst) {
                    break;
                }
            }
        });
    }
}
