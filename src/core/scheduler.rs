//! Debounced scan scheduling.
//!
//! Every document gets its own schedule: at most one pending scan, a lock
//! that keeps two scans of the same document from overlapping, and a flag
//! telling whether a progress indicator is currently shown for it. Bursts of
//! edits coalesce into one scan after a quiet period.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// Handed to a running scan
#[derive(Debug, Clone)]
pub struct ScanSlot {
    progress_visible: Arc<AtomicBool>,
}

impl ScanSlot {
    /// Claim the document's progress indicator.
    ///
    /// Returns `None` while another scan of the same document shows one.
    pub fn claim_progress(&self) -> Option<ProgressClaim> {
        self.progress_visible
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| ProgressClaim {
                progress_visible: self.progress_visible.clone(),
            })
    }

    pub fn is_progress_visible(&self) -> bool {
        self.progress_visible.load(Ordering::Acquire)
    }
}

/// Releases the progress indicator flag when dropped
#[derive(Debug)]
pub struct ProgressClaim {
    progress_visible: Arc<AtomicBool>,
}

impl Drop for ProgressClaim {
    fn drop(&mut self) {
        self.progress_visible.store(false, Ordering::Release);
    }
}

#[derive(Debug)]
struct PendingScan {
    handle: JoinHandle<()>,
    started: Arc<AtomicBool>,
}

#[derive(Debug, Default)]
struct DocumentSchedule {
    pending: Option<PendingScan>,
    scan_lock: Arc<Mutex<()>>,
    progress_visible: Arc<AtomicBool>,
}

/// Per-document debounce state
#[derive(Debug)]
pub struct ScanScheduler<K> {
    debounce: Duration,
    documents: HashMap<K, DocumentSchedule>,
}

impl<K> ScanScheduler<K>
where
    K: Eq + Hash + Clone,
{
    pub fn new(debounce: Duration) -> Self {
        Self {
            debounce,
            documents: HashMap::new(),
        }
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    pub fn set_debounce(&mut self, debounce: Duration) {
        self.debounce = debounce;
    }

    /// Schedule a scan of `key` after the debounce period.
    ///
    /// A scan that is still waiting for its quiet period or for a running
    /// scan to finish is cancelled and replaced. A scan that already started
    /// runs to completion; the new one waits for it before starting.
    pub fn schedule<F, Fut>(&mut self, key: K, scan: F)
    where
        F: FnOnce(ScanSlot) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let schedule = self.documents.entry(key).or_default();

        if let Some(previous) = schedule.pending.take() {
            if !previous.started.load(Ordering::Acquire) {
                previous.handle.abort();
            }
        }

        let started = Arc::new(AtomicBool::new(false));
        let scan_lock = schedule.scan_lock.clone();
        let slot = ScanSlot {
            progress_visible: schedule.progress_visible.clone(),
        };
        let delay = self.debounce;
        let task_started = started.clone();

        let handle = tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            // Waiting for the lock still counts as pending
            let _guard = scan_lock.lock().await;
            task_started.store(true, Ordering::Release);
            scan(slot).await;
        });

        schedule.pending = Some(PendingScan { handle, started });
    }

    /// Cancel a pending scan of `key` and forget its state.
    ///
    /// While a scan of `key` is running its state is kept, so a scan
    /// scheduled after reopening the document still waits for it.
    pub fn cancel(&mut self, key: &K) {
        let Some(schedule) = self.documents.get_mut(key) else {
            return;
        };

        if let Some(pending) = schedule.pending.take() {
            if !pending.started.load(Ordering::Acquire) {
                pending.handle.abort();
            }
        }

        // Only a started scan holds the lock
        let running = schedule.scan_lock.try_lock().is_err();
        if !running {
            self.documents.remove(key);
        }
    }

    /// Whether `key` has a scan that has not started yet
    pub fn is_pending(&self, key: &K) -> bool {
        self.documents
            .get(key)
            .and_then(|schedule| schedule.pending.as_ref())
            .is_some_and(|pending| {
                !pending.started.load(Ordering::Acquire) && !pending.handle.is_finished()
            })
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
