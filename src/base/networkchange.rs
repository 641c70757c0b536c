//! Network reachability tracking.
//!
//! A [`ReachabilityMonitor`] owns one boolean snapshot. A single background
//! task updates it from a stream of path-change events; every
//! [`Client`](crate::client::Client) reads it without locking.

use futures::{Stream, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

/// Read-only view of network reachability queried before each request.
pub trait Reachability: Send + Sync {
    /// Cached snapshot; must not block or touch the network.
    fn is_reachable(&self) -> bool;
}

/// Status of the current network path as reported by the OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathStatus {
    Satisfied,
    Unsatisfied,
    RequiresConnection,
}

impl PathStatus {
    pub fn is_reachable(self) -> bool {
        self == PathStatus::Satisfied
    }
}

/// Single-writer, many-reader reachability flag with a start/stop lifecycle.
pub struct ReachabilityMonitor {
    reachable: Arc<AtomicBool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Default for ReachabilityMonitor {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ReachabilityMonitor {
    /// Create a stopped monitor with an initial snapshot.
    pub fn new(initially_reachable: bool) -> Self {
        Self {
            reachable: Arc::new(AtomicBool::new(initially_reachable)),
            task: Mutex::new(None),
        }
    }

    /// Start consuming path-change events on a background task.
    ///
    /// Restarting replaces the previous event source. Must be called from
    /// within a tokio runtime.
    pub fn start<S>(&self, events: S)
    where
        S: Stream<Item = PathStatus> + Send + 'static,
    {
        let reachable = self.reachable.clone();
        let handle = tokio::spawn(async move {
            futures::pin_mut!(events);
            while let Some(status) = events.next().await {
                let now = status.is_reachable();
                let before = reachable.swap(now, Ordering::Release);
                if before != now {
                    tracing::debug!(status = ?status, reachable = now, "network path changed");
                }
            }
        });

        let mut task = self.task.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = task.replace(handle) {
            previous.abort();
        }
    }

    /// Stop observing; the last snapshot is kept.
    pub fn stop(&self) {
        let mut task = self.task.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(handle) = task.take() {
            handle.abort();
        }
    }

    /// Check whether the background observer is still consuming events.
    pub fn is_running(&self) -> bool {
        let task = self.task.lock().unwrap_or_else(|e| e.into_inner());
        task.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Overwrite the snapshot directly.
    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::Release);
    }
}

impl Reachability for ReachabilityMonitor {
    fn is_reachable(&self) -> bool {
        self.reachable.load(Ordering::Acquire)
    }
}

impl Drop for ReachabilityMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_snapshot() {
        assert!(ReachabilityMonitor::new(true).is_reachable());
        assert!(!ReachabilityMonitor::new(false).is_reachable());
        assert!(ReachabilityMonitor::default().is_reachable());
    }

    #[test]
    fn test_set_reachable() {
        let monitor = ReachabilityMonitor::new(true);
        monitor.set_reachable(false);
        assert!(!monitor.is_reachable());
    }

    #[tokio::test]
    async fn test_events_update_snapshot() {
        let monitor = ReachabilityMonitor::new(true);
        let (tx, rx) = futures::channel::mpsc::unbounded();
        monitor.start(rx);
        assert!(monitor.is_running());

        tx.unbounded_send(PathStatus::Unsatisfied).unwrap();
        for _ in 0..100 {
            if !monitor.is_reachable() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert!(!monitor.is_reachable());

        tx.unbounded_send(PathStatus::Satisfied).unwrap();
        for _ in 0..100 {
            if monitor.is_reachable() {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert!(monitor.is_reachable());

        monitor.stop();
        tokio::task::yield_now().await;
        assert!(!monitor.is_running());
    }

    #[tokio::test]
    async fn test_stop_keeps_last_snapshot() {
        let monitor = ReachabilityMonitor::new(true);
        monitor.start(futures::stream::iter(vec![PathStatus::RequiresConnection]));
        for _ in 0..100 {
            if !monitor.is_reachable() {
                break;
            }
            tokio::task::yield_now().await;
        }
        monitor.stop();
        assert!(!monitor.is_reachable());
    }
}
