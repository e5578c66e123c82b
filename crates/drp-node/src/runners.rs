// Path: crates/drp-node/src/runners.rs
//! Interval runners: background tasks that periodically re-announce
//! discovery requests or resync interest for a node's joined objects.
//!
//! Both runners share the same `Stopped -> Running -> Stopped` state
//! machine: a `JoinHandle` paired with an `AtomicU8` so a caller can
//! check or flip state without holding a lock, and double start/stop
//! is a logged no-op rather than an error.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::warn;

const STOPPED: u8 = 0;
const RUNNING: u8 = 1;

/// A single periodic task that can be started and stopped, idempotently.
pub struct IntervalRunnerHandle {
    state: Arc<AtomicU8>,
    task: std::sync::Mutex<Option<JoinHandle<()>>>,
}

impl IntervalRunnerHandle {
    /// Spawns `tick` on a fixed `period`, starting immediately.
    pub fn start<F, Fut>(period: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: std::future::Future<Output = ()> + Send,
    {
        let state = Arc::new(AtomicU8::new(RUNNING));
        let loop_state = state.clone();
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                if loop_state.load(Ordering::SeqCst) != RUNNING {
                    break;
                }
                tick().await;
            }
        });
        Self {
            state,
            task: std::sync::Mutex::new(Some(task)),
        }
    }

    /// True while the runner's loop is still ticking.
    pub fn is_running(&self) -> bool {
        self.state.load(Ordering::SeqCst) == RUNNING
    }

    /// Stops the runner. Stopping an already-stopped runner is a
    /// logged no-op.
    pub fn stop(&self) {
        if self.state.swap(STOPPED, Ordering::SeqCst) == STOPPED {
            warn!("interval runner stopped twice");
            return;
        }
        if let Ok(mut guard) = self.task.lock() {
            if let Some(task) = guard.take() {
                task.abort();
            }
        }
    }
}

impl Drop for IntervalRunnerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Periodically broadcasts a `DRP_DISCOVERY` request so the node keeps
/// a fresh view of who else is on the network.
pub fn discovery_runner<A: drp_object::Drp + drp_object::AclView + 'static, D: drp_object::Drp + 'static>(
    node: Arc<crate::node::Node<A, D>>,
    period: Duration,
) -> IntervalRunnerHandle {
    IntervalRunnerHandle::start(period, move || {
        let node = node.clone();
        async move {
            if let Err(e) = node.discover_peers().await {
                warn!(error = %e, "discovery tick failed");
            }
        }
    })
}

/// Periodically broadcasts a `SYNC` for every joined object, catching
/// up on anything missed while disconnected or while a gossip message
/// was dropped.
pub fn reconnect_runner<A: drp_object::Drp + drp_object::AclView + 'static, D: drp_object::Drp + 'static>(
    node: Arc<crate::node::Node<A, D>>,
    object_ids: Vec<drp_types::ObjectId>,
    period: Duration,
) -> IntervalRunnerHandle {
    IntervalRunnerHandle::start(period, move || {
        let node = node.clone();
        let object_ids = object_ids.clone();
        async move {
            for object_id in &object_ids {
                if let Err(e) = node.request_sync(object_id).await {
                    warn!(object_id = %object_id, error = %e, "reconnect sync tick failed");
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[tokio::test]
    async fn runner_ticks_until_stopped() {
        let count = Arc::new(AtomicUsize::new(0));
        let ticking = count.clone();
        let runner = IntervalRunnerHandle::start(Duration::from_millis(5), move || {
            let ticking = ticking.clone();
            async move {
                ticking.fetch_add(1, Ordering::SeqCst);
            }
        });
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(runner.is_running());
        runner.stop();
        let seen_at_stop = count.load(Ordering::SeqCst);
        assert!(seen_at_stop > 0);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(count.load(Ordering::SeqCst), seen_at_stop);
        assert!(!runner.is_running());
    }

    #[tokio::test]
    async fn stopping_twice_is_a_harmless_no_op() {
        let runner = IntervalRunnerHandle::start(Duration::from_millis(50), || async {});
        runner.stop();
        runner.stop();
        assert!(!runner.is_running());
    }
}
