//! Scheduler lifecycle management for the outbox worker

pub mod control;

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

/// A long-running background task driven by the scheduler manager
#[async_trait]
pub trait Worker: Send + Sync + 'static {
    /// Run until the token is cancelled
    async fn run(&self, token: CancellationToken);
}

#[derive(Default)]
struct ManagerState {
    running: bool,
    // Bumped on every start so a stale worker exit cannot clear the flag of
    // a newer run.
    generation: u64,
    token: Option<CancellationToken>,
}

/// Owns the worker's lifecycle and its cancellation token.
///
/// Start and stop are mutually exclusive behind the writer lock; status
/// reads take the reader lock. The child token is re-created on every start
/// so stop/start cycles are safe.
#[derive(Clone)]
pub struct SchedulerManager {
    worker: Arc<dyn Worker>,
    root: CancellationToken,
    state: Arc<RwLock<ManagerState>>,
}

impl SchedulerManager {
    /// `root` is the process-scoped token; cancelling it stops the worker
    /// the same way an explicit stop does.
    pub fn new(worker: Arc<dyn Worker>, root: CancellationToken) -> Self {
        Self {
            worker,
            root,
            state: Arc::new(RwLock::new(ManagerState::default())),
        }
    }

    /// Start the worker in a detached task. A no-op when already running.
    pub async fn start(&self) {
        let mut state = self.state.write().await;
        if state.running {
            tracing::info!("scheduler is already running");
            return;
        }

        tracing::info!("starting scheduler");
        let token = self.root.child_token();
        state.token = Some(token.clone());
        state.running = true;
        state.generation += 1;
        let generation = state.generation;

        let worker = self.worker.clone();
        let state_handle = self.state.clone();
        tokio::spawn(async move {
            worker.run(token).await;

            let mut state = state_handle.write().await;
            if state.generation == generation {
                state.running = false;
            }
            tracing::info!("scheduler worker exited");
        });
    }

    /// Cancel the worker's token. A no-op when not running; does not wait
    /// for the worker to finish its in-flight work.
    pub async fn stop(&self) {
        let mut state = self.state.write().await;
        if !state.running {
            tracing::info!("scheduler is not running");
            return;
        }

        tracing::info!("stopping scheduler");
        if let Some(token) = state.token.take() {
            token.cancel();
        }
        state.running = false;
    }

    /// Whether the worker is currently running
    pub async fn is_running(&self) -> bool {
        self.state.read().await.running
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    struct StubWorker {
        starts: AtomicUsize,
    }

    #[async_trait]
    impl Worker for StubWorker {
        async fn run(&self, token: CancellationToken) {
            self.starts.fetch_add(1, Ordering::SeqCst);
            token.cancelled().await;
        }
    }

    struct OneShotWorker;

    #[async_trait]
    impl Worker for OneShotWorker {
        async fn run(&self, _token: CancellationToken) {}
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    #[tokio::test]
    async fn start_and_stop_are_idempotent() {
        let worker = Arc::new(StubWorker {
            starts: AtomicUsize::new(0),
        });
        let manager = SchedulerManager::new(worker.clone(), CancellationToken::new());

        manager.start().await;
        manager.start().await;
        settle().await;
        assert!(manager.is_running().await);
        assert_eq!(worker.starts.load(Ordering::SeqCst), 1);

        manager.stop().await;
        manager.stop().await;
        settle().await;
        assert!(!manager.is_running().await);

        manager.start().await;
        settle().await;
        assert!(manager.is_running().await);
        assert_eq!(worker.starts.load(Ordering::SeqCst), 2);

        manager.stop().await;
        settle().await;
        assert!(!manager.is_running().await);
    }

    #[tokio::test]
    async fn worker_exit_clears_the_running_flag() {
        let manager = SchedulerManager::new(Arc::new(OneShotWorker), CancellationToken::new());

        manager.start().await;
        settle().await;
        assert!(!manager.is_running().await);
    }

    #[tokio::test]
    async fn stale_worker_exit_does_not_clear_a_restarted_scheduler() {
        let worker = Arc::new(StubWorker {
            starts: AtomicUsize::new(0),
        });
        let manager = SchedulerManager::new(worker, CancellationToken::new());

        manager.start().await;
        settle().await;
        manager.stop().await;
        manager.start().await;
        settle().await;

        // The first worker has exited by now; the second run must still
        // report running.
        assert!(manager.is_running().await);
        manager.stop().await;
    }

    #[tokio::test]
    async fn root_cancellation_stops_the_worker() {
        let root = CancellationToken::new();
        let worker = Arc::new(StubWorker {
            starts: AtomicUsize::new(0),
        });
        let manager = SchedulerManager::new(worker, root.clone());

        manager.start().await;
        settle().await;
        assert!(manager.is_running().await);

        root.cancel();
        settle().await;
        assert!(!manager.is_running().await);
    }
}
