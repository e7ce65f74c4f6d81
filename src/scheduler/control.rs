//! Runtime enable/disable control for the message sender

use super::SchedulerManager;

/// Facade between the HTTP layer and the scheduler manager, so handlers
/// never hold the cancellation token directly
#[derive(Clone)]
pub struct SenderControl {
    manager: SchedulerManager,
}

impl SenderControl {
    pub fn new(manager: SchedulerManager) -> Self {
        Self { manager }
    }

    /// Apply the desired sender state; returns a human-readable status line
    pub async fn set_enabled(&self, enabled: bool) -> &'static str {
        if enabled {
            tracing::info!("enabling message sender");
            self.manager.start().await;
            "message sender enabled"
        } else {
            tracing::info!("disabling message sender");
            self.manager.stop().await;
            "message sender disabled"
        }
    }

    /// Whether the sender is currently running
    pub async fn status(&self) -> bool {
        self.manager.is_running().await
    }
}
