//! Outbox dispatch worker

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{interval_at, timeout, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::{
    cache::DeliveryCache,
    config::SchedulerConfig,
    models::OutboxEntry,
    scheduler::Worker,
    services::webhook::{WebhookError, WebhookSender},
};

use super::OutboxQueue;

/// Hard upper bound for a single webhook call, independent of the tick
/// deadline; the effective budget is the smaller of the two.
const SEND_CALL_TIMEOUT: Duration = Duration::from_secs(30);

/// Periodic batch processor draining the outbox queue to the webhook
pub struct OutboxWorker {
    config: SchedulerConfig,
    queue: OutboxQueue,
    webhook: WebhookSender,
    deliveries: DeliveryCache,
}

impl OutboxWorker {
    pub fn new(
        config: SchedulerConfig,
        queue: OutboxQueue,
        webhook: WebhookSender,
        deliveries: DeliveryCache,
    ) -> Self {
        Self {
            config,
            queue,
            webhook,
            deliveries,
        }
    }

    /// One scheduler tick: fetch a batch and deliver it under the tick
    /// deadline. Storage errors are logged; the next tick retries.
    pub async fn process_tick(&self, token: &CancellationToken) {
        let deadline = Instant::now() + self.config.send_timeout;

        let result = self
            .queue
            .process_unsent(self.config.batch_size, token, deadline, |entry| {
                self.deliver(entry, deadline)
            })
            .await;

        match result {
            Ok(count) if count > 0 => {
                tracing::info!(processed = count, "outbox entries delivered");
            }
            Ok(_) => {}
            Err(e) => {
                tracing::error!(error = %e, "failed to process outbox entries");
            }
        }
    }

    /// Deliver one entry: webhook call under the per-call budget, then an
    /// advisory receipt write. A cache failure never fails the delivery.
    async fn deliver(&self, entry: OutboxEntry, deadline: Instant) -> Result<(), WebhookError> {
        let budget = deadline
            .saturating_duration_since(Instant::now())
            .min(SEND_CALL_TIMEOUT);

        let receipt = timeout(budget, self.webhook.send(&entry))
            .await
            .map_err(|_| WebhookError::TimedOut)??;

        if let Err(e) = self.deliveries.record(&entry, &receipt).await {
            tracing::warn!(
                outbox_id = entry.id,
                message_id = %entry.message_id,
                error = %e,
                "failed to record delivery receipt; continuing"
            );
        }

        Ok(())
    }
}

#[async_trait]
impl Worker for OutboxWorker {
    async fn run(&self, token: CancellationToken) {
        tracing::info!(
            interval_secs = self.config.interval.as_secs(),
            batch_size = self.config.batch_size,
            "outbox worker started"
        );

        // Drain any backlog present at startup, then settle into the ticker.
        self.process_tick(&token).await;

        let mut ticker = interval_at(Instant::now() + self.config.interval, self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    tracing::info!("outbox worker stopping");
                    return;
                }
                _ = ticker.tick() => {
                    self.process_tick(&token).await;
                }
            }
        }
    }
}
