//! Delivery receipt store over Redis

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::{
    models::OutboxEntry,
    services::{redis::RedisService, webhook::WebhookReceipt},
};

use super::keys;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("redis command failed: {0}")]
    Redis(#[from] redis::RedisError),
    #[error("failed to encode delivery record: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("stored delivery record is corrupt: {0}")]
    Corrupt(#[source] serde_json::Error),
}

/// Record of one acknowledged webhook delivery.
///
/// `message_id` is the downstream-assigned id from the acknowledgement;
/// `outbox_message_id` is our message uuid and the lookup key.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryRecord {
    pub message_id: String,
    pub outbox_message_id: String,
    pub delivered_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
}

/// Advisory receipt store. Failures here degrade observability only; they
/// never affect whether an entry is marked sent, and the store is not
/// consulted before sending.
#[derive(Clone)]
pub struct DeliveryCache {
    redis: RedisService,
    ttl: Duration,
}

impl DeliveryCache {
    pub fn new(redis: RedisService, ttl: Duration) -> Self {
        Self { redis, ttl }
    }

    /// Store the receipt for an entry, overwriting any prior value under the
    /// same key
    pub async fn record(
        &self,
        entry: &OutboxEntry,
        receipt: &WebhookReceipt,
    ) -> Result<(), CacheError> {
        let record = DeliveryRecord {
            message_id: receipt.message_id.clone(),
            outbox_message_id: entry.message_id.clone(),
            delivered_at: Utc::now(),
            response: Some(receipt.message.clone()).filter(|m| !m.is_empty()),
        };

        let data = serde_json::to_string(&record).map_err(CacheError::Encode)?;
        self.redis
            .set_ex(&keys::delivery(&entry.message_id), &data, self.ttl.as_secs())
            .await?;

        tracing::debug!(
            message_id = %entry.message_id,
            external_message_id = %record.message_id,
            ttl_secs = self.ttl.as_secs(),
            "delivery receipt recorded"
        );
        Ok(())
    }

    /// Look up the receipt for a message uuid. A miss is `None`, not an
    /// error.
    pub async fn lookup(&self, message_id: &str) -> Result<Option<DeliveryRecord>, CacheError> {
        let Some(data) = self.redis.get(&keys::delivery(message_id)).await? else {
            tracing::debug!(message_id = %message_id, "no delivery receipt in cache");
            return Ok(None);
        };

        let record = serde_json::from_str(&data).map_err(CacheError::Corrupt)?;
        Ok(Some(record))
    }
}
