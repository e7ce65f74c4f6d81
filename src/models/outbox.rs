//! Outbox entry model for the transactional outbox queue

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A queued delivery job drained by the outbox worker.
///
/// `sent` only ever moves false -> true; marking an already-sent row again
/// is harmless.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OutboxEntry {
    pub id: i64,
    pub message_id: String,
    pub payload: serde_json::Value,
    pub sent: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload snapshot taken at enqueue time. This is the source of truth for
/// dispatch content; the message row may change without affecting in-flight
/// deliveries. Field names are part of the wire contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePayload {
    pub id: String,
    pub content: String,
    pub phone_number: String,
}
