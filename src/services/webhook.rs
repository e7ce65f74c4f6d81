//! Webhook delivery client

use chrono::SecondsFormat;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    config::WebhookConfig,
    models::{MessagePayload, OutboxEntry},
};

/// Failure classes for a single delivery attempt. Every class leaves the
/// entry unsent, so the next tick retries it.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("outbox payload could not be decoded: {0}")]
    PayloadCorrupt(#[source] serde_json::Error),
    #[error("webhook endpoint unreachable: {0}")]
    Unreachable(#[source] reqwest::Error),
    #[error("webhook rejected the message with status {0}")]
    Rejected(u16),
    #[error("webhook response could not be decoded: {0}")]
    InvalidResponse(#[source] reqwest::Error),
    #[error("webhook call exceeded its time budget")]
    TimedOut,
}

/// Acknowledgement returned by the downstream webhook
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookReceipt {
    pub message_id: String,
    pub message: String,
}

/// Outbound wire format; `timestamp` is the outbox entry's creation time
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct OutboundMessage<'a> {
    id: &'a str,
    content: &'a str,
    phone_number: &'a str,
    timestamp: String,
}

/// HTTP client for the downstream webhook. One long-lived reqwest client
/// carries the configured per-request timeout and its own connection pool.
#[derive(Clone)]
pub struct WebhookSender {
    url: String,
    http: Client,
}

impl WebhookSender {
    pub fn new(config: &WebhookConfig) -> anyhow::Result<Self> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            url: config.url.clone(),
            http,
        })
    }

    /// POST one outbox entry to the webhook and parse the acknowledgement
    pub async fn send(&self, entry: &OutboxEntry) -> Result<WebhookReceipt, WebhookError> {
        let payload: MessagePayload =
            serde_json::from_value(entry.payload.clone()).map_err(WebhookError::PayloadCorrupt)?;

        let body = OutboundMessage {
            id: &payload.id,
            content: &payload.content,
            phone_number: &payload.phone_number,
            timestamp: entry.created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        };

        let response = self
            .http
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(WebhookError::Unreachable)?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(
                outbox_id = entry.id,
                status = status.as_u16(),
                "webhook rejected message"
            );
            return Err(WebhookError::Rejected(status.as_u16()));
        }

        let receipt: WebhookReceipt = response
            .json()
            .await
            .map_err(WebhookError::InvalidResponse)?;

        tracing::info!(
            outbox_id = entry.id,
            message_id = %payload.id,
            external_message_id = %receipt.message_id,
            "webhook delivery acknowledged"
        );

        Ok(receipt)
    }
}
