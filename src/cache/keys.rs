//! Cache key management
//!
//! Centralized key definitions keep the keyspace consistent. Delivery
//! receipts live under `webhook:delivery:<message uuid>`; the TTL comes
//! from configuration, not from here.

/// Root prefix for webhook delivery receipts
const DELIVERY_PREFIX: &str = "webhook:delivery";

/// Key for a delivery receipt, addressed by our message uuid
#[inline]
pub fn delivery(message_id: &str) -> String {
    format!("{}:{}", DELIVERY_PREFIX, message_id)
}
