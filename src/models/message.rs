//! Message entity and API models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// A user-submitted message awaiting webhook delivery.
///
/// There is no send flag here; the authoritative send state lives on the
/// outbox row created in the same transaction.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub content: String,
    pub phone_number: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Message {
    /// Materialize a new message with a fresh uuid and current timestamps
    pub fn new(content: &str, phone_number: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            content: content.to_string(),
            phone_number: phone_number.to_string(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Request body for POST /api/messages
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddMessageRequest {
    #[validate(length(min = 1, max = 20, message = "must be between 1 and 20 characters"))]
    pub content: String,
    #[validate(length(min = 1, message = "is required"))]
    pub recipient_phone_number: String,
}

/// Request body for POST /api/messages/process-message-sender
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SenderToggleRequest {
    pub is_message_sender_enabled: bool,
}

/// Response for GET /api/messages/scheduler-status
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerStatusResponse {
    pub is_running: bool,
}

/// Human-readable status line returned by control endpoints
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct StatusMessage {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_serializes_camel_case() {
        let message = Message::new("hi", "+15550001111");
        let json = serde_json::to_value(&message).unwrap();

        assert!(json.get("phoneNumber").is_some());
        assert!(json.get("createdAt").is_some());
        assert!(json.get("updatedAt").is_some());
        assert!(json.get("phone_number").is_none());
        assert!(json.get("sent").is_none());
    }

    #[test]
    fn new_messages_get_distinct_ids() {
        let a = Message::new("hi", "+1");
        let b = Message::new("hi", "+1");
        assert_ne!(a.id, b.id);
        assert!(Uuid::parse_str(&a.id).is_ok());
    }

    #[test]
    fn content_length_is_bounded() {
        let ok = AddMessageRequest {
            content: "x".repeat(20),
            recipient_phone_number: "+15550001111".to_string(),
        };
        assert!(ok.validate().is_ok());

        let too_long = AddMessageRequest {
            content: "x".repeat(21),
            recipient_phone_number: "+15550001111".to_string(),
        };
        assert!(too_long.validate().is_err());

        let empty = AddMessageRequest {
            content: String::new(),
            recipient_phone_number: "+15550001111".to_string(),
        };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn recipient_phone_number_is_required() {
        let request = AddMessageRequest {
            content: "hi".to_string(),
            recipient_phone_number: String::new(),
        };
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("recipient_phone_number"));
    }
}
