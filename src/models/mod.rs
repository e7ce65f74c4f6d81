//! Data models

pub mod message;
pub mod outbox;

pub use message::{
    AddMessageRequest, Message, SchedulerStatusResponse, SenderToggleRequest, StatusMessage,
};
pub use outbox::{MessagePayload, OutboxEntry};
