//! OpenAPI Documentation - Message Sender API

use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Message Sender API",
        version = "0.1.0",
        description = "Transactional outbox message delivery service - Rust + Axum"
    ),
    servers(
        (url = "http://localhost:8080", description = "Development")
    ),
    paths(
        crate::routes::messages::add_message,
        crate::routes::messages::list_messages,
        crate::routes::messages::process_message_sender,
        crate::routes::messages::scheduler_status,
        crate::routes::messages::webhook_delivery,
    ),
    components(
        schemas(
            crate::models::Message,
            crate::models::AddMessageRequest,
            crate::models::SenderToggleRequest,
            crate::models::SchedulerStatusResponse,
            crate::models::StatusMessage,
            crate::cache::DeliveryRecord,
        )
    ),
    tags(
        (name = "messages", description = "Message intake and delivery receipts"),
        (name = "scheduler", description = "Background sender control"),
    )
)]
pub struct ApiDoc;
