//! Message intake and sender control routes

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use validator::Validate;

use crate::{
    cache::DeliveryRecord,
    models::{
        AddMessageRequest, Message, SchedulerStatusResponse, SenderToggleRequest, StatusMessage,
    },
    utils::errors::{self, ApiError},
    AppState,
};

/// Create a message and queue it for webhook delivery
#[utoipa::path(
    post,
    path = "/api/messages",
    request_body = AddMessageRequest,
    responses(
        (status = 201, description = "Message stored and queued for delivery", body = Message),
        (status = 400, description = "Validation failure"),
        (status = 500, description = "Storage failure")
    ),
    tag = "messages"
)]
pub async fn add_message(
    State(state): State<AppState>,
    Json(request): Json<AddMessageRequest>,
) -> Result<(StatusCode, Json<Message>), ApiError> {
    if let Err(e) = request.validate() {
        return Err(errors::validation_failure(&e));
    }

    let message = state
        .store
        .create_message(&request.content, &request.recipient_phone_number)
        .await?;

    Ok((StatusCode::CREATED, Json(message)))
}

/// List all stored messages
#[utoipa::path(
    get,
    path = "/api/messages",
    responses((status = 200, description = "All stored messages", body = [Message])),
    tag = "messages"
)]
pub async fn list_messages(State(state): State<AppState>) -> Result<Json<Vec<Message>>, ApiError> {
    let messages = state.store.list_messages().await?;
    Ok(Json(messages))
}

/// Enable or disable the background message sender
#[utoipa::path(
    post,
    path = "/api/messages/process-message-sender",
    request_body = SenderToggleRequest,
    responses((status = 200, description = "Sender state applied", body = StatusMessage)),
    tag = "scheduler"
)]
pub async fn process_message_sender(
    State(state): State<AppState>,
    Json(request): Json<SenderToggleRequest>,
) -> Json<StatusMessage> {
    let status = state
        .control
        .set_enabled(request.is_message_sender_enabled)
        .await;

    Json(StatusMessage {
        message: status.to_string(),
    })
}

/// Report whether the background sender is running
#[utoipa::path(
    get,
    path = "/api/messages/scheduler-status",
    responses((status = 200, description = "Current sender state", body = SchedulerStatusResponse)),
    tag = "scheduler"
)]
pub async fn scheduler_status(State(state): State<AppState>) -> Json<SchedulerStatusResponse> {
    Json(SchedulerStatusResponse {
        is_running: state.control.status().await,
    })
}

/// Fetch the delivery receipt for a message.
///
/// The path parameter is the uuid returned by POST /api/messages; the
/// stored record additionally carries the downstream-assigned `messageId`.
#[utoipa::path(
    get,
    path = "/api/messages/webhook-delivery/{message_id}",
    params(("message_id" = String, Path, description = "Message uuid assigned at intake")),
    responses(
        (status = 200, description = "Delivery receipt", body = DeliveryRecord),
        (status = 404, description = "No receipt recorded for this message")
    ),
    tag = "messages"
)]
pub async fn webhook_delivery(
    State(state): State<AppState>,
    Path(message_id): Path<String>,
) -> Result<Json<DeliveryRecord>, ApiError> {
    let record = state
        .deliveries
        .lookup(&message_id)
        .await
        .map_err(|e| errors::internal_error(e.to_string()))?
        .ok_or_else(|| errors::not_found("Delivery record"))?;

    Ok(Json(record))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_messages).post(add_message))
        .route("/process-message-sender", post(process_message_sender))
        .route("/scheduler-status", get(scheduler_status))
        .route("/webhook-delivery/:message_id", get(webhook_delivery))
}
