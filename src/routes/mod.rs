//! API routes

pub mod health;
pub mod messages;

use axum::Router;

use crate::AppState;

/// Build the API router with all routes
pub fn api_router() -> Router<AppState> {
    Router::new().nest("/messages", messages::router())
}
