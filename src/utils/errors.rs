//! Standardized error response utilities
//!
//! Unified JSON error format for all routes, with field-level validation
//! details where they exist.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::collections::HashMap;

/// Standardized API error response
#[derive(Debug, Serialize)]
pub struct ApiError {
    /// Human-readable error message
    pub message: String,

    /// HTTP status code as string (e.g., "404", "500")
    pub status: String,

    /// Error code for client-side handling (e.g., "VALIDATION_ERROR")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Field-level validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<HashMap<String, Vec<String>>>,

    /// Timestamp of the error
    pub timestamp: String,
}

impl ApiError {
    /// Create a new API error
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: status.as_u16().to_string(),
            code: None,
            errors: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Add an error code
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Add a single field error
    pub fn with_field_error(mut self, field: impl Into<String>, error: impl Into<String>) -> Self {
        let mut errors = self.errors.unwrap_or_default();
        errors.entry(field.into()).or_default().push(error.into());
        self.errors = Some(errors);
        self
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status.parse().unwrap_or(500))
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// 400 Bad Request
pub fn bad_request(message: impl Into<String>) -> ApiError {
    ApiError::new(StatusCode::BAD_REQUEST, message).with_code("BAD_REQUEST")
}

/// 404 Not Found
pub fn not_found(resource: impl Into<String>) -> ApiError {
    ApiError::new(
        StatusCode::NOT_FOUND,
        format!("{} not found", resource.into()),
    )
    .with_code("NOT_FOUND")
}

/// 500 Internal Server Error
pub fn internal_error(message: impl Into<String>) -> ApiError {
    let msg = message.into();
    let safe_message = if std::env::var("ENVIRONMENT").unwrap_or_default() == "production" {
        "An internal error occurred. Please try again later.".to_string()
    } else {
        msg.clone()
    };

    // Always log the full error
    tracing::error!("Internal error: {}", msg);

    ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, safe_message).with_code("INTERNAL_ERROR")
}

/// 400 carrying the first failing field's diagnostic
pub fn validation_failure(errors: &validator::ValidationErrors) -> ApiError {
    let mut error = bad_request("Validation failed").with_code("VALIDATION_ERROR");

    if let Some((field, field_errors)) = errors.field_errors().iter().next() {
        if let Some(first) = field_errors.first() {
            let detail = first
                .message
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| format!("failed on the {} rule", first.code));
            error.message = format!("{} {}", field, detail);
            error = error.with_field_error(field.to_string(), detail);
        }
    }

    error
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {:?}", err);

        match &err {
            sqlx::Error::RowNotFound => not_found("Resource"),
            _ => internal_error("Database error"),
        }
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        tracing::error!("Error: {:?}", err);
        internal_error(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use validator::Validate;

    use super::*;

    #[derive(Validate)]
    struct Probe {
        #[validate(length(max = 3, message = "must be at most 3 characters"))]
        name: String,
    }

    #[test]
    fn row_not_found_maps_to_404() {
        let error: ApiError = sqlx::Error::RowNotFound.into();
        assert_eq!(error.status, "404");
    }

    #[test]
    fn validation_failure_carries_the_field_diagnostic() {
        let probe = Probe {
            name: "toolong".to_string(),
        };
        let error = validation_failure(&probe.validate().unwrap_err());

        assert_eq!(error.status, "400");
        assert_eq!(error.code.as_deref(), Some("VALIDATION_ERROR"));
        assert!(error.message.contains("name"));
        assert!(error.errors.unwrap().contains_key("name"));
    }
}
