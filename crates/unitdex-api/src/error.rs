//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps schema and store errors to HTTP status codes and returns JSON error
//! bodies with an error code, message, and (for validation failures) the
//! full list of violated fields. Internal error details are never exposed.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use unitdex_core::{FieldViolation, ValidationErrors};
use utoipa::ToSchema;

use crate::state::StoreError;

/// Structured JSON error response body.
///
/// All error responses use this format for consistency across the API surface.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "VALIDATION_ERROR").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Every violated field, present only for validation errors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldViolation>>,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// The addressed record does not exist (404).
    #[error("{0}")]
    NotFound(String),

    /// Input failed schema validation (422).
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// A uniqueness rule was violated (400).
    #[error("{0}")]
    Conflict(String),

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Reject a request part that could not be parsed at all.
    pub fn unparseable(field: &str, message: impl Into<String>) -> Self {
        Self::Validation(ValidationErrors::single(FieldViolation::new(
            field, "parse", message,
        )))
    }

    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::Conflict(_) => (StatusCode::BAD_REQUEST, "CONFLICT"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        match &self {
            Self::Internal(_) => tracing::error!(error = %self, "internal server error"),
            Self::Validation(errs) => {
                tracing::debug!(violations = errs.violations().len(), "request rejected by validation")
            }
            _ => tracing::debug!(error = %self, "request rejected"),
        }

        let details = match self {
            Self::Validation(errs) => Some(errs.0),
            _ => None,
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

/// Convert store errors to API errors.
impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => Self::NotFound(err.to_string()),
            StoreError::Conflict(msg) => Self::Conflict(msg),
            StoreError::Invalid(errs) => Self::Validation(errs),
            // A v4 collision; nothing the client can fix.
            StoreError::DuplicateId { .. } => Self::Internal(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn status_codes() {
        let cases = [
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (
                AppError::unparseable("body", "bad json"),
                StatusCode::UNPROCESSABLE_ENTITY,
                "VALIDATION_ERROR",
            ),
            (AppError::Conflict("dup".into()), StatusCode::BAD_REQUEST, "CONFLICT"),
            (
                AppError::Internal("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
            ),
        ];
        for (err, status, code) in cases {
            assert_eq!(err.status_and_code(), (status, code), "{err:?}");
        }
    }

    #[test]
    fn store_errors_map_to_api_errors() {
        let id = Uuid::new_v4();
        assert!(matches!(
            AppError::from(StoreError::NotFound { kind: "Unit", id }),
            AppError::NotFound(ref m) if m == &format!("Unit {id} not found")
        ));
        assert!(matches!(
            AppError::from(StoreError::Conflict("taken".into())),
            AppError::Conflict(ref m) if m == "taken"
        ));
        assert!(matches!(
            AppError::from(StoreError::DuplicateId { kind: "Skill", id }),
            AppError::Internal(_)
        ));
        let invalid = ValidationErrors::single(FieldViolation::missing("name"));
        assert!(matches!(
            AppError::from(StoreError::Invalid(invalid)),
            AppError::Validation(_)
        ));
    }

    #[test]
    fn error_body_omits_empty_details() {
        let body = ErrorBody {
            error: ErrorDetail {
                code: "NOT_FOUND".to_string(),
                message: "gone".to_string(),
                details: None,
            },
        };
        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains("NOT_FOUND"));
        assert!(!json.contains("details"));
    }

    // ── into_response tests ──────────────────────────────────────

    use http_body_util::BodyExt;

    /// Helper to extract status and body from a Response.
    async fn response_parts(err: AppError) -> (StatusCode, ErrorBody) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        (status, body)
    }

    #[tokio::test]
    async fn into_response_validation_lists_every_field() {
        let errs = ValidationErrors(vec![
            FieldViolation::new("hit_points", "greater_than", "must be greater than 0"),
            FieldViolation::missing("race"),
        ]);
        let (status, body) = response_parts(AppError::Validation(errs)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body.error.code, "VALIDATION_ERROR");
        let details = body.error.details.expect("validation details");
        assert_eq!(details.len(), 2);
        assert_eq!(details[0].field, "hit_points");
        assert_eq!(details[1].rule, "missing");
    }

    #[tokio::test]
    async fn into_response_conflict_is_bad_request() {
        let msg = "protoss unit with name 'Zealot' already exists";
        let (status, body) = response_parts(AppError::Conflict(msg.into())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.error.code, "CONFLICT");
        assert_eq!(body.error.message, msg);
        assert!(body.error.details.is_none());
    }

    #[tokio::test]
    async fn into_response_internal_hides_details() {
        let (status, body) = response_parts(AppError::Internal("lock poisoned".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(
            !body.error.message.contains("lock"),
            "internal error details must not leak: {}",
            body.error.message
        );
        assert_eq!(body.error.message, "An internal error occurred");
    }
}
