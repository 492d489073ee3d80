//! # Request Extraction
//!
//! Handlers take their inputs as `Result<Extractor<T>, Rejection>` so that
//! nothing axum rejects escapes the structured error body. Every rejection
//! becomes a 422 with a single [`FieldViolation`](unitdex_core::FieldViolation)
//! naming the part of the request that could not be read.
//!
//! Resource bodies are extracted as a bare [`JsonObject`] and converted field
//! by field in `unitdex-core`, so only JSON that does not parse as an object
//! at all is reported against `body`.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query};
use axum::Json;
use serde_json::{Map, Value};

use crate::error::AppError;

/// An undecoded JSON object body.
pub type JsonObject = Map<String, Value>;

/// Extract a JSON body, mapping deserialization errors to a `body` violation.
///
/// Handlers should use:
/// ```ignore
/// async fn handler(body: Result<Json<JsonObject>, JsonRejection>) -> Result<..., AppError> {
///     let fields = extract_json(body)?;
///     // convert fields...
/// }
/// ```
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| AppError::unparseable("body", err.body_text()))
}

/// Extract query-string filters.
pub fn extract_query<T>(result: Result<Query<T>, QueryRejection>) -> Result<T, AppError> {
    result
        .map(|Query(v)| v)
        .map_err(|err| AppError::unparseable("query", err.body_text()))
}

/// Extract a path parameter. Identifiers that are not UUIDs land here.
pub fn extract_path<T>(result: Result<Path<T>, PathRejection>) -> Result<T, AppError> {
    result
        .map(|Path(v)| v)
        .map_err(|err| AppError::unparseable("id", err.body_text()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use unitdex_core::{UnitPatch, ValidationErrors};

    #[test]
    fn passes_through_good_values() {
        let Value::Object(body) = json!({"armor": 1}) else {
            unreachable!()
        };
        let out = extract_json(Ok(Json(body.clone()))).unwrap();
        assert_eq!(out, body);
    }

    #[test]
    fn field_errors_become_validation_errors() {
        let Value::Object(body) = json!({"armor": -1, "hit_points": "lots"}) else {
            unreachable!()
        };
        let err: AppError = UnitPatch::from_json(body).unwrap_err().into();
        match err {
            AppError::Validation(ValidationErrors(v)) => assert_eq!(v.len(), 2),
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
