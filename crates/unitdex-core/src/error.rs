//! # Validation Errors
//!
//! Structured validation failures built with `thiserror`. A single
//! [`ValidationErrors`] value carries every violated field and rule found
//! while checking a shape, so callers can fix all of them in one round trip.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// One violated constraint on one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FieldViolation {
    /// Name of the offending field as it appears on the wire.
    pub field: String,
    /// Machine-readable rule code (e.g., `"greater_than"`, `"missing"`).
    pub rule: String,
    /// Human-readable explanation.
    pub message: String,
}

impl FieldViolation {
    /// Build a violation for `field`.
    pub fn new(field: impl Into<String>, rule: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            rule: rule.into(),
            message: message.into(),
        }
    }

    /// A required field was not supplied.
    pub fn missing(field: impl Into<String>) -> Self {
        let field = field.into();
        let message = format!("{field} is required");
        Self::new(field, "missing", message)
    }
}

impl std::fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Every constraint violation found while validating one shape.
///
/// Never empty when returned as an error; [`crate::validate::Validator::finish`]
/// only produces it when at least one violation was recorded.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{} invalid field(s): {}", .0.len(), summarize(.0))]
pub struct ValidationErrors(pub Vec<FieldViolation>);

impl ValidationErrors {
    /// Wrap a single violation.
    pub fn single(violation: FieldViolation) -> Self {
        Self(vec![violation])
    }

    /// The recorded violations, in field declaration order.
    pub fn violations(&self) -> &[FieldViolation] {
        &self.0
    }

    /// Whether any violation concerns `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|v| v.field == field)
    }
}

fn summarize(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Failure to parse an exact decimal value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecimalError {
    /// The input is not a plain decimal literal.
    #[error("invalid decimal literal: \"{0}\"")]
    Malformed(String),

    /// The value does not fit the 64-bit mantissa.
    #[error("decimal out of range: \"{0}\"")]
    OutOfRange(String),

    /// NaN and infinities have no decimal representation.
    #[error("non-finite number is not a decimal")]
    NonFinite,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_lists_every_violation() {
        let err = ValidationErrors(vec![
            FieldViolation::new("hit_points", "greater_than", "must be greater than 0"),
            FieldViolation::missing("race"),
        ]);
        let msg = err.to_string();
        assert!(msg.starts_with("2 invalid field(s)"), "got: {msg}");
        assert!(msg.contains("hit_points: must be greater than 0"));
        assert!(msg.contains("race: race is required"));
    }

    #[test]
    fn has_field_matches_exact_name() {
        let err = ValidationErrors::single(FieldViolation::missing("name"));
        assert!(err.has_field("name"));
        assert!(!err.has_field("nam"));
    }

    #[test]
    fn violation_serializes_with_rule_code() {
        let v = FieldViolation::new("armor", "greater_or_equal", "must be at least 0");
        let json = serde_json::to_value(&v).unwrap();
        assert_eq!(json["field"], "armor");
        assert_eq!(json["rule"], "greater_or_equal");
    }

    #[test]
    fn decimal_error_messages() {
        assert!(DecimalError::Malformed("x".into()).to_string().contains("\"x\""));
        assert!(DecimalError::NonFinite.to_string().contains("non-finite"));
    }
}
