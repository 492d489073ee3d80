//! # API Route Modules
//!
//! - `units`: CRUD for Unit records, unique on `(name, race)`.
//! - `skills`: CRUD for Skill records, unique on `name`.

pub mod skills;
pub mod units;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Confirmation returned by the delete endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DeleteResponse {
    /// Human-readable confirmation.
    #[schema(example = "Unit deleted successfully")]
    pub message: String,
}

impl DeleteResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
