//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI 3.1 document,
//! served at `/openapi.json`. Field bounds in the component schemas come from
//! the same rule declarations the validator enforces.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI document for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "unitdex API",
        version = "0.1.0",
        description = "CRUD service for StarCraft unit and skill records.",
        license(name = "AGPL-3.0-or-later")
    ),
    paths(
        // Units
        crate::routes::units::create_unit,
        crate::routes::units::list_units,
        crate::routes::units::get_unit,
        crate::routes::units::update_unit,
        crate::routes::units::delete_unit,
        // Skills
        crate::routes::skills::create_skill,
        crate::routes::skills::list_skills,
        crate::routes::skills::get_skill,
        crate::routes::skills::update_skill,
        crate::routes::skills::delete_skill,
    ),
    components(schemas(
        // Unit shapes
        unitdex_core::Unit,
        unitdex_core::UnitCreate,
        unitdex_core::UnitPatch,
        unitdex_core::Race,
        unitdex_core::UnitType,
        // Skill shapes
        unitdex_core::Skill,
        unitdex_core::SkillCreate,
        unitdex_core::SkillPatch,
        unitdex_core::SkillCategory,
        unitdex_core::TargetType,
        // Responses
        crate::routes::DeleteResponse,
        crate::error::ErrorBody,
        crate::error::ErrorDetail,
        unitdex_core::FieldViolation,
    )),
    tags(
        (name = "units", description = "StarCraft units"),
        (name = "skills", description = "StarCraft skills and abilities"),
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI router.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json: Return the generated OpenAPI specification.
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
