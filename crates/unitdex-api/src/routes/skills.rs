//! # Skills API
//!
//! CRUD over the skill store. Mirrors the units API; skill names are unique
//! across every category.
//!
//! ## Endpoints
//!
//! - `POST /skills`: create a skill
//! - `GET /skills`: list skills, optionally filtered
//! - `GET /skills/{id}`: get a skill
//! - `PATCH /skills/{id}`: partially update a skill
//! - `DELETE /skills/{id}`: delete a skill

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use unitdex_core::{Skill, SkillCreate, SkillFilter, SkillPatch};
use uuid::Uuid;

use crate::error::AppError;
use crate::extractors::{extract_json, extract_path, extract_query, JsonObject};
use crate::routes::DeleteResponse;
use crate::state::AppState;

// ── Router ──────────────────────────────────────────────────────────

/// Build the skills router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/skills", get(list_skills).post(create_skill))
        .route(
            "/skills/{id}",
            get(get_skill).patch(update_skill).delete(delete_skill),
        )
}

// ── Handlers ────────────────────────────────────────────────────────

/// POST /skills: Create a new skill.
#[utoipa::path(
    post,
    path = "/skills",
    request_body = SkillCreate,
    responses(
        (status = 201, description = "Skill created", body = Skill),
        (status = 400, description = "A skill with this name already exists", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "skills"
)]
pub async fn create_skill(
    State(state): State<AppState>,
    body: Result<Json<JsonObject>, JsonRejection>,
) -> Result<(StatusCode, Json<Skill>), AppError> {
    let attrs = SkillCreate::from_json(extract_json(body)?)?;
    let skill = state
        .skills
        .insert(Skill::new(Uuid::new_v4(), attrs, Utc::now()))?;

    tracing::info!(id = %skill.id, name = %skill.name, category = %skill.category, "skill created");
    Ok((StatusCode::CREATED, Json(skill)))
}

/// GET /skills: List skills matching every supplied filter, oldest first.
#[utoipa::path(
    get,
    path = "/skills",
    params(SkillFilter),
    responses(
        (status = 200, description = "List of skills", body = Vec<Skill>),
        (status = 422, description = "Unparseable filter", body = crate::error::ErrorBody),
    ),
    tag = "skills"
)]
pub async fn list_skills(
    State(state): State<AppState>,
    query: Result<Query<SkillFilter>, QueryRejection>,
) -> Result<Json<Vec<Skill>>, AppError> {
    let filter = extract_query(query)?;
    Ok(Json(state.skills.list(|s| filter.matches(s))))
}

/// GET /skills/{id}: Get a single skill.
#[utoipa::path(
    get,
    path = "/skills/{id}",
    params(("id" = Uuid, Path, description = "Skill ID")),
    responses(
        (status = 200, description = "Skill found", body = Skill),
        (status = 404, description = "Skill not found", body = crate::error::ErrorBody),
        (status = 422, description = "Malformed skill ID", body = crate::error::ErrorBody),
    ),
    tag = "skills"
)]
pub async fn get_skill(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Skill>, AppError> {
    let id = extract_path(id)?;
    Ok(Json(state.skills.get(&id)?))
}

/// PATCH /skills/{id}: Change only the supplied fields of a skill.
#[utoipa::path(
    patch,
    path = "/skills/{id}",
    params(("id" = Uuid, Path, description = "Skill ID")),
    request_body = SkillPatch,
    responses(
        (status = 200, description = "Skill updated", body = Skill),
        (status = 400, description = "Update would duplicate another skill", body = crate::error::ErrorBody),
        (status = 404, description = "Skill not found", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "skills"
)]
pub async fn update_skill(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<JsonObject>, JsonRejection>,
) -> Result<Json<Skill>, AppError> {
    let id = extract_path(id)?;
    let patch = SkillPatch::from_json(extract_json(body)?)?;
    let skill = state
        .skills
        .update(&id, |current| current.patched(patch, Utc::now()))?;

    tracing::info!(id = %skill.id, "skill updated");
    Ok(Json(skill))
}

/// DELETE /skills/{id}: Delete a skill.
#[utoipa::path(
    delete,
    path = "/skills/{id}",
    params(("id" = Uuid, Path, description = "Skill ID")),
    responses(
        (status = 200, description = "Skill deleted", body = DeleteResponse),
        (status = 404, description = "Skill not found", body = crate::error::ErrorBody),
        (status = 422, description = "Malformed skill ID", body = crate::error::ErrorBody),
    ),
    tag = "skills"
)]
pub async fn delete_skill(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<DeleteResponse>, AppError> {
    let id = extract_path(id)?;
    let removed = state.skills.delete(&id)?;

    tracing::info!(id = %removed.id, name = %removed.name, "skill deleted");
    Ok(Json(DeleteResponse::new("Skill deleted successfully")))
}
