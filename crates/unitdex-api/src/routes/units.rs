//! # Units API
//!
//! CRUD over the unit store.
//!
//! ## Endpoints
//!
//! - `POST /units`: create a unit
//! - `GET /units`: list units, optionally filtered
//! - `GET /units/{id}`: get a unit
//! - `PATCH /units/{id}`: partially update a unit
//! - `DELETE /units/{id}`: delete a unit

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use unitdex_core::{Unit, UnitCreate, UnitFilter, UnitPatch};
use uuid::Uuid;

use crate::error::AppError;
use crate::extractors::{extract_json, extract_path, extract_query, JsonObject};
use crate::routes::DeleteResponse;
use crate::state::AppState;

// ── Router ──────────────────────────────────────────────────────────

/// Build the units router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/units", get(list_units).post(create_unit))
        .route(
            "/units/{id}",
            get(get_unit).patch(update_unit).delete(delete_unit),
        )
}

// ── Handlers ────────────────────────────────────────────────────────

/// POST /units: Create a new unit.
///
/// The body is converted field by field so that every bad field is reported
/// in one response.
#[utoipa::path(
    post,
    path = "/units",
    request_body = UnitCreate,
    responses(
        (status = 201, description = "Unit created", body = Unit),
        (status = 400, description = "A unit with this name already exists for the race", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "units"
)]
pub async fn create_unit(
    State(state): State<AppState>,
    body: Result<Json<JsonObject>, JsonRejection>,
) -> Result<(StatusCode, Json<Unit>), AppError> {
    let attrs = UnitCreate::from_json(extract_json(body)?)?;
    let unit = state
        .units
        .insert(Unit::new(Uuid::new_v4(), attrs, Utc::now()))?;

    tracing::info!(id = %unit.id, name = %unit.name, race = %unit.race, "unit created");
    Ok((StatusCode::CREATED, Json(unit)))
}

/// GET /units: List units matching every supplied filter, oldest first.
#[utoipa::path(
    get,
    path = "/units",
    params(UnitFilter),
    responses(
        (status = 200, description = "List of units", body = Vec<Unit>),
        (status = 422, description = "Unparseable filter", body = crate::error::ErrorBody),
    ),
    tag = "units"
)]
pub async fn list_units(
    State(state): State<AppState>,
    query: Result<Query<UnitFilter>, QueryRejection>,
) -> Result<Json<Vec<Unit>>, AppError> {
    let filter = extract_query(query)?;
    Ok(Json(state.units.list(|u| filter.matches(u))))
}

/// GET /units/{id}: Get a single unit.
#[utoipa::path(
    get,
    path = "/units/{id}",
    params(("id" = Uuid, Path, description = "Unit ID")),
    responses(
        (status = 200, description = "Unit found", body = Unit),
        (status = 404, description = "Unit not found", body = crate::error::ErrorBody),
        (status = 422, description = "Malformed unit ID", body = crate::error::ErrorBody),
    ),
    tag = "units"
)]
pub async fn get_unit(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Unit>, AppError> {
    let id = extract_path(id)?;
    Ok(Json(state.units.get(&id)?))
}

/// PATCH /units/{id}: Change only the supplied fields of a unit.
#[utoipa::path(
    patch,
    path = "/units/{id}",
    params(("id" = Uuid, Path, description = "Unit ID")),
    request_body = UnitPatch,
    responses(
        (status = 200, description = "Unit updated", body = Unit),
        (status = 400, description = "Update would duplicate another unit", body = crate::error::ErrorBody),
        (status = 404, description = "Unit not found", body = crate::error::ErrorBody),
        (status = 422, description = "Validation error", body = crate::error::ErrorBody),
    ),
    tag = "units"
)]
pub async fn update_unit(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
    body: Result<Json<JsonObject>, JsonRejection>,
) -> Result<Json<Unit>, AppError> {
    let id = extract_path(id)?;
    let patch = UnitPatch::from_json(extract_json(body)?)?;
    let unit = state
        .units
        .update(&id, |current| current.patched(patch, Utc::now()))?;

    tracing::info!(id = %unit.id, "unit updated");
    Ok(Json(unit))
}

/// DELETE /units/{id}: Delete a unit.
#[utoipa::path(
    delete,
    path = "/units/{id}",
    params(("id" = Uuid, Path, description = "Unit ID")),
    responses(
        (status = 200, description = "Unit deleted", body = DeleteResponse),
        (status = 404, description = "Unit not found", body = crate::error::ErrorBody),
        (status = 422, description = "Malformed unit ID", body = crate::error::ErrorBody),
    ),
    tag = "units"
)]
pub async fn delete_unit(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<DeleteResponse>, AppError> {
    let id = extract_path(id)?;
    let removed = state.units.delete(&id)?;

    tracing::info!(id = %removed.id, name = %removed.name, "unit deleted");
    Ok(Json(DeleteResponse::new("Unit deleted successfully")))
}
