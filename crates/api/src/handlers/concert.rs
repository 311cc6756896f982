//! Handlers for the `/concert` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use concert_core::concert::ENTITY;
use concert_core::error::CoreError;
use concert_core::types::DbId;
use concert_db::models::concert::Concert;

use crate::error::{AppError, AppResult};
use crate::extract::ConcertForm;
use crate::state::AppState;

/// An id that is not a UUID cannot name a stored concert.
fn parse_id(raw: &str) -> AppResult<DbId> {
    DbId::parse_str(raw).map_err(|_| AppError::Core(CoreError::not_found(ENTITY, raw)))
}

/// POST /v1/concert/createConcert
pub async fn create(
    State(state): State<AppState>,
    form: ConcertForm,
) -> AppResult<(StatusCode, Json<Concert>)> {
    let input = form.into_create()?;
    let concert = state.concerts.create(input).await?;
    Ok((StatusCode::CREATED, Json(concert)))
}

/// GET /v1/concert/getConcerts
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<Concert>>> {
    let concerts = state.concerts.list().await?;
    Ok(Json(concerts))
}

/// GET /v1/concert/getConcert/{id}
///
/// Soft-deleted concerts are still returned, with `deletedAt` set.
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Concert>> {
    let concert = state.concerts.get_by_id(parse_id(&id)?).await?;
    Ok(Json(concert))
}

/// DELETE /v1/concert/deleteConcert/{id}
///
/// Responds 200 with the soft-deleted concert.
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Concert>> {
    let concert = state.concerts.delete_by_id(parse_id(&id)?).await?;
    Ok(Json(concert))
}

/// PUT /v1/concert/updateConcert/{id}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    form: ConcertForm,
) -> AppResult<Json<Concert>> {
    let id = parse_id(&id)?;
    let input = form.into_update()?;
    let concert = state.concerts.update_by_id(id, input).await?;
    Ok(Json(concert))
}
