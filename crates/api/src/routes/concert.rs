//! Route definitions for the `/concert` resource.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::concert;
use crate::state::AppState;

/// Routes mounted at `/concert`.
///
/// ```text
/// POST   /createConcert          -> create
/// GET    /getConcerts            -> list
/// GET    /getConcert/{id}        -> get_by_id
/// DELETE /deleteConcert/{id}     -> delete
/// PUT    /updateConcert/{id}     -> update
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/createConcert", post(concert::create))
        .route("/getConcerts", get(concert::list))
        .route("/getConcert/{id}", get(concert::get_by_id))
        .route("/deleteConcert/{id}", delete(concert::delete))
        .route("/updateConcert/{id}", put(concert::update))
}
