pub mod concert;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the `/v1` route tree.
///
/// ```text
/// /concert/createConcert                 create (POST)
/// /concert/getConcerts                   list (GET)
/// /concert/getConcert/{id}               get (GET)
/// /concert/deleteConcert/{id}            soft delete (DELETE)
/// /concert/updateConcert/{id}            partial update (PUT)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/concert", concert::router())
}
