use std::sync::Arc;

use concert_service::ConcertService;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Concert lifecycle service (owns the store and publisher handles).
    pub concerts: Arc<ConcertService>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}
