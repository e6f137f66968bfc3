mod lots;
mod pieces;

use std::sync::Arc;

use axum::{Json, Router};
use serde::Serialize;

use labeler_core::ServiceError;

use crate::service::LotService;

/// Shared application state.
pub type AppState = Arc<LotService>;

/// Build the lots router.
///
/// Routes:
/// - `POST /api/pieces`                save a working list as a lot
/// - `GET  /api/pieces/{id}`           reprint a piece label
/// - `GET  /api/lots`                  list lots
/// - `GET  /api/lots/{id}`             lot detail
/// - `GET  /api/lots/{id}/download`    xlsx export
pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(pieces::routes())
        .merge(lots::routes())
}

pub(crate) fn respond<T: Serialize>(
    result: Result<T, ServiceError>,
    public_message: &str,
) -> Result<Json<T>, ServiceError> {
    result.map(Json).map_err(|e| e.mask(public_message))
}

/// Parse a numeric path id, rejecting anything else with `message`.
pub(crate) fn parse_id(raw: &str, message: &str) -> Result<i64, ServiceError> {
    raw.parse::<i64>()
        .map_err(|_| ServiceError::Validation(message.to_string()))
}
