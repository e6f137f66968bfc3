use axum::{
    Router,
    extract::{Query, State},
    routing::get,
    Json,
};
use serde::Deserialize;

use labeler_core::ServiceError;
use crate::model::CatalogPiece;
use super::{AppState, respond};

pub fn routes() -> Router<AppState> {
    Router::new().route("/cladd/pieza", get(get_piece))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PieceQuery {
    nro_serie: Option<String>,
}

async fn get_piece(
    State(svc): State<AppState>,
    Query(q): Query<PieceQuery>,
) -> Result<Json<CatalogPiece>, ServiceError> {
    respond(
        svc.cladd_piece(q.nro_serie.as_deref()).await,
        "Internal server error",
    )
}
