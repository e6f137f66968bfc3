use axum::{
    Router,
    extract::{Query, State},
    routing::get,
    Json,
};
use serde::Deserialize;

use labeler_core::ServiceError;
use crate::model::{CatalogPiece, ImportadoSnapshot, ReloadSummary};
use super::{AppState, respond};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/importado/all", get(load_all))
        .route("/importado/pieza", get(get_piece).post(reload))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PieceQuery {
    codigo_completo: Option<String>,
}

async fn load_all(
    State(svc): State<AppState>,
) -> Result<Json<ImportadoSnapshot>, ServiceError> {
    respond(
        svc.importado_all().await,
        "Error de conexión a la base de datos",
    )
}

async fn get_piece(
    State(svc): State<AppState>,
    Query(q): Query<PieceQuery>,
) -> Result<Json<CatalogPiece>, ServiceError> {
    respond(
        svc.importado_piece(q.codigo_completo.as_deref()).await,
        "Error loading IMPORTADO data",
    )
}

async fn reload(
    State(svc): State<AppState>,
) -> Result<Json<ReloadSummary>, ServiceError> {
    respond(svc.importado_reload().await, "Error reloading data")
}
