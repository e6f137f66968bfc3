use axum::{
    Router,
    extract::{Path, State, rejection::JsonRejection},
    routing::{get, post},
    Json,
};

use catalog::{CatalogPiece, PieceBatch};
use labeler_core::ServiceError;

use crate::model::{PieceEnvelope, SavedLot};
use crate::service::EMPTY_BATCH;
use super::{AppState, parse_id, respond};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/pieces", post(save_pieces))
        .route("/pieces/{id}", get(reprint_piece))
}

async fn save_pieces(
    State(svc): State<AppState>,
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<SavedLot>, ServiceError> {
    let pieces = parse_batch(body)?;
    respond(svc.save_pieces(pieces).await, "Error al guardar las piezas")
}

async fn reprint_piece(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PieceEnvelope>, ServiceError> {
    let id = parse_id(&id, "Identificador de pieza inválido")?;
    respond(svc.reprint_piece(id).await, "Error interno del servidor").map_err(|e| match e {
        ServiceError::NotFound(_) => ServiceError::NotFound("Pieza no encontrada".into()),
        other => other,
    })
}

/// Pull `pieces` out of the request body.
///
/// An absent, non-array or empty list is the empty-batch error; anything
/// else that fails to decode is reported with the decoder's message.
fn parse_batch(
    body: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Vec<CatalogPiece>, ServiceError> {
    let Json(body) = body.map_err(|e| {
        ServiceError::Validation(format!("Cuerpo de solicitud inválido: {}", e.body_text()))
    })?;

    match body.get("pieces").and_then(|v| v.as_array()) {
        Some(items) if !items.is_empty() => {}
        _ => return Err(ServiceError::Validation(EMPTY_BATCH.into())),
    }

    let batch: PieceBatch = serde_json::from_value(body)
        .map_err(|e| ServiceError::Validation(format!("Cuerpo de solicitud inválido: {e}")))?;
    Ok(batch.pieces)
}
