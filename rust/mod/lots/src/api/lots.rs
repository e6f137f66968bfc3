use axum::{
    Router,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
    Json,
};

use labeler_core::ServiceError;

use crate::export::XLSX_CONTENT_TYPE;
use crate::model::{LotDetail, LotList};
use super::{AppState, parse_id, respond};

const BAD_LOT_ID: &str = "Identificador de lote inválido";
const LOT_NOT_FOUND: &str = "Lote no encontrado";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/lots", get(list_lots))
        .route("/lots/{id}", get(get_lot))
        .route("/lots/{id}/download", get(download_lot))
}

async fn list_lots(State(svc): State<AppState>) -> Result<Json<LotList>, ServiceError> {
    respond(svc.list_lots(), "Error al cargar los lotes")
}

async fn get_lot(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<LotDetail>, ServiceError> {
    let id = parse_id(&id, BAD_LOT_ID)?;
    respond(svc.lot_detail(id), "Error al cargar el lote").map_err(not_found_as_lot)
}

async fn download_lot(
    State(svc): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ServiceError> {
    let id = parse_id(&id, BAD_LOT_ID)?;
    let export = svc
        .export_lot(id)
        .map_err(|e| e.mask("Error al generar el archivo del lote"))
        .map_err(not_found_as_lot)?;

    let headers = [
        (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", export.filename),
        ),
        (header::CONTENT_LENGTH, export.bytes.len().to_string()),
    ];
    Ok((headers, export.bytes).into_response())
}

fn not_found_as_lot(e: ServiceError) -> ServiceError {
    match e {
        ServiceError::NotFound(_) => ServiceError::NotFound(LOT_NOT_FOUND.into()),
        other => other,
    }
}
