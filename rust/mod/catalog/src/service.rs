use std::sync::Arc;

use labeler_core::{now_rfc3339, ServiceError};
use tracing::debug;

use crate::cladd::{self, CladdClient};
use crate::error::CatalogError;
use crate::importado::{self, ImportadoSource, ScannedCode};
use crate::model::{CatalogPiece, ImportadoSnapshot, ReloadSummary};

/// Catalog lookups against CLADD and IMPORTADO.
pub struct CatalogService {
    cladd: CladdClient,
    importado: Arc<dyn ImportadoSource>,
}

impl CatalogService {
    pub fn new(cladd: CladdClient, importado: Arc<dyn ImportadoSource>) -> Self {
        Self { cladd, importado }
    }

    /// Look a serial number up in CLADD.
    pub async fn cladd_piece(&self, nro_serie: Option<&str>) -> Result<CatalogPiece, ServiceError> {
        let nro_serie = required(nro_serie, "nroSerie parameter is required")?;

        let data = self.cladd.fetch_by_serial(nro_serie).await.map_err(|e| match e {
            CatalogError::Status { status, body } => {
                debug!(status, body = %body, "CLADD lookup rejected");
                ServiceError::Upstream {
                    status,
                    message: "Failed to fetch from CLADD API".into(),
                }
            }
            other => ServiceError::Internal(format!("CLADD lookup: {other}")),
        })?;

        cladd::to_catalog_piece(data).map_err(|e| ServiceError::Internal(e.to_string()))
    }

    /// Load the full IMPORTADO result set.
    pub async fn importado_all(&self) -> Result<ImportadoSnapshot, ServiceError> {
        let data = self
            .importado
            .load_all()
            .await
            .map_err(|e| ServiceError::Internal(format!("IMPORTADO load: {e}")))?;

        Ok(ImportadoSnapshot {
            count: data.len(),
            data,
            loaded_at: now_rfc3339(),
        })
    }

    /// Look a scanned code up in IMPORTADO.
    ///
    /// Reloads the whole catalog and scans it; nothing is cached.
    pub async fn importado_piece(&self, code: Option<&str>) -> Result<CatalogPiece, ServiceError> {
        let code = required(code, "codigoCompleto parameter is required")?;
        let code = ScannedCode::parse(code);

        let records = self
            .importado
            .load_all()
            .await
            .map_err(|e| ServiceError::Internal(format!("IMPORTADO load: {e}")))?;

        debug!(
            "Searching for numeroPieza: \"{}\" in {} pieces",
            code.piece_number,
            records.len()
        );

        let record = importado::find_record(&records, &code.piece_number)
            .ok_or_else(|| ServiceError::NotFound("Pieza no encontrada en IMPORTADO".into()))?;

        importado::to_catalog_piece(record, &code).map_err(|e| ServiceError::Internal(e.to_string()))
    }

    /// Re-run the IMPORTADO query and report how many rows came back.
    pub async fn importado_reload(&self) -> Result<ReloadSummary, ServiceError> {
        let snapshot = self.importado_all().await?;
        Ok(ReloadSummary {
            success: true,
            message: format!("Data reloaded. {} pieces loaded.", snapshot.count),
            loaded_at: snapshot.loaded_at,
        })
    }
}

fn required<'a>(value: Option<&'a str>, message: &str) -> Result<&'a str, ServiceError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ServiceError::Validation(message.to_string())),
    }
}
