//! CLADD catalog: remote HTTP lookup by serial number.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CatalogError;
use crate::model::{CatalogPiece, PieceSource};

const LOOKUP_PATH: &str = "/api/piezasCladd/piezaPorNroSerie";

/// Connection settings for the CLADD API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CladdConfig {
    /// Base URL, without the lookup path (e.g. `http://192.168.1.32:8010`).
    pub base_url: String,
    /// Whole-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for CladdConfig {
    fn default() -> Self {
        Self {
            base_url: "http://192.168.1.32:8010".to_string(),
            timeout_secs: 30,
        }
    }
}

/// HTTP client for the CLADD piece lookup.
pub struct CladdClient {
    http: reqwest::Client,
    base_url: String,
}

impl CladdClient {
    pub fn new(config: &CladdConfig) -> Result<Self, CatalogError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch the raw CLADD record for a serial number.
    pub async fn fetch_by_serial(&self, nro_serie: &str) -> Result<serde_json::Value, CatalogError> {
        let url = format!("{}{}", self.base_url, LOOKUP_PATH);
        debug!(nro_serie, "CLADD lookup");

        let resp = self
            .http
            .get(&url)
            .query(&[("nroSerie", nro_serie)])
            .header("Content-Type", "application/json")
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(CatalogError::Status { status, body });
        }

        resp.json()
            .await
            .map_err(|e| CatalogError::Decode(format!("CLADD response: {e}")))
    }
}

/// Reshape a CLADD record into the display record.
pub fn to_catalog_piece(data: serde_json::Value) -> Result<CatalogPiece, CatalogError> {
    if !data.is_object() {
        return Err(CatalogError::Decode(format!(
            "CLADD response is not an object: {data}"
        )));
    }

    Ok(CatalogPiece {
        id: display(&data["nroSerie"]),
        article: display(&data["descripcionArticulo"]),
        cod_articulo: Some(display(&data["codArticulo"])),
        color: display(&data["descripcionColor"]),
        measure: display(&data["peso"]),
        id_color_web: None,
        original_data: Some(data),
        source: PieceSource::Cladd,
    })
}

/// Render a scalar JSON field as a display string. Null/missing is empty.
fn display(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
