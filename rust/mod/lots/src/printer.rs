//! Label printer: remote HTTP device triggered once per saved piece.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Query parameters sent to the printer for one label.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Label {
    pub id: i64,
    pub articulo: String,
    pub color: String,
    pub peso: String,
    pub lote: String,
}

#[derive(Error, Debug)]
pub enum PrintError {
    #[error("printer request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("printer returned {status}: {body}")]
    Status { status: u16, body: String },
}

/// Something that can print a piece label.
#[async_trait]
pub trait LabelPrinter: Send + Sync {
    async fn print(&self, label: &Label) -> Result<(), PrintError>;
}

/// Printer device settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PrinterConfig {
    /// Full URL of the print endpoint; label fields are appended as a query.
    pub url: String,
    pub timeout_secs: u64,
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self {
            url: "http://192.168.1.119/etiquetador/apiWeb/testImpresora.php".to_string(),
            timeout_secs: 10,
        }
    }
}

/// `LabelPrinter` over the device's HTTP GET endpoint.
pub struct HttpPrinter {
    http: reqwest::Client,
    url: String,
}

impl HttpPrinter {
    pub fn new(config: &PrinterConfig) -> Result<Self, PrintError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            url: config.url.clone(),
        })
    }
}

#[async_trait]
impl LabelPrinter for HttpPrinter {
    async fn print(&self, label: &Label) -> Result<(), PrintError> {
        debug!(id = label.id, lote = %label.lote, "printing label");

        let resp = self.http.get(&self.url).query(label).send().await?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(PrintError::Status { status, body });
        }
        Ok(())
    }
}
