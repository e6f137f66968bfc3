//! Server configuration: `labelerd.toml`.
//!
//! Every section is optional; missing fields take the values of the
//! shop-floor deployment.

use std::path::{Path, PathBuf};

use catalog::cladd::CladdConfig;
use catalog::importado::ImportadoConfig;
use lots::PrinterConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: String,
    pub storage: StorageConfig,
    pub cladd: CladdConfig,
    pub printer: PrinterConfig,
    pub importado: ImportadoConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:3040".to_string(),
            storage: StorageConfig::default(),
            cladd: CladdConfig::default(),
            printer: PrinterConfig::default(),
            importado: ImportadoConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory for local state.
    pub data_dir: String,
    /// Explicit database file; defaults to `{data_dir}/labeler.sqlite`.
    pub sqlite_path: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
            sqlite_path: None,
        }
    }
}

impl ServerConfig {
    /// Load from a TOML file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read {}: {}", path.display(), e))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn service_config(&self) -> labeler_core::ServiceConfig {
        labeler_core::ServiceConfig {
            data_dir: Some(PathBuf::from(&self.storage.data_dir)),
            sqlite_path: self.storage.sqlite_path.clone(),
            listen: self.listen.clone(),
        }
    }
}
