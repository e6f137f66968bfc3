//! Startup checks: refuse to start with an unusable configuration.

use crate::config::ServerConfig;

/// Verify server configuration before opening anything.
pub fn verify_config(config: &ServerConfig) -> anyhow::Result<()> {
    if config.listen.trim().is_empty() {
        anyhow::bail!("listen address is empty in configuration.");
    }
    if config.storage.data_dir.trim().is_empty() && config.storage.sqlite_path.is_none() {
        anyhow::bail!("storage needs a data_dir or an explicit sqlite_path.");
    }
    if let Some(path) = &config.storage.sqlite_path {
        if path.as_os_str().is_empty() {
            anyhow::bail!("storage sqlite_path is empty in configuration.");
        }
    }
    check_url("cladd.base_url", &config.cladd.base_url)?;
    check_url("printer.url", &config.printer.url)?;
    if config.importado.host.trim().is_empty() {
        anyhow::bail!("importado.host is empty in configuration.");
    }
    if config.importado.database.trim().is_empty() {
        anyhow::bail!("importado.database is empty in configuration.");
    }
    Ok(())
}

fn check_url(field: &str, value: &str) -> anyhow::Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{field} is empty in configuration.");
    }
    if !(value.starts_with("http://") || value.starts_with("https://")) {
        anyhow::bail!("{field} must be an http(s) URL, got {value:?}.");
    }
    Ok(())
}
