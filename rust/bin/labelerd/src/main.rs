//! `labelerd`: the piece labeler server binary.
//!
//! Usage:
//!   labelerd [-c <config.toml>] [--listen <addr>] [--sqlite <path>]
//!            [--cladd-url <url>] [--printer-url <url>]
//!
//! Flags (and their env vars) override the config file; without a file
//! every setting takes its default.

mod bootstrap;
mod config;
mod routes;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use labeler_core::Module;
use tracing::info;

use catalog::cladd::CladdClient;
use catalog::importado::{ImportadoSource, MssqlSource};
use catalog::service::CatalogService;
use catalog::CatalogModule;
use config::ServerConfig;
use lots::service::LotService;
use lots::store::LotStore;
use lots::{HttpPrinter, LabelPrinter, LotsModule};

/// Piece labeler server.
#[derive(Parser, Debug)]
#[command(name = "labelerd", about = "Textile piece labeler server")]
struct Cli {
    /// Path to the TOML config file.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Listen address.
    #[arg(long = "listen", env = "LABELER_LISTEN")]
    listen: Option<String>,

    /// SQLite database file for lots.
    #[arg(long = "sqlite", env = "LABELER_SQLITE_PATH")]
    sqlite: Option<PathBuf>,

    /// CLADD API base URL.
    #[arg(long = "cladd-url", env = "CLADD_API_URL")]
    cladd_url: Option<String>,

    /// Label printer endpoint URL.
    #[arg(long = "printer-url", env = "PRINTER_API_URL")]
    printer_url: Option<String>,
}

impl Cli {
    fn apply(self, config: &mut ServerConfig) {
        if let Some(listen) = self.listen {
            config.listen = listen;
        }
        if let Some(path) = self.sqlite {
            config.storage.sqlite_path = Some(path);
        }
        if let Some(url) = self.cladd_url {
            config.cladd.base_url = url;
        }
        if let Some(url) = self.printer_url {
            config.printer.url = url;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    // Load server configuration.
    let mut server_config = match &cli.config {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            ServerConfig::load(path)?
        }
        None => {
            info!("No config file given, using defaults");
            ServerConfig::default()
        }
    };
    cli.apply(&mut server_config);

    bootstrap::verify_config(&server_config)?;

    // Initialize storage.
    let core_config = server_config.service_config();
    let sqlite_path = core_config.resolve_sqlite_path();
    if let Some(parent) = sqlite_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let sql: Arc<dyn labeler_sql::SQLStore> = Arc::new(
        labeler_sql::SqliteStore::open(&sqlite_path)
            .map_err(|e| anyhow::anyhow!("failed to open SQL store: {}", e))?,
    );
    info!("Lots database at {}", sqlite_path.display());

    // Catalog module.
    let cladd = CladdClient::new(&server_config.cladd)?;
    let importado: Arc<dyn ImportadoSource> =
        Arc::new(MssqlSource::new(server_config.importado.clone()));
    let catalog_module = CatalogModule::new(CatalogService::new(cladd, importado));
    info!(
        cladd = %server_config.cladd.base_url,
        importado = %server_config.importado.host,
        "Catalog module initialized"
    );

    // Lots module.
    let printer: Arc<dyn LabelPrinter> = Arc::new(HttpPrinter::new(&server_config.printer)?);
    let lots_module = LotsModule::new(LotService::new(LotStore::new(Arc::clone(&sql))?, printer));
    info!(printer = %server_config.printer.url, "Lots module initialized");

    let module_routes = vec![
        (catalog_module.name(), catalog_module.routes()),
        (lots_module.name(), lots_module.routes()),
    ];
    let app = routes::build_router(module_routes);

    // Start server.
    let listener = tokio::net::TcpListener::bind(&core_config.listen).await?;
    info!("labelerd listening on {}", core_config.listen);
    axum::serve(listener, app).await?;

    Ok(())
}
