pub mod api;
pub mod cladd;
pub mod error;
pub mod importado;
pub mod model;
pub mod service;
pub mod working_list;

use std::sync::Arc;

use axum::Router;
use labeler_core::Module;

pub use error::CatalogError;
pub use model::{CatalogPiece, PieceBatch, PieceSource};
use service::CatalogService;

/// Catalog module: piece lookups in CLADD and IMPORTADO.
pub struct CatalogModule {
    service: Arc<CatalogService>,
}

impl CatalogModule {
    pub fn new(service: CatalogService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

impl Module for CatalogModule {
    fn name(&self) -> &str {
        "catalog"
    }

    fn routes(&self) -> Router {
        api::router(self.service.clone())
    }
}
