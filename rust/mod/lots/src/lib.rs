pub mod api;
pub mod export;
pub mod model;
pub mod printer;
pub mod service;
pub mod store;

use std::sync::Arc;

use axum::Router;
use labeler_core::Module;

pub use model::{Lot, Piece};
pub use printer::{HttpPrinter, LabelPrinter, PrinterConfig};
use service::LotService;

/// Lots module: saved lots, label printing and spreadsheet export.
pub struct LotsModule {
    service: Arc<LotService>,
}

impl LotsModule {
    pub fn new(service: LotService) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

impl Module for LotsModule {
    fn name(&self) -> &str {
        "lots"
    }

    fn routes(&self) -> Router {
        api::router(self.service.clone())
    }
}
