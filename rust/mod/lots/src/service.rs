use std::sync::Arc;

use catalog::CatalogPiece;
use labeler_core::{pad_start, ServiceError};
use tracing::{error, info};

use crate::export;
use crate::model::{
    Lot, LotDetail, LotExport, LotList, LotSummary, NewPiece, Piece, PieceEnvelope, PieceSummary,
    PieceWithLot, SavedLot, SavedLotInfo,
};
use crate::printer::{Label, LabelPrinter};
use crate::store::LotStore;

/// Longest catalog identifier the pieces table accepts.
pub const MAX_PIECE_ID_LEN: usize = 191;

/// Article codes are left-padded with zeros to this width.
const COD_ARTICULO_WIDTH: usize = 5;

pub const EMPTY_BATCH: &str = "La lista de piezas está vacía";

/// Lot operations: save a working list, reprint, list, detail and export.
pub struct LotService {
    store: LotStore,
    printer: Arc<dyn LabelPrinter>,
}

impl LotService {
    pub fn new(store: LotStore, printer: Arc<dyn LabelPrinter>) -> Self {
        Self { store, printer }
    }

    /// Save the batch as a new lot, then print one label per saved piece.
    ///
    /// Printer failures are logged and skipped; rows already written stay.
    pub async fn save_pieces(&self, pieces: Vec<CatalogPiece>) -> Result<SavedLot, ServiceError> {
        if pieces.is_empty() {
            return Err(ServiceError::Validation(EMPTY_BATCH.into()));
        }
        if let Some(p) = pieces.iter().find(|p| p.id.chars().count() > MAX_PIECE_ID_LEN) {
            return Err(ServiceError::Validation(format!(
                "Identificador de pieza demasiado largo: {}",
                p.id
            )));
        }

        let lot = self.store.create_lot(&lot_code_now(), pieces.len())?;
        let new_pieces: Vec<NewPiece> = pieces.into_iter().map(to_new_piece).collect();
        let saved = self.store.insert_pieces(lot.id, &new_pieces)?;
        info!(lot_code = %lot.lot_code, count = saved.len(), "lot saved");

        for piece in &saved {
            self.print_label(piece, &lot).await;
        }

        Ok(SavedLot {
            success: true,
            count: saved.len(),
            ids: saved.iter().map(|p| p.id).collect(),
            lot: SavedLotInfo {
                id: lot.id,
                code: lot.lot_code.clone(),
                created_at: lot.created_date.clone(),
                piece_count: lot.piece_count,
            },
        })
    }

    /// Print a stored piece's label again.
    pub async fn reprint_piece(&self, id: i64) -> Result<PieceEnvelope, ServiceError> {
        let piece = self.store.get_piece(id)?;
        let lot = self.store.get_lot(piece.lot_id)?;
        self.print_label(&piece, &lot).await;

        Ok(PieceEnvelope {
            piece: PieceWithLot {
                lot: LotSummary::from(&lot),
                piece,
            },
        })
    }

    pub fn list_lots(&self) -> Result<LotList, ServiceError> {
        let lots = self.store.list_lots()?;
        Ok(LotList {
            lots: lots.iter().map(LotSummary::from).collect(),
        })
    }

    pub fn lot_detail(&self, id: i64) -> Result<LotDetail, ServiceError> {
        let lot = self.store.get_lot(id)?;
        let pieces = self.store.lot_pieces(id)?;
        Ok(LotDetail {
            lot: LotSummary::from(&lot),
            pieces: pieces.iter().map(PieceSummary::from).collect(),
        })
    }

    /// Render the lot spreadsheet and count the download.
    pub fn export_lot(&self, id: i64) -> Result<LotExport, ServiceError> {
        let lot = self.store.get_lot(id)?;
        let pieces = self.store.lot_pieces(id)?;
        let bytes = export::lot_workbook(&pieces)
            .map_err(|e| ServiceError::Internal(format!("xlsx: {e}")))?;

        self.store.increment_downloads(id)?;

        Ok(LotExport {
            filename: format!("lote-{}.xlsx", lot.lot_code),
            bytes,
        })
    }

    async fn print_label(&self, piece: &Piece, lot: &Lot) {
        let label = Label {
            id: piece.id,
            articulo: piece.article.clone(),
            color: piece.color.clone(),
            peso: piece.measure.clone(),
            lote: lot.lot_code.clone(),
        };
        if let Err(e) = self.printer.print(&label).await {
            error!(piece = piece.id, lot_code = %lot.lot_code, "label print failed: {e}");
        }
    }
}

/// Lot code from the local clock, e.g. `LOT-2025-03-01-14-05-09`.
fn lot_code_now() -> String {
    chrono::Local::now().format("LOT-%Y-%m-%d-%H-%M-%S").to_string()
}

fn to_new_piece(p: CatalogPiece) -> NewPiece {
    NewPiece {
        piece_id: p.id,
        source: p.source,
        article: p.article,
        cod_articulo: p
            .cod_articulo
            .map(|c| pad_start(&c, COD_ARTICULO_WIDTH, '0')),
        color: p.color,
        measure: p.measure,
        id_color_web: p.id_color_web,
        data: p.original_data,
    }
}

#[cfg(test)]
mod tests {
    use catalog::PieceSource;
    use labeler_sql::{SQLStore, SqliteStore};

    use super::*;
    use crate::printer::testing::RecordingPrinter;

    fn service(printer: Arc<RecordingPrinter>) -> LotService {
        let db: Arc<dyn SQLStore> = Arc::new(SqliteStore::open_in_memory().unwrap());
        LotService::new(LotStore::new(db).unwrap(), printer)
    }

    fn incoming(id: &str, cod: Option<&str>) -> CatalogPiece {
        CatalogPiece {
            id: id.into(),
            article: format!("Artículo {id}"),
            cod_articulo: cod.map(Into::into),
            color: "Rojo".into(),
            measure: "22.4".into(),
            id_color_web: None,
            original_data: Some(serde_json::json!({"nroSerie": id})),
            source: PieceSource::Cladd,
        }
    }

    #[test]
    fn lot_code_shape() {
        let code = lot_code_now();
        assert!(code.starts_with("LOT-"));
        assert_eq!(code.len(), "LOT-2025-03-01-14-05-09".len());
        assert_eq!(code.matches('-').count(), 6);
    }

    #[tokio::test]
    async fn save_creates_lot_and_prints_in_order() {
        let printer = Arc::new(RecordingPrinter::default());
        let svc = service(printer.clone());

        let saved = svc
            .save_pieces(vec![incoming("A", Some("42")), incoming("B", None)])
            .await
            .unwrap();

        assert!(saved.success);
        assert_eq!(saved.count, 2);
        assert_eq!(saved.lot.piece_count, 2);
        assert!(saved.lot.code.starts_with("LOT-"));

        let labels = printer.labels();
        assert_eq!(labels.iter().map(|l| l.id).collect::<Vec<_>>(), saved.ids);
        assert_eq!(labels[0].articulo, "Artículo A");
        assert_eq!(labels[0].peso, "22.4");
        assert!(labels.iter().all(|l| l.lote == saved.lot.code));
    }

    #[tokio::test]
    async fn save_pads_article_code() {
        let svc = service(Arc::new(RecordingPrinter::default()));
        let saved = svc
            .save_pieces(vec![incoming("A", Some("42")), incoming("B", None)])
            .await
            .unwrap();

        let detail = svc.lot_detail(saved.lot.id).unwrap();
        let by_id = |pid: &str| detail.pieces.iter().find(|p| p.piece_id == pid).cloned().unwrap();
        assert_eq!(by_id("A").cod_articulo.as_deref(), Some("00042"));
        assert!(by_id("B").cod_articulo.is_none());
    }

    #[tokio::test]
    async fn printer_failures_do_not_abort_save() {
        let svc_printer = Arc::new(RecordingPrinter::failing([1]));
        let svc = service(svc_printer.clone());

        let saved = svc
            .save_pieces(vec![incoming("A", None), incoming("B", None), incoming("C", None)])
            .await
            .unwrap();

        assert_eq!(saved.ids, [1, 2, 3]);
        assert_eq!(svc_printer.labels().len(), 3);
        assert_eq!(svc.lot_detail(saved.lot.id).unwrap().pieces.len(), 3);
    }

    #[tokio::test]
    async fn empty_batch_rejected() {
        let printer = Arc::new(RecordingPrinter::default());
        let svc = service(printer.clone());
        let err = svc.save_pieces(vec![]).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ref m) if m == EMPTY_BATCH));
        assert!(svc.list_lots().unwrap().lots.is_empty());
    }

    #[tokio::test]
    async fn overlong_piece_id_rejected() {
        let svc = service(Arc::new(RecordingPrinter::default()));
        let long = "x".repeat(MAX_PIECE_ID_LEN + 1);
        let err = svc.save_pieces(vec![incoming(&long, None)]).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[tokio::test]
    async fn same_piece_may_be_saved_twice() {
        let svc = service(Arc::new(RecordingPrinter::default()));
        let first = svc.save_pieces(vec![incoming("A", None)]).await.unwrap();
        let second = svc.save_pieces(vec![incoming("A", None)]).await.unwrap();
        assert_ne!(first.lot.id, second.lot.id);
        assert_ne!(first.lot.code, second.lot.code);
    }

    #[tokio::test]
    async fn reprint_uses_lot_code() {
        let printer = Arc::new(RecordingPrinter::default());
        let svc = service(printer.clone());
        let saved = svc.save_pieces(vec![incoming("A", None)]).await.unwrap();

        let env = svc.reprint_piece(saved.ids[0]).await.unwrap();
        assert_eq!(env.piece.piece.piece_id, "A");
        assert_eq!(env.piece.lot.code, saved.lot.code);

        let labels = printer.labels();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[1].lote, saved.lot.code);
    }

    #[tokio::test]
    async fn reprint_missing_piece() {
        let svc = service(Arc::new(RecordingPrinter::default()));
        assert!(matches!(
            svc.reprint_piece(5).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn export_counts_downloads() {
        let svc = service(Arc::new(RecordingPrinter::default()));
        let saved = svc.save_pieces(vec![incoming("A", None)]).await.unwrap();

        let export = svc.export_lot(saved.lot.id).unwrap();
        assert_eq!(export.filename, format!("lote-{}.xlsx", saved.lot.code));
        assert!(export.bytes.starts_with(b"PK"));

        svc.export_lot(saved.lot.id).unwrap();
        let lots = svc.list_lots().unwrap().lots;
        assert_eq!(lots[0].download_count, 2);
    }

    #[tokio::test]
    async fn export_missing_lot() {
        let svc = service(Arc::new(RecordingPrinter::default()));
        assert!(matches!(svc.export_lot(9), Err(ServiceError::NotFound(_))));
    }
}
