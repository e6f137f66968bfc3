use serde::{Deserialize, Serialize};

use catalog::PieceSource;

/// Lot: a batch of pieces saved together under a generated code.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Lot {
    pub id: i64,

    /// Unique code, e.g. `LOT-2025-03-01-14-05-09`.
    pub lot_code: String,

    /// Batch size at creation. Never recomputed.
    pub piece_count: i64,

    /// Number of spreadsheet exports.
    pub download_count: i64,

    pub created_date: String,

    pub updated_date: String,
}

/// Piece: one labeled physical item, owned by a lot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Piece {
    pub id: i64,

    /// Catalog identifier (CLADD serial / IMPORTADO code). Not unique.
    pub piece_id: String,

    pub source: PieceSource,

    pub article: String,

    pub cod_articulo: Option<String>,

    pub color: String,

    pub measure: String,

    pub id_color_web: Option<String>,

    /// Source record retained from the catalog.
    pub data: Option<serde_json::Value>,

    pub lot_id: i64,

    pub created_date: String,

    pub updated_date: String,

    /// Soft-delete marker. Deleted pieces are invisible to every read.
    pub deleted_date: Option<String>,
}

/// A piece about to be inserted (no id, no timestamps yet).
#[derive(Debug, Clone, PartialEq)]
pub struct NewPiece {
    pub piece_id: String,
    pub source: PieceSource,
    pub article: String,
    pub cod_articulo: Option<String>,
    pub color: String,
    pub measure: String,
    pub id_color_web: Option<String>,
    pub data: Option<serde_json::Value>,
}

// ── Response views ──────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LotSummary {
    pub id: i64,
    pub code: String,
    pub piece_count: i64,
    pub download_count: i64,
    pub created_date: String,
}

impl From<&Lot> for LotSummary {
    fn from(lot: &Lot) -> Self {
        Self {
            id: lot.id,
            code: lot.lot_code.clone(),
            piece_count: lot.piece_count,
            download_count: lot.download_count,
            created_date: lot.created_date.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PieceSummary {
    pub id: i64,
    pub piece_id: String,
    pub cod_articulo: Option<String>,
    pub source: PieceSource,
    pub article: String,
    pub color: String,
    pub measure: String,
    pub created_date: String,
}

impl From<&Piece> for PieceSummary {
    fn from(p: &Piece) -> Self {
        Self {
            id: p.id,
            piece_id: p.piece_id.clone(),
            cod_articulo: p.cod_articulo.clone(),
            source: p.source,
            article: p.article.clone(),
            color: p.color.clone(),
            measure: p.measure.clone(),
            created_date: p.created_date.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LotList {
    pub lots: Vec<LotSummary>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LotDetail {
    pub lot: LotSummary,
    pub pieces: Vec<PieceSummary>,
}

/// A piece together with the lot it belongs to.
#[derive(Debug, Clone, Serialize)]
pub struct PieceWithLot {
    #[serde(flatten)]
    pub piece: Piece,
    pub lot: LotSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct PieceEnvelope {
    pub piece: PieceWithLot,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SavedLotInfo {
    pub id: i64,
    pub code: String,
    pub created_at: String,
    pub piece_count: i64,
}

/// Result of saving a working list.
#[derive(Debug, Clone, Serialize)]
pub struct SavedLot {
    pub success: bool,
    pub count: usize,
    pub ids: Vec<i64>,
    pub lot: SavedLotInfo,
}

/// A rendered lot spreadsheet.
#[derive(Debug, Clone)]
pub struct LotExport {
    pub filename: String,
    pub bytes: Vec<u8>,
}
