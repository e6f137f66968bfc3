use std::sync::Arc;

use labeler_core::{now_rfc3339, ServiceError};
use labeler_sql::{Row, SQLStore, Value};
use tracing::warn;

use catalog::PieceSource;

use crate::model::{Lot, NewPiece, Piece};

/// SQL schema for lots and their pieces.
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS lots (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    lot_code        TEXT NOT NULL UNIQUE,
    piece_count     INTEGER NOT NULL DEFAULT 0,
    download_count  INTEGER NOT NULL DEFAULT 0,
    created_date    TEXT NOT NULL,
    updated_date    TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS pieces (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    piece_id        TEXT NOT NULL,
    source          TEXT NOT NULL,
    article         TEXT NOT NULL,
    cod_articulo    TEXT,
    color           TEXT NOT NULL,
    measure         TEXT NOT NULL,
    color_web_id    TEXT,
    data            TEXT,
    lot_id          INTEGER NOT NULL REFERENCES lots(id) ON DELETE CASCADE,
    created_date    TEXT NOT NULL,
    updated_date    TEXT NOT NULL,
    deleted_date    TEXT
);
CREATE INDEX IF NOT EXISTS idx_lot_created ON lots(created_date);
CREATE INDEX IF NOT EXISTS idx_piece_lot ON pieces(lot_id);
";

const LOT_COLUMNS: &str = "id, lot_code, piece_count, download_count, created_date, updated_date";

const PIECE_COLUMNS: &str = "id, piece_id, source, article, cod_articulo, color, measure, \
     color_web_id, data, lot_id, created_date, updated_date, deleted_date";

/// Columns bound per piece in a multi-row insert.
const PIECE_INSERT_COLUMNS: usize = 11;

/// Rows per INSERT statement, keeping bound parameters well under SQLite's limit.
const PIECE_INSERT_CHUNK: usize = 500;

/// How many suffixed variants of a lot code to try after a collision.
const MAX_CODE_SUFFIX: usize = 9;

/// Persistent storage for lots and pieces, backed by SQLStore (SQLite).
pub struct LotStore {
    db: Arc<dyn SQLStore>,
}

impl LotStore {
    /// Create a new LotStore and initialise the schema.
    pub fn new(db: Arc<dyn SQLStore>) -> Result<Self, ServiceError> {
        db.exec_batch(SCHEMA)
            .map_err(|e| ServiceError::Storage(format!("lot schema init: {e}")))?;
        Ok(Self { db })
    }

    // -----------------------------------------------------------------------
    // Lots
    // -----------------------------------------------------------------------

    /// Insert a lot under `code`. On a code collision, retries with
    /// `-2` … `-9` suffixes before giving up.
    pub fn create_lot(&self, code: &str, piece_count: usize) -> Result<Lot, ServiceError> {
        let now = now_rfc3339();

        for attempt in 1..=MAX_CODE_SUFFIX {
            let candidate = if attempt == 1 {
                code.to_string()
            } else {
                format!("{code}-{attempt}")
            };

            let result = self.db.insert(
                "INSERT INTO lots (lot_code, piece_count, download_count, created_date, updated_date) \
                 VALUES (?1, ?2, 0, ?3, ?3)",
                &[
                    Value::Text(candidate.clone()),
                    Value::Integer(piece_count as i64),
                    Value::Text(now.clone()),
                ],
            );

            match result {
                Ok(id) => {
                    return Ok(Lot {
                        id,
                        lot_code: candidate,
                        piece_count: piece_count as i64,
                        download_count: 0,
                        created_date: now.clone(),
                        updated_date: now,
                    })
                }
                Err(e) if e.is_constraint() => {
                    warn!(lot_code = %candidate, "lot code taken: {e}");
                }
                Err(e) => return Err(ServiceError::Storage(e.to_string())),
            }
        }

        Err(ServiceError::Storage(format!(
            "lot code {code} and its suffixed variants are taken"
        )))
    }

    /// Get a lot by id.
    pub fn get_lot(&self, id: i64) -> Result<Lot, ServiceError> {
        let rows = self
            .db
            .query(
                &format!("SELECT {LOT_COLUMNS} FROM lots WHERE id = ?1"),
                &[Value::Integer(id)],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        let row = rows
            .first()
            .ok_or_else(|| ServiceError::NotFound(format!("lot {id}")))?;
        row_to_lot(row)
    }

    /// All lots, newest first.
    pub fn list_lots(&self) -> Result<Vec<Lot>, ServiceError> {
        let rows = self
            .db
            .query(
                &format!("SELECT {LOT_COLUMNS} FROM lots ORDER BY created_date DESC, id DESC"),
                &[],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        rows.iter().map(row_to_lot).collect()
    }

    /// Bump the export counter and return the updated lot.
    pub fn increment_downloads(&self, id: i64) -> Result<Lot, ServiceError> {
        let affected = self
            .db
            .exec(
                "UPDATE lots SET download_count = download_count + 1, updated_date = ?1 WHERE id = ?2",
                &[Value::Text(now_rfc3339()), Value::Integer(id)],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        if affected == 0 {
            return Err(ServiceError::NotFound(format!("lot {id}")));
        }
        self.get_lot(id)
    }

    // -----------------------------------------------------------------------
    // Pieces
    // -----------------------------------------------------------------------

    /// Insert a batch of pieces for `lot_id` and return them as stored,
    /// in insertion order.
    ///
    /// Not wrapped in a transaction with the lot insert: a failure here
    /// leaves the lot row (and any earlier chunks) in place.
    pub fn insert_pieces(&self, lot_id: i64, pieces: &[NewPiece]) -> Result<Vec<Piece>, ServiceError> {
        let now = now_rfc3339();

        for chunk in pieces.chunks(PIECE_INSERT_CHUNK) {
            let mut placeholders = Vec::with_capacity(chunk.len());
            let mut params = Vec::with_capacity(chunk.len() * PIECE_INSERT_COLUMNS);

            for (row, piece) in chunk.iter().enumerate() {
                let base = row * PIECE_INSERT_COLUMNS;
                let slots: Vec<String> = (1..=PIECE_INSERT_COLUMNS)
                    .map(|i| format!("?{}", base + i))
                    .collect();
                placeholders.push(format!("({})", slots.join(", ")));

                let data = match &piece.data {
                    Some(v) => Value::Text(
                        serde_json::to_string(v).map_err(|e| ServiceError::Internal(e.to_string()))?,
                    ),
                    None => Value::Null,
                };

                params.extend([
                    Value::Text(piece.piece_id.clone()),
                    Value::Text(piece.source.as_str().to_string()),
                    Value::Text(piece.article.clone()),
                    Value::from(piece.cod_articulo.clone()),
                    Value::Text(piece.color.clone()),
                    Value::Text(piece.measure.clone()),
                    Value::from(piece.id_color_web.clone()),
                    data,
                    Value::Integer(lot_id),
                    Value::Text(now.clone()),
                    Value::Text(now.clone()),
                ]);
            }

            let sql = format!(
                "INSERT INTO pieces (piece_id, source, article, cod_articulo, color, measure, \
                 color_web_id, data, lot_id, created_date, updated_date) VALUES {}",
                placeholders.join(", "),
            );
            self.db
                .exec(&sql, &params)
                .map_err(|e| ServiceError::Storage(e.to_string()))?;
        }

        let rows = self
            .db
            .query(
                &format!(
                    "SELECT {PIECE_COLUMNS} FROM pieces \
                     WHERE lot_id = ?1 AND deleted_date IS NULL ORDER BY id ASC"
                ),
                &[Value::Integer(lot_id)],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        rows.iter().map(row_to_piece).collect()
    }

    /// Get a live (not soft-deleted) piece by id.
    pub fn get_piece(&self, id: i64) -> Result<Piece, ServiceError> {
        let rows = self
            .db
            .query(
                &format!(
                    "SELECT {PIECE_COLUMNS} FROM pieces WHERE id = ?1 AND deleted_date IS NULL"
                ),
                &[Value::Integer(id)],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        let row = rows
            .first()
            .ok_or_else(|| ServiceError::NotFound(format!("piece {id}")))?;
        row_to_piece(row)
    }

    /// Live pieces of a lot, newest first (ties broken by id, descending).
    pub fn lot_pieces(&self, lot_id: i64) -> Result<Vec<Piece>, ServiceError> {
        let rows = self
            .db
            .query(
                &format!(
                    "SELECT {PIECE_COLUMNS} FROM pieces \
                     WHERE lot_id = ?1 AND deleted_date IS NULL \
                     ORDER BY created_date DESC, id DESC"
                ),
                &[Value::Integer(lot_id)],
            )
            .map_err(|e| ServiceError::Storage(e.to_string()))?;

        rows.iter().map(row_to_piece).collect()
    }
}

fn text(row: &Row, col: &str) -> Result<String, ServiceError> {
    row.get_str(col)
        .map(str::to_string)
        .ok_or_else(|| ServiceError::Internal(format!("missing {col} column")))
}

fn opt_text(row: &Row, col: &str) -> Option<String> {
    row.get_str(col).map(str::to_string)
}

fn integer(row: &Row, col: &str) -> Result<i64, ServiceError> {
    row.get_i64(col)
        .ok_or_else(|| ServiceError::Internal(format!("missing {col} column")))
}

fn row_to_lot(row: &Row) -> Result<Lot, ServiceError> {
    Ok(Lot {
        id: integer(row, "id")?,
        lot_code: text(row, "lot_code")?,
        piece_count: integer(row, "piece_count")?,
        download_count: integer(row, "download_count")?,
        created_date: text(row, "created_date")?,
        updated_date: text(row, "updated_date")?,
    })
}

fn row_to_piece(row: &Row) -> Result<Piece, ServiceError> {
    let source = text(row, "source")?
        .parse::<PieceSource>()
        .map_err(ServiceError::Internal)?;

    let data = match row.get_str("data") {
        Some(s) => Some(serde_json::from_str(s).map_err(|e| ServiceError::Internal(e.to_string()))?),
        None => None,
    };

    Ok(Piece {
        id: integer(row, "id")?,
        piece_id: text(row, "piece_id")?,
        source,
        article: text(row, "article")?,
        cod_articulo: opt_text(row, "cod_articulo"),
        color: text(row, "color")?,
        measure: text(row, "measure")?,
        id_color_web: opt_text(row, "color_web_id"),
        data,
        lot_id: integer(row, "lot_id")?,
        created_date: text(row, "created_date")?,
        updated_date: text(row, "updated_date")?,
        deleted_date: opt_text(row, "deleted_date"),
    })
}
