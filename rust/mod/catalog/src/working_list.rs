//! The operator's list of matched pieces, before it is saved as a lot.

use crate::model::{CatalogPiece, PieceBatch};

pub const DUPLICATE_PIECE: &str = "Esta pieza ya está en la lista";
pub const BLANK_SERIAL: &str = "Por favor ingrese un número de serie";

/// Ordered, duplicate-free set of catalog pieces keyed by `id`.
#[derive(Debug, Clone, Default)]
pub struct WorkingList {
    pieces: Vec<CatalogPiece>,
}

impl WorkingList {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if a piece with this catalog id is already listed.
    pub fn contains(&self, id: &str) -> bool {
        self.pieces.iter().any(|p| p.id == id)
    }

    /// Append a piece. Rejects blank ids and duplicates.
    pub fn add(&mut self, piece: CatalogPiece) -> Result<(), &'static str> {
        if piece.id.trim().is_empty() {
            return Err(BLANK_SERIAL);
        }
        if self.contains(&piece.id) {
            return Err(DUPLICATE_PIECE);
        }
        self.pieces.push(piece);
        Ok(())
    }

    /// Remove a piece by id. Returns whether it was listed.
    pub fn remove(&mut self, id: &str) -> bool {
        let len = self.pieces.len();
        self.pieces.retain(|p| p.id != id);
        self.pieces.len() < len
    }

    /// Most recently added first.
    pub fn newest_first(&self) -> impl Iterator<Item = &CatalogPiece> {
        self.pieces.iter().rev()
    }

    pub fn len(&self) -> usize {
        self.pieces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pieces.is_empty()
    }

    /// Body for `POST /api/pieces`, in insertion order.
    pub fn to_save_request(&self) -> PieceBatch {
        PieceBatch {
            pieces: self.pieces.clone(),
        }
    }

    pub fn clear(&mut self) {
        self.pieces.clear();
    }
}
