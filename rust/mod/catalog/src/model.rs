use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which external catalog a piece was matched in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceSource {
    #[serde(rename = "CLADD")]
    Cladd,
    #[serde(rename = "IMPORTADO")]
    Importado,
}

impl PieceSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            PieceSource::Cladd => "CLADD",
            PieceSource::Importado => "IMPORTADO",
        }
    }
}

impl fmt::Display for PieceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PieceSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CLADD" => Ok(PieceSource::Cladd),
            "IMPORTADO" => Ok(PieceSource::Importado),
            other => Err(format!("unknown piece source '{other}'")),
        }
    }
}

/// A piece matched in one of the catalogs, reshaped for display.
///
/// This is both what the lookup endpoints return and what clients post
/// back (inside a [`PieceBatch`]) to save a lot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogPiece {
    /// Catalog identifier: CLADD serial number, or the full IMPORTADO code.
    pub id: String,

    pub article: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cod_articulo: Option<String>,

    pub color: String,

    pub measure: String,

    /// Web color id, set by clients that know it. Exported with the lot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_color_web: Option<String>,

    /// Source record as returned by the catalog.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_data: Option<serde_json::Value>,

    pub source: PieceSource,
}

/// Request body for saving a working list as a lot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PieceBatch {
    pub pieces: Vec<CatalogPiece>,
}

/// One row of the IMPORTADO catalog query.
///
/// Field names on the wire are the query's column aliases.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "PascalCase")]
pub struct ImportadoRecord {
    pub numero_pieza: String,
    pub color_articulo: Option<String>,
    pub color_por_articulo: Option<String>,
    pub numero_articulo: Option<String>,
    pub nombre_articulo: Option<String>,
    pub precio_articulo: Option<f64>,
    pub tipo_articulo: Option<String>,
}

/// Full IMPORTADO result set, as served by `GET /api/importado/all`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportadoSnapshot {
    pub data: Vec<ImportadoRecord>,
    pub count: usize,
    pub loaded_at: String,
}

/// Result of a manual IMPORTADO reload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReloadSummary {
    pub success: bool,
    pub message: String,
    pub loaded_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_wire_names() {
        assert_eq!(serde_json::to_value(PieceSource::Cladd).unwrap(), "CLADD");
        assert_eq!(serde_json::to_value(PieceSource::Importado).unwrap(), "IMPORTADO");
        assert_eq!("IMPORTADO".parse::<PieceSource>().unwrap(), PieceSource::Importado);
        assert!("cladd".parse::<PieceSource>().is_err());
    }

    #[test]
    fn catalog_piece_accepts_client_body() {
        let piece: CatalogPiece = serde_json::from_value(serde_json::json!({
            "id": "A123",
            "article": "Jersey",
            "codArticulo": "42",
            "color": "Rojo",
            "measure": "22.4",
            "idColorWeb": "7",
            "source": "CLADD",
        }))
        .unwrap();
        assert_eq!(piece.cod_articulo.as_deref(), Some("42"));
        assert_eq!(piece.id_color_web.as_deref(), Some("7"));
        assert!(piece.original_data.is_none());
    }

    #[test]
    fn catalog_piece_rejects_unknown_source() {
        let result: Result<CatalogPiece, _> = serde_json::from_value(serde_json::json!({
            "id": "A123",
            "article": "Jersey",
            "color": "Rojo",
            "measure": "22.4",
            "source": "OTRO",
        }));
        assert!(result.is_err());
    }

    #[test]
    fn importado_record_uses_column_aliases() {
        let rec = ImportadoRecord {
            numero_pieza: "54999000".into(),
            nombre_articulo: Some("Lycra".into()),
            precio_articulo: Some(1250.5),
            ..Default::default()
        };
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["NumeroPieza"], "54999000");
        assert_eq!(json["NombreArticulo"], "Lycra");
        assert_eq!(json["PrecioArticulo"], 1250.5);
        assert!(json["ColorPorArticulo"].is_null());
    }
}
