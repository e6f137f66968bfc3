//! Lot spreadsheet export.

use rust_xlsxwriter::{Format, Workbook, XlsxError};

use crate::model::Piece;

pub const SHEET_NAME: &str = "Lote";

pub const HEADERS: [&str; 5] = ["Cód. artículo", "Id Color", "Color", "ID interno", "Medida"];

pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Render pieces (in the given order) as a one-sheet xlsx workbook.
pub fn lot_workbook(pieces: &[Piece]) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    for (col, title) in HEADERS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *title, &header)?;
    }

    for (i, piece) in pieces.iter().enumerate() {
        let row = i as u32 + 1;
        sheet.write_string(row, 0, piece.cod_articulo.as_deref().unwrap_or(""))?;
        sheet.write_string(row, 1, piece.id_color_web.as_deref().unwrap_or(""))?;
        sheet.write_string(row, 2, &piece.color)?;
        sheet.write_number(row, 3, piece.id as f64)?;
        sheet.write_string(row, 4, &piece.measure)?;
    }

    workbook.save_to_buffer()
}

#[cfg(test)]
pub(crate) mod testing {
    use std::io::{Cursor, Read};

    pub fn entry(bytes: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut out = String::new();
        file.read_to_string(&mut out).unwrap();
        out
    }

    pub fn sheet_xml(bytes: &[u8]) -> String {
        entry(bytes, "xl/worksheets/sheet1.xml")
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{entry, sheet_xml};

    use catalog::PieceSource;

    use super::*;

    fn piece(id: i64, cod: Option<&str>, color_web: Option<&str>) -> Piece {
        Piece {
            id,
            piece_id: format!("P{id}"),
            source: PieceSource::Cladd,
            article: "Jersey".into(),
            cod_articulo: cod.map(Into::into),
            color: "Azul marino".into(),
            measure: "18.5".into(),
            id_color_web: color_web.map(Into::into),
            data: None,
            lot_id: 1,
            created_date: "2025-03-01T12:00:00.000Z".into(),
            updated_date: "2025-03-01T12:00:00.000Z".into(),
            deleted_date: None,
        }
    }

    #[test]
    fn workbook_has_named_sheet_and_headers() {
        let bytes = lot_workbook(&[piece(41, Some("00042"), Some("9"))]).unwrap();

        let workbook = entry(&bytes, "xl/workbook.xml");
        assert!(workbook.contains(r#"name="Lote""#));

        let strings = entry(&bytes, "xl/sharedStrings.xml");
        for title in HEADERS {
            assert!(strings.contains(title), "missing header {title}");
        }
        assert!(strings.contains("00042"));
        assert!(strings.contains("Azul marino"));
        assert!(strings.contains("18.5"));
    }

    #[test]
    fn internal_id_is_numeric_cell() {
        let bytes = lot_workbook(&[piece(41, None, None)]).unwrap();
        let sheet = sheet_xml(&bytes);
        assert!(sheet.contains(r#"<c r="D2"><v>41</v></c>"#));
    }

    #[test]
    fn empty_lot_still_renders_headers() {
        let bytes = lot_workbook(&[]).unwrap();
        let strings = entry(&bytes, "xl/sharedStrings.xml");
        assert!(strings.contains("ID interno"));
    }

    #[test]
    fn rows_follow_input_order() {
        let bytes = lot_workbook(&[piece(52, None, None), piece(51, None, None)]).unwrap();
        let sheet = sheet_xml(&bytes);
        assert!(sheet.contains(r#"<c r="D2"><v>52</v></c>"#));
        assert!(sheet.contains(r#"<c r="D3"><v>51</v></c>"#));
    }
}
