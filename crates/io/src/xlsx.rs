// Spreadsheet dataset reading (xlsx, xlsm, xls, xlsb, ods)

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};

use crate::dataset::{Cell, RawTable};
use crate::error::LoadError;

/// Read one worksheet (default: the first) into a raw table.
pub fn read_table(path: &Path, sheet: Option<&str>) -> Result<RawTable, LoadError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| LoadError::Open {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let sheet_names = workbook.sheet_names();
    let sheet_name = match sheet {
        Some(name) => sheet_names
            .iter()
            .find(|s| s.as_str() == name)
            .cloned()
            .ok_or_else(|| LoadError::UnknownSheet {
                sheet: name.to_string(),
                available: sheet_names.clone(),
            })?,
        None => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| LoadError::NoSheets { path: path.to_path_buf() })?,
    };

    let range = workbook.worksheet_range(&sheet_name).map_err(|e| LoadError::Open {
        path: path.to_path_buf(),
        message: format!("failed to read sheet '{sheet_name}': {e}"),
    })?;

    // Range start offset (data may not begin at A1)
    let (start_row, start_col) = range.start().unwrap_or((0, 0));
    let pad = start_col as usize;

    let rows = range
        .rows()
        .map(|row| {
            std::iter::repeat(Cell::Empty)
                .take(pad)
                .chain(row.iter().map(cell_from_data))
                .collect()
        })
        .collect();

    log::debug!("read sheet '{sheet_name}' from {}", path.display());

    Ok(RawTable {
        header_row: start_row as usize + 1,
        rows,
    })
}

fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) if s.is_empty() => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(n) => Cell::Number(*n),
        Data::Int(n) => Cell::Number(*n as f64),
        Data::Bool(b) => Cell::Other(if *b { "TRUE" } else { "FALSE" }.to_string()),
        Data::Error(e) => Cell::Other(format!("#{:?}", e)),
        // Dates stay serials in text; they are never purchase orders or amounts
        Data::DateTime(dt) => Cell::Other(format!("{}", dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Other(s.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_xlsxwriter::Workbook;

    #[test]
    fn reads_first_sheet_with_types() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("claims.xlsx");

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 0, "PO").unwrap();
        sheet.write_string(0, 1, "Reason").unwrap();
        sheet.write_number(1, 0, 4500123.0).unwrap();
        sheet.write_string(1, 1, "Torn").unwrap();
        sheet.write_boolean(2, 0, true).unwrap();
        workbook.save(&path).unwrap();

        let table = read_table(&path, None).unwrap();
        assert_eq!(table.header_row, 1);
        assert_eq!(table.rows[0], vec![Cell::Text("PO".into()), Cell::Text("Reason".into())]);
        assert_eq!(table.rows[1][0], Cell::Number(4500123.0));
        assert_eq!(table.rows[2][0], Cell::Other("TRUE".into()));
    }

    #[test]
    fn selects_sheet_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("claims.xlsx");

        let mut workbook = Workbook::new();
        workbook.add_worksheet().set_name("April").unwrap().write_string(0, 0, "april").unwrap();
        workbook.add_worksheet().set_name("May").unwrap().write_string(0, 0, "may").unwrap();
        workbook.save(&path).unwrap();

        let table = read_table(&path, Some("May")).unwrap();
        assert_eq!(table.rows[0][0], Cell::Text("may".into()));

        let err = read_table(&path, Some("June")).unwrap_err();
        match err {
            LoadError::UnknownSheet { sheet, available } => {
                assert_eq!(sheet, "June");
                assert_eq!(available, vec!["April".to_string(), "May".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn offset_range_keeps_columns_aligned() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("offset.xlsx");

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(2, 1, "PO").unwrap();
        sheet.write_number(3, 1, 7.0).unwrap();
        workbook.save(&path).unwrap();

        let table = read_table(&path, None).unwrap();
        assert_eq!(table.header_row, 3);
        assert_eq!(table.rows[0], vec![Cell::Empty, Cell::Text("PO".into())]);
        assert_eq!(table.rows[1], vec![Cell::Empty, Cell::Number(7.0)]);
    }

    #[test]
    fn not_a_workbook() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.xlsx");
        std::fs::write(&path, b"not a zip").unwrap();
        assert!(matches!(read_table(&path, None), Err(LoadError::Open { .. })));
    }
}
