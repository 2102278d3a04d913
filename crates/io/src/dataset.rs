//! Claim dataset loading: raw sheet cells → cleaned [`Record`]s.
//!
//! The header row names the columns (fixed, case-sensitive). Rows whose `PO`
//! is not numeric are dropped silently; this swallows totals, footers and
//! blank lines.

use std::path::Path;

use claimdoc_config::DatasetSource;
use claimdoc_engine::{PoKey, Record};
use serde::Serialize;

use crate::error::LoadError;

pub const COL_PO: &str = "PO";
pub const COL_INVOICE_NO: &str = "Invoice NO";
pub const COL_PRODUCT_CODE: &str = "Product code";
pub const COL_DAMAGE: &str = "Damage";
pub const COL_BATCH_NUMBER: &str = "Batch Number";
pub const COL_REASON: &str = "Reason";
pub const COL_COMPLAINT: &str = "Complaint";
pub const COL_GOOD_VALUE: &str = "Good Value";

pub const REQUIRED_COLUMNS: [&str; 8] = [
    COL_PO,
    COL_INVOICE_NO,
    COL_PRODUCT_CODE,
    COL_DAMAGE,
    COL_BATCH_NUMBER,
    COL_REASON,
    COL_COMPLAINT,
    COL_GOOD_VALUE,
];

/// One sheet cell as read from the source file.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Number(f64),
    Text(String),
    /// Booleans, errors, dates: shown as text, never numeric.
    Other(String),
}

impl Cell {
    /// Display text. Integral numbers drop the decimal point.
    pub fn as_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
            Cell::Text(s) | Cell::Other(s) => s.clone(),
        }
    }

    /// Numeric coercion; `None` when the cell is not a finite number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) => Some(*n).filter(|n| n.is_finite()),
            Cell::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
            Cell::Empty | Cell::Other(_) => None,
        }
    }
}

/// Header row plus data rows, before column mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    /// 1-based sheet row of `rows[0]`.
    pub header_row: usize,
    pub rows: Vec<Vec<Cell>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub records: Vec<Record>,
    /// Data rows dropped for a non-numeric PO.
    pub dropped_rows: usize,
}

pub fn load(source: &DatasetSource) -> Result<Dataset, LoadError> {
    let table = read_table(&source.path, source.sheet.as_deref())?;
    let dataset = records_from_table(table)?;
    log::info!(
        "loaded {} records from {} ({} rows dropped)",
        dataset.records.len(),
        source.path.display(),
        dataset.dropped_rows
    );
    Ok(dataset)
}

fn read_table(path: &Path, sheet: Option<&str>) -> Result<RawTable, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("csv") | Some("txt") => crate::csv::read_table(path),
        Some("tsv") | Some("tab") => crate::csv::read_table_tsv(path),
        _ => crate::xlsx::read_table(path, sheet),
    }
}

struct ColumnIndex {
    po: usize,
    invoice_no: usize,
    product_code: usize,
    damage: usize,
    batch_number: usize,
    reason: usize,
    complaint: usize,
    good_value: usize,
}

impl ColumnIndex {
    fn from_header(header: &[Cell]) -> Result<Self, LoadError> {
        let names: Vec<String> = header.iter().map(|c| c.as_text().trim().to_string()).collect();
        let idx = |name: &str| -> Result<usize, LoadError> {
            names
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| LoadError::MissingColumn { column: name.into() })
        };

        Ok(Self {
            po: idx(COL_PO)?,
            invoice_no: idx(COL_INVOICE_NO)?,
            product_code: idx(COL_PRODUCT_CODE)?,
            damage: idx(COL_DAMAGE)?,
            batch_number: idx(COL_BATCH_NUMBER)?,
            reason: idx(COL_REASON)?,
            complaint: idx(COL_COMPLAINT)?,
            good_value: idx(COL_GOOD_VALUE)?,
        })
    }
}

/// Map a raw table onto records, dropping rows without a numeric PO.
pub fn records_from_table(table: RawTable) -> Result<Dataset, LoadError> {
    let mut rows = table.rows.into_iter();
    let header = rows.next().unwrap_or_default();
    let cols = ColumnIndex::from_header(&header)?;

    let empty = Cell::Empty;
    let mut records = Vec::new();
    let mut dropped_rows = 0;

    for (offset, row) in rows.enumerate() {
        let row_number = table.header_row + offset + 1;
        let cell = |i: usize| row.get(i).unwrap_or(&empty);

        let Some(po) = cell(cols.po).as_number().and_then(PoKey::new) else {
            log::debug!("row {row_number}: dropped, PO '{}' is not numeric", cell(cols.po).as_text());
            dropped_rows += 1;
            continue;
        };

        records.push(Record {
            row: row_number,
            po,
            invoice_no: cell(cols.invoice_no).as_text(),
            product_code: cell(cols.product_code).as_text(),
            damage: amount(cell(cols.damage), row_number, COL_DAMAGE),
            batch_number: cell(cols.batch_number).as_text(),
            reason: cell(cols.reason).as_text(),
            complaint: cell(cols.complaint).as_text(),
            good_value: amount(cell(cols.good_value), row_number, COL_GOOD_VALUE),
        });
    }

    Ok(Dataset { records, dropped_rows })
}

/// Numeric column value; blank or non-numeric counts as zero.
fn amount(cell: &Cell, row: usize, column: &str) -> f64 {
    if cell.as_text().trim().is_empty() {
        return 0.0;
    }
    cell.as_number().unwrap_or_else(|| {
        log::warn!("row {row}: {column} '{}' is not a number, counted as 0", cell.as_text());
        0.0
    })
}
