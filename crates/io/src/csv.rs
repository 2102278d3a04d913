// CSV/TSV dataset reading

use std::io::Read;
use std::path::Path;

use crate::dataset::{Cell, RawTable, REQUIRED_COLUMNS};
use crate::error::LoadError;

pub fn read_table(path: &Path) -> Result<RawTable, LoadError> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    table_from_string(path, &content, delimiter)
}

pub fn read_table_tsv(path: &Path) -> Result<RawTable, LoadError> {
    let content = read_file_as_utf8(path)?;
    table_from_string(path, &content, b'\t')
}

/// Pick the delimiter that splits the header line into the most known claim
/// columns. A header naming none of them falls back to the widest split;
/// remaining ties go to the earlier candidate.
fn sniff_delimiter(content: &str) -> u8 {
    const CANDIDATES: [u8; 4] = [b',', b'\t', b';', b'|'];

    let Some(header) = content.lines().find(|line| !line.trim().is_empty()) else {
        return b',';
    };

    let mut best = (0, 1, b',');
    for delim in CANDIDATES {
        let fields = header_fields(header, delim);
        let known = fields
            .iter()
            .filter(|f| REQUIRED_COLUMNS.contains(&f.trim()))
            .count();
        if (known, fields.len()) > (best.0, best.1) {
            best = (known, fields.len(), delim);
        }
    }
    best.2
}

fn header_fields(line: &str, delimiter: u8) -> Vec<String> {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes())
        .records()
        .next()
        .and_then(Result::ok)
        .map(|record| record.iter().map(str::to_string).collect())
        .unwrap_or_default()
}

/// Read file and convert to UTF-8 if needed (Excel-exported CSVs are often Windows-1252)
pub fn read_file_as_utf8(path: &Path) -> Result<String, LoadError> {
    let open_err = |e: std::io::Error| LoadError::Open {
        path: path.to_path_buf(),
        message: e.to_string(),
    };
    let mut file = std::fs::File::open(path).map_err(open_err)?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(open_err)?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s.strip_prefix('\u{feff}').map(str::to_string).unwrap_or(s)),
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

fn table_from_string(path: &Path, content: &str, delimiter: u8) -> Result<RawTable, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| LoadError::Open {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(field.to_string())
                    }
                })
                .collect(),
        );
    }

    Ok(RawTable { header_row: 1, rows })
}
