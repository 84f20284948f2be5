//! Header + rows view of a CSV file or the first table of an ODS file.

use std::path::{Path, PathBuf};

use csv::ReaderBuilder;
use tracing::debug;

use bt_ods::OdsDocument;

use crate::error::{IngestError, Result};

/// Supported input formats, chosen by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    Csv,
    Ods,
}

impl SourceKind {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match extension.as_str() {
            "csv" => Ok(Self::Csv),
            "ods" => Ok(Self::Ods),
            _ => Err(IngestError::UnsupportedFile {
                path: path.to_path_buf(),
                extension: if extension.is_empty() {
                    "(none)".to_string()
                } else {
                    format!(".{extension}")
                },
            }),
        }
    }
}

/// Sheet contents with the first row split off as headers.
///
/// Data rows keep their sheet position: `rows[i]` is sheet row `i + 1`
/// (zero-based, header is row 0), blank rows included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SheetTable {
    /// Split raw rows into header and data rows.
    pub fn from_rows(mut rows: Vec<Vec<String>>) -> Self {
        if rows.is_empty() {
            return Self::default();
        }
        let headers = rows.remove(0).iter().map(|value| normalize_header(value)).collect();
        Self { headers, rows }
    }

    /// Trimmed cell text, empty when the row is short.
    pub fn cell(&self, row: usize, column: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|cells| cells.get(column))
            .map_or("", |value| value.trim())
    }

    /// Zero-based sheet row of data row `row`.
    pub const fn sheet_row(row: usize) -> usize {
        row + 1
    }

    /// One-based row number as shown by spreadsheet applications.
    pub const fn display_row(row: usize) -> usize {
        row + 2
    }
}

fn normalize_header(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').trim().to_string()
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

pub fn read_csv_table(path: &Path) -> Result<SheetTable> {
    let csv_error = |source| IngestError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(csv_error)?;
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        rows.push(record.iter().map(normalize_cell).collect());
    }
    debug!(path = %path.display(), rows = rows.len(), "read csv table");
    Ok(SheetTable::from_rows(rows))
}

pub fn read_ods_table(path: &Path) -> Result<SheetTable> {
    let ods_error = |source| IngestError::Ods {
        path: PathBuf::from(path),
        source,
    };
    let rows = OdsDocument::open(path)
        .and_then(|document| document.read_first_table())
        .map_err(ods_error)?;
    debug!(path = %path.display(), rows = rows.len(), "read ods table");
    Ok(SheetTable::from_rows(rows))
}

/// Read a CSV or ODS file according to its extension.
pub fn read_table(path: &Path) -> Result<SheetTable> {
    match SourceKind::from_path(path)? {
        SourceKind::Csv => read_csv_table(path),
        SourceKind::Ods => read_ods_table(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_is_case_insensitive() {
        assert_eq!(SourceKind::from_path(Path::new("a/B.ODS")).unwrap(), SourceKind::Ods);
        assert_eq!(SourceKind::from_path(Path::new("b.Csv")).unwrap(), SourceKind::Csv);
        assert!(matches!(
            SourceKind::from_path(Path::new("c.xlsx")),
            Err(IngestError::UnsupportedFile { .. })
        ));
        assert!(SourceKind::from_path(Path::new("noext")).is_err());
    }

    #[test]
    fn header_row_is_split_off() {
        let table = SheetTable::from_rows(vec![
            vec!["\u{feff}Date ".to_string(), "Lab".to_string()],
            vec!["2024-01-01".to_string()],
        ]);
        assert_eq!(table.headers, ["Date", "Lab"]);
        assert_eq!(table.cell(0, 0), "2024-01-01");
        assert_eq!(table.cell(0, 1), "");
        assert_eq!(table.cell(5, 0), "");
    }
}
