//! Test records and categories for JSON export.
//!
//! Data rows run until the first row with a cell containing `Categories`.
//! Each later row with at least two non-empty cells maps a category name
//! (first cell) to biomarker names (remaining cells).

use tracing::{debug, info};

use bt_core::{HeaderParseMode, normalize_date};
use bt_model::{BiomarkerReading, BiomarkerValue, Categories, ExportDocument, ExportTest};

use crate::error::{IngestError, Result};
use crate::lab_sheet::is_missing_value;
use crate::layout::ColumnLayout;
use crate::table::SheetTable;

const CATEGORIES_MARKER: &str = "Categories";

/// Build the export document from `table`.
pub fn load_converter_records(table: &SheetTable, mode: HeaderParseMode) -> Result<ExportDocument> {
    if table.headers.is_empty() {
        return Err(IngestError::EmptySheet);
    }
    let layout = ColumnLayout::detect(&table.headers);
    let date_column = layout.require_date()?;
    let lab_column = layout.require_lab()?;
    let columns = layout.converter_biomarkers(&table.headers, mode)?;
    if columns.is_empty() {
        return Err(IngestError::NoBiomarkerColumns);
    }

    let marker = table
        .rows
        .iter()
        .position(|row| row.iter().any(|cell| cell.contains(CATEGORIES_MARKER)));
    let test_rows = marker.unwrap_or(table.rows.len());

    let mut tests = Vec::new();
    for row in 0..test_rows {
        let date = table.cell(row, date_column);
        if date.is_empty() {
            continue;
        }
        let display_row = SheetTable::display_row(row);
        let lab = table.cell(row, lab_column);
        if lab.is_empty() {
            return Err(IngestError::MissingLab { row: display_row });
        }
        let date = normalize_date(date).map_err(|source| IngestError::InvalidDate {
            row: display_row,
            source,
        })?;

        let biomarkers: Vec<_> = columns
            .iter()
            .filter_map(|column| {
                let value = table.cell(row, column.index);
                (!is_missing_value(value))
                    .then(|| BiomarkerReading::from_header(&column.spec, BiomarkerValue::parse(value)))
            })
            .collect();
        if biomarkers.is_empty() {
            debug!(row = display_row, "skipping test without values");
            continue;
        }
        tests.push(ExportTest {
            date,
            lab_name: lab.to_string(),
            biomarkers,
        });
    }

    let mut categories = Categories::default();
    if let Some(marker) = marker {
        for row in &table.rows[marker + 1..] {
            let mut values = row.iter().map(|cell| cell.trim()).filter(|cell| !cell.is_empty());
            let Some(name) = values.next() else {
                continue;
            };
            let members: Vec<String> = values.map(str::to_string).collect();
            if !members.is_empty() {
                categories.insert(name.to_string(), members);
            }
        }
    }

    info!(tests = tests.len(), categories = categories.len(), "extracted export records");
    Ok(ExportDocument::new(tests, categories))
}
