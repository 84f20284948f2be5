//! Lab tests for the assessment workflow.
//!
//! The sheet is laid out as `[Date, Lab, biomarker..., Assessment]`. Every
//! row with a date becomes a [`LabTest`]; row order is kept as is.

use tracing::{debug, info};

use bt_core::HeaderParseMode;
use bt_model::{BiomarkerColumn, BiomarkerReading, BiomarkerValue, LabTest};

use crate::error::{IngestError, Result};
use crate::layout::ColumnLayout;
use crate::table::SheetTable;

/// Tests read from a sheet together with the columns they came from.
#[derive(Debug, Clone, PartialEq)]
pub struct LabSheet {
    pub date_column: usize,
    pub lab_column: usize,
    pub assessment_column: usize,
    pub biomarker_columns: Vec<BiomarkerColumn>,
    pub tests: Vec<LabTest>,
}

impl LabSheet {
    /// Tests whose assessment cell is still empty.
    pub fn pending(&self) -> impl Iterator<Item = (usize, &LabTest)> {
        self.tests
            .iter()
            .enumerate()
            .filter(|(_, test)| test.needs_assessment())
    }
}

/// Cells that mean "no value".
pub(crate) fn is_missing_value(value: &str) -> bool {
    value.is_empty() || value == "."
}

/// Load the assessment-path tests from `table`.
pub fn load_lab_sheet(table: &SheetTable, mode: HeaderParseMode) -> Result<LabSheet> {
    if table.headers.is_empty() {
        return Err(IngestError::EmptySheet);
    }
    if table.rows.is_empty() {
        return Err(IngestError::NoDataRows);
    }

    let layout = ColumnLayout::detect(&table.headers);
    let date_column = layout.require_date()?;
    let lab_column = layout.require_lab()?;
    let assessment_column = layout.require_assessment()?;
    let biomarker_columns = layout.assessment_biomarkers(&table.headers, mode)?;
    debug!(
        date_column,
        lab_column,
        assessment_column,
        biomarkers = biomarker_columns.len(),
        "detected sheet layout"
    );

    let mut tests = Vec::new();
    for row in 0..table.rows.len() {
        let date = table.cell(row, date_column);
        if date.is_empty() {
            continue;
        }
        let biomarkers = biomarker_columns
            .iter()
            .filter_map(|column| {
                let value = table.cell(row, column.index);
                (!is_missing_value(value))
                    .then(|| BiomarkerReading::from_header(&column.spec, BiomarkerValue::parse(value)))
            })
            .collect();
        tests.push(LabTest {
            row_index: SheetTable::sheet_row(row),
            date: date.to_string(),
            lab: table.cell(row, lab_column).to_string(),
            biomarkers,
            assessment: table.cell(row, assessment_column).to_string(),
        });
    }
    info!(tests = tests.len(), "loaded lab tests");

    Ok(LabSheet {
        date_column,
        lab_column,
        assessment_column,
        biomarker_columns,
        tests,
    })
}
