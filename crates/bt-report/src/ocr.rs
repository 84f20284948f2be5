//! Inserting an OCR result into the lab sheet.
//!
//! The report becomes a new row directly below the header. Biomarkers are
//! matched to existing columns by header text, then by parsed name, ignoring
//! case and surrounding whitespace. Unmatched biomarkers get new columns,
//! titled in the `Name {unit} [low-high]` convention and inserted before the
//! Assessment column (or after the last column when there is none).

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use bt_core::parse_header;
use bt_ingest::{ColumnLayout, SheetTable};
use bt_model::{BiomarkerValue, HeaderSpec, OcrBiomarker, OcrReport};
use bt_ods::{CellValue, OdsDocument, RowCells, TableEdits};

/// Where an OCR report ended up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OcrPlacement {
    /// Biomarkers written into existing columns.
    pub matched: usize,
    /// Header text of the columns that were added.
    pub added: Vec<String>,
    /// Biomarkers with no value.
    pub empty: usize,
}

/// Column a value goes to: an original column index, or a position among
/// the added columns.
enum Target {
    Existing(usize),
    New(usize),
}

fn normalize(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Existing biomarker columns keyed by normalized header and by normalized
/// parsed name. Header matches take precedence.
struct ColumnIndex {
    by_header: BTreeMap<String, usize>,
    by_name: BTreeMap<String, usize>,
}

impl ColumnIndex {
    fn new(headers: &[String], layout: &ColumnLayout) -> Self {
        let mut by_header = BTreeMap::new();
        let mut by_name = BTreeMap::new();
        for (index, header) in headers.iter().enumerate() {
            if header.is_empty() || [layout.date, layout.lab, layout.assessment].contains(&Some(index)) {
                continue;
            }
            by_header.entry(normalize(header)).or_insert(index);
            by_name.entry(normalize(&parse_header(header).name)).or_insert(index);
        }
        Self { by_header, by_name }
    }

    fn find(&self, name: &str) -> Option<usize> {
        let key = normalize(name);
        self.by_header
            .get(&key)
            .or_else(|| self.by_name.get(&key))
            .copied()
    }
}

fn header_for(biomarker: &OcrBiomarker) -> String {
    let mut spec = HeaderSpec::named(biomarker.name.trim()).with_range(
        biomarker.range_lower.as_ref().and_then(BiomarkerValue::as_f64),
        biomarker.range_upper.as_ref().and_then(BiomarkerValue::as_f64),
    );
    if let Some(unit) = biomarker.unit.as_deref().map(str::trim).filter(|unit| !unit.is_empty()) {
        spec = spec.with_unit(unit);
    }
    spec.to_string()
}

fn cell_value(value: &BiomarkerValue) -> CellValue {
    match value {
        BiomarkerValue::Number(number) => CellValue::Float(*number),
        BiomarkerValue::Text(text) => CellValue::infer(text),
    }
}

/// Insert `report` as a new row of the sheet at `path` and save it in place.
pub fn apply_ocr_report(path: &Path, report: &OcrReport) -> Result<OcrPlacement> {
    let mut document =
        OdsDocument::open(path).with_context(|| format!("open {}", path.display()))?;
    let table = SheetTable::from_rows(
        document
            .read_first_table()
            .with_context(|| format!("read {}", path.display()))?,
    );
    if table.headers.is_empty() {
        anyhow::bail!("{} has no header row", path.display());
    }
    let layout = ColumnLayout::detect(&table.headers);
    let date_column = layout.require_date()?;
    let lab_column = layout.require_lab()?;
    let columns = ColumnIndex::new(&table.headers, &layout);

    let mut placement = OcrPlacement::default();
    let mut new_names: BTreeMap<String, usize> = BTreeMap::new();
    let mut targets = Vec::new();
    for biomarker in &report.biomarkers {
        if biomarker.name.trim().is_empty() {
            warn!("skipping OCR biomarker without a name");
            continue;
        }
        let target = match columns.find(&biomarker.name) {
            Some(index) => {
                placement.matched += 1;
                Target::Existing(index)
            }
            None => {
                let key = normalize(&biomarker.name);
                let next = placement.added.len();
                let position = *new_names.entry(key).or_insert_with(|| {
                    placement.added.push(header_for(biomarker));
                    next
                });
                Target::New(position)
            }
        };
        match &biomarker.value {
            Some(value) => targets.push((target, value)),
            None => placement.empty += 1,
        }
    }

    let insert_at = layout.assessment.unwrap_or(table.headers.len());
    let added = placement.added.len();
    let shifted = |index: usize| if index >= insert_at { index + added } else { index };

    let mut edits = TableEdits::new();
    for (offset, header) in placement.added.iter().enumerate() {
        edits.insert_column(insert_at + offset, Some(header.as_str()));
    }

    let mut cells = RowCells::new();
    if let Some(date) = report.date.as_deref() {
        cells.insert(shifted(date_column), CellValue::text(date.trim()));
    }
    if let Some(lab) = report.lab_name.as_deref() {
        cells.insert(shifted(lab_column), CellValue::text(lab.trim()));
    }
    for (target, value) in targets {
        let column = match target {
            Target::Existing(index) => shifted(index),
            Target::New(position) => insert_at + position,
        };
        if cells.insert(column, cell_value(value)).is_some() {
            debug!(column, "OCR value overwrote an earlier value in the same column");
        }
    }
    edits.insert_row_after(0, cells);

    document
        .apply(&edits)
        .with_context(|| format!("insert OCR row into {}", path.display()))?;
    document
        .save(path)
        .with_context(|| format!("save {}", path.display()))?;
    info!(
        path = %path.display(),
        matched = placement.matched,
        added = placement.added.len(),
        "inserted OCR results"
    );
    Ok(placement)
}
