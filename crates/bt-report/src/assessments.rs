//! Assessment write-back.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info};

use bt_model::AssessmentMap;
use bt_ods::{CellValue, OdsDocument, TableEdits};

/// Write each assessment into `column` of its sheet row and save the file in
/// place. Returns the number of cells written.
///
/// All cells are written in one edit; if anything fails the file on disk is
/// left as it was.
pub fn write_assessments(path: &Path, column: usize, assessments: &AssessmentMap) -> Result<usize> {
    if assessments.is_empty() {
        debug!(path = %path.display(), "no assessments to write");
        return Ok(0);
    }
    let mut document =
        OdsDocument::open(path).with_context(|| format!("open {}", path.display()))?;
    let mut edits = TableEdits::new();
    for (row, text) in assessments {
        edits.set_cell(*row, column, CellValue::text(text.as_str()));
    }
    document
        .apply(&edits)
        .with_context(|| format!("update assessments in {}", path.display()))?;
    document
        .save(path)
        .with_context(|| format!("save {}", path.display()))?;
    info!(path = %path.display(), written = assessments.len(), "wrote assessments");
    Ok(assessments.len())
}
