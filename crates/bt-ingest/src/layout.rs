//! Column role detection.

use tracing::warn;

use bt_core::HeaderParseMode;
use bt_model::BiomarkerColumn;

use crate::error::{IngestError, Result};

/// Positions of the Date, Lab and Assessment columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnLayout {
    pub date: Option<usize>,
    pub lab: Option<usize>,
    pub assessment: Option<usize>,
}

impl ColumnLayout {
    /// Case-insensitive substring detection; the first matching header wins
    /// each role and one header fills at most one role.
    pub fn detect(headers: &[String]) -> Self {
        let mut layout = Self::default();
        for (index, header) in headers.iter().enumerate() {
            let lower = header.to_lowercase();
            if layout.date.is_none() && lower.contains("date") {
                layout.date = Some(index);
            } else if layout.lab.is_none() && lower.contains("lab") {
                layout.lab = Some(index);
            } else if layout.assessment.is_none() && lower.contains("assessment") {
                layout.assessment = Some(index);
            }
        }
        layout
    }

    pub fn require_date(&self) -> Result<usize> {
        self.date.ok_or(IngestError::MissingColumn { column: "Date" })
    }

    pub fn require_lab(&self) -> Result<usize> {
        self.lab.ok_or(IngestError::MissingColumn { column: "Lab" })
    }

    pub fn require_assessment(&self) -> Result<usize> {
        self.assessment
            .ok_or(IngestError::MissingColumn { column: "Assessment" })
    }

    fn is_role(&self, index: usize) -> bool {
        [self.date, self.lab, self.assessment].contains(&Some(index))
    }

    /// Biomarker columns strictly between Lab and Assessment.
    pub fn assessment_biomarkers(&self, headers: &[String], mode: HeaderParseMode) -> Result<Vec<BiomarkerColumn>> {
        let lab = self.require_lab()?;
        let assessment = self.require_assessment()?;
        let range = (lab + 1)..assessment.max(lab + 1);
        parse_columns(range.map(|index| (index, &headers[index])), mode)
    }

    /// Every non-role column.
    pub fn converter_biomarkers(&self, headers: &[String], mode: HeaderParseMode) -> Result<Vec<BiomarkerColumn>> {
        let candidates = headers
            .iter()
            .enumerate()
            .filter(|(index, _)| !self.is_role(*index));
        parse_columns(candidates, mode)
    }
}

fn parse_columns<'a>(
    candidates: impl Iterator<Item = (usize, &'a String)>,
    mode: HeaderParseMode,
) -> Result<Vec<BiomarkerColumn>> {
    let mut columns = Vec::new();
    for (index, raw) in candidates {
        if raw.trim().is_empty() {
            continue;
        }
        let spec = mode
            .parse(raw)
            .map_err(|source| IngestError::InvalidHeader { column: index, source })?;
        if spec.name.is_empty() {
            warn!(column = index, header = %raw, "skipping header without a name");
            continue;
        }
        columns.push(BiomarkerColumn { index, spec });
    }
    Ok(columns)
}
