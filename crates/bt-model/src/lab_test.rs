//! Lab visits and derived history.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::biomarker::{BiomarkerReading, BiomarkerValue};

/// Generated assessment text keyed by the sheet row it belongs to.
///
/// Kept apart from [`LabTest`] so the analysed sequence stays immutable until
/// the results are written.
pub type AssessmentMap = BTreeMap<usize, String>;

/// One lab visit or report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabTest {
    /// Zero-based row in the source sheet (the header is row 0).
    pub row_index: usize,
    pub date: String,
    pub lab: String,
    /// Readings in column order.
    pub biomarkers: Vec<BiomarkerReading>,
    pub assessment: String,
}

impl LabTest {
    /// First reading with the given name (exact, case-sensitive).
    pub fn reading(&self, name: &str) -> Option<&BiomarkerReading> {
        self.biomarkers.iter().find(|reading| reading.name == name)
    }

    pub fn needs_assessment(&self) -> bool {
        self.assessment.trim().is_empty()
    }
}

/// A prior value of a biomarker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub date: String,
    pub value: BiomarkerValue,
}
