//! Structured result of OCR on a scanned lab report.

use serde::{Deserialize, Serialize};

use crate::biomarker::BiomarkerValue;

/// Lab name, date and biomarkers extracted from report images.
///
/// Every field is optional on input; models use `null` for anything they
/// could not read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OcrReport {
    #[serde(default)]
    pub lab_name: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub biomarkers: Vec<OcrBiomarker>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrBiomarker {
    pub name: String,
    #[serde(default)]
    pub value: Option<BiomarkerValue>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub range_lower: Option<BiomarkerValue>,
    #[serde(default)]
    pub range_upper: Option<BiomarkerValue>,
}
