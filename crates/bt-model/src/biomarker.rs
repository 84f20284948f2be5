//! Biomarker values, readings and column descriptors.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::header::HeaderSpec;

/// A measured value.
///
/// Cells that do not parse as a number are kept verbatim rather than
/// discarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BiomarkerValue {
    Number(f64),
    Text(String),
}

impl BiomarkerValue {
    /// Parse a trimmed cell, falling back to the text when it is not a
    /// finite number.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.parse::<f64>() {
            Ok(number) if number.is_finite() => Self::Number(number),
            _ => Self::Text(trimmed.to_string()),
        }
    }

    /// Numeric view of the value, coercing text when possible.
    ///
    /// Text such as `inf` coerces to a non-finite number; `NaN` compares
    /// false against both bounds and is never out of range.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(number) => Some(*number),
            Self::Text(text) => text.trim().parse::<f64>().ok(),
        }
    }
}

impl fmt::Display for BiomarkerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(number) => write!(f, "{number}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

/// One biomarker's value within one test.
///
/// Unit and bounds are copied from the column header at read time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiomarkerReading {
    pub name: String,
    pub value: BiomarkerValue,
    pub unit: Option<String>,
    pub low: Option<f64>,
    pub high: Option<f64>,
}

impl BiomarkerReading {
    pub fn from_header(spec: &HeaderSpec, value: BiomarkerValue) -> Self {
        Self {
            name: spec.name.clone(),
            value,
            unit: spec.unit.clone(),
            low: spec.low,
            high: spec.high,
        }
    }

    /// Reading without unit or reference range.
    pub fn bare(name: impl Into<String>, value: BiomarkerValue) -> Self {
        Self {
            name: name.into(),
            value,
            unit: None,
            low: None,
            high: None,
        }
    }

    #[must_use]
    pub fn with_range(mut self, low: Option<f64>, high: Option<f64>) -> Self {
        self.low = low;
        self.high = high;
        self
    }
}

/// A biomarker header together with the sheet column it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct BiomarkerColumn {
    pub index: usize,
    pub spec: HeaderSpec,
}
