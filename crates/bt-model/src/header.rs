//! Parsed biomarker column header.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A biomarker column header in the `Name {unit} [low-high]` convention.
///
/// Unit and both bounds are optional. A header with neither bound can never
/// be flagged as out of range.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct HeaderSpec {
    pub name: String,
    pub unit: Option<String>,
    pub low: Option<f64>,
    pub high: Option<f64>,
}

impl HeaderSpec {
    /// Header with a name only.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    #[must_use]
    pub fn with_range(mut self, low: Option<f64>, high: Option<f64>) -> Self {
        self.low = low;
        self.high = high;
        self
    }

    /// Returns true when at least one reference bound is present.
    pub fn has_range(&self) -> bool {
        self.low.is_some() || self.high.is_some()
    }
}

/// Renders the header back into spreadsheet form.
///
/// A lone low bound is written as `low-`, a lone high bound as `-high`.
impl fmt::Display for HeaderSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if let Some(unit) = &self.unit {
            write!(f, " {{{unit}}}")?;
        }
        match (self.low, self.high) {
            (Some(low), Some(high)) => write!(f, " [{low}-{high}]"),
            (Some(low), None) => write!(f, " [{low}-]"),
            (None, Some(high)) => write!(f, " [-{high}]"),
            (None, None) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_full_header() {
        let spec = HeaderSpec::named("Glucose")
            .with_unit("mg/dL")
            .with_range(Some(70.0), Some(100.0));
        assert_eq!(spec.to_string(), "Glucose {mg/dL} [70-100]");
    }

    #[test]
    fn display_partial_ranges() {
        let low_only = HeaderSpec::named("HDL").with_range(Some(40.0), None);
        assert_eq!(low_only.to_string(), "HDL [40-]");
        let high_only = HeaderSpec::named("Ferritin").with_range(None, Some(300.0));
        assert_eq!(high_only.to_string(), "Ferritin [-300]");
        assert_eq!(HeaderSpec::named("CRP").to_string(), "CRP");
        assert!(!HeaderSpec::named("CRP").has_range());
    }
}
