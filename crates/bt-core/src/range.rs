//! Reference range checks.

use bt_model::{BiomarkerReading, BiomarkerValue};

/// Returns true when `value` falls outside `[low, high]`.
///
/// Bounds are inclusive. Missing values, text that does not coerce to a
/// number, and columns with no bounds are never out of range.
///
/// ```
/// use bt_core::is_out_of_range;
/// use bt_model::BiomarkerValue;
///
/// let five = BiomarkerValue::Number(5.0);
/// assert!(is_out_of_range(Some(&five), Some(10.0), Some(20.0)));
/// assert!(!is_out_of_range(None, Some(1.0), Some(2.0)));
/// ```
pub fn is_out_of_range(value: Option<&BiomarkerValue>, low: Option<f64>, high: Option<f64>) -> bool {
    let Some(value) = value.and_then(BiomarkerValue::as_f64) else {
        return false;
    };
    if low.is_none() && high.is_none() {
        return false;
    }
    low.is_some_and(|low| value < low) || high.is_some_and(|high| value > high)
}

pub fn reading_out_of_range(reading: &BiomarkerReading) -> bool {
    is_out_of_range(Some(&reading.value), reading.low, reading.high)
}
