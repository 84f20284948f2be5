//! Biomarker header parsing and importance analysis.
//!
//! - [`header`]: `Name {unit} [low-high]` column headers
//! - [`range`]: out-of-range predicate
//! - [`importance`]: the lookback window that picks "important" biomarkers and
//!   their recent history
//! - [`datetime`]: date normalization for the JSON export
//! - [`redact`]: the `--log-data` switch for value logging

pub mod datetime;
mod error;
pub mod header;
pub mod importance;
pub mod range;
pub mod redact;

pub use datetime::{DATE_FORMATS, normalize_date, parse_date, sort_chronologically};
pub use error::{DateError, HeaderError};
pub use header::{HeaderParseMode, parse_header, parse_header_strict, parse_range};
pub use importance::{
    ImportanceContext, ImportanceWindow, LOOKBACK_WINDOW, history_for, important_biomarkers,
};
pub use range::{is_out_of_range, reading_out_of_range};
pub use redact::{REDACTED_VALUE, log_data_enabled, redact_value, set_log_data_enabled};
