//! Tabular blood test sources.
//!
//! Reads CSV files and the first table of ODS files into a [`SheetTable`],
//! detects the Date, Lab and Assessment columns, and extracts either
//! [`LabSheet`] tests (assessment workflow) or an export document
//! (converter workflow).

mod converter;
pub mod error;
mod known;
mod lab_sheet;
mod layout;
mod table;

pub use converter::load_converter_records;
pub use error::{IngestError, Result};
pub use known::{known_biomarker_headers, known_lab_names};
pub use lab_sheet::{LabSheet, load_lab_sheet};
pub use layout::ColumnLayout;
pub use table::{SheetTable, SourceKind, read_csv_table, read_ods_table, read_table};
