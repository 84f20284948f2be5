//! Error types for sheet ingestion.

use std::path::PathBuf;

use thiserror::Error;

use bt_core::{DateError, HeaderError};
use bt_ods::OdsError;

/// Errors that can occur while reading a sheet or extracting tests from it.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Input extension is neither `.csv` nor `.ods`.
    #[error("unsupported file type '{extension}' for {path}: use CSV or ODS")]
    UnsupportedFile { path: PathBuf, extension: String },

    #[error("failed to read CSV {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("failed to read spreadsheet {path}: {source}")]
    Ods {
        path: PathBuf,
        #[source]
        source: OdsError,
    },

    /// The sheet has no header row.
    #[error("sheet has no header row")]
    EmptySheet,

    /// The sheet has a header but no data rows.
    #[error("sheet has no data rows")]
    NoDataRows,

    /// A required column was not found in the header.
    #[error("no '{column}' column found in header")]
    MissingColumn { column: &'static str },

    #[error("no valid biomarker columns found in header")]
    NoBiomarkerColumns,

    /// A test row has a date but no lab name. Rows are 1-based sheet rows.
    #[error("missing lab name in row {row}")]
    MissingLab { row: usize },

    #[error("invalid date in row {row}: {source}")]
    InvalidDate {
        row: usize,
        #[source]
        source: DateError,
    },

    /// Header rejected in strict mode.
    #[error("invalid header in column {column}: {source}")]
    InvalidHeader {
        column: usize,
        #[source]
        source: HeaderError,
    },
}

/// Result type alias for ingestion.
pub type Result<T> = std::result::Result<T, IngestError>;
