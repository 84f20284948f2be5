//! Error types for spreadsheet operations.

use thiserror::Error;

/// Errors that can occur when reading or editing an `.ods` file.
#[derive(Debug, Error)]
pub enum OdsError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not a readable zip archive.
    #[error("archive error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Malformed `content.xml`.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The archive has no `content.xml` entry.
    #[error("spreadsheet has no content.xml")]
    MissingContent,

    /// `content.xml` contains no `table:table` element.
    #[error("spreadsheet contains no table")]
    NoTable,

    /// `content.xml` ended inside a table row.
    #[error("content.xml ended inside row {row}")]
    Truncated { row: usize },

    /// An edit addressed a row the first table does not have.
    #[error("row {row} does not exist in the first table")]
    MissingRow { row: usize },
}

impl From<quick_xml::events::attributes::AttrError> for OdsError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Self::Xml(err.into())
    }
}

/// Result type alias for spreadsheet operations.
pub type Result<T> = std::result::Result<T, OdsError>;
