//! OpenDocument spreadsheet (`.ods`) access.
//!
//! Reads cell text from the first table and applies batched edits (cell
//! values, new rows, new columns) that are saved atomically. Formatting and
//! every archive entry other than `content.xml` are preserved.

mod cell;
mod document;
mod edit;
pub mod error;
mod reader;
mod xml;

pub use cell::CellValue;
pub use document::OdsDocument;
pub use edit::{RowCells, TableEdits};
pub use error::{OdsError, Result};
pub use reader::MAX_EXPANDED_REPEAT;
