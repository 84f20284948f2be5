//! Writers for everything the workbench produces.
//!
//! - [`write_json_export`]: converter output
//! - [`write_assessments`]: generated text written into the Assessment column
//! - [`apply_ocr_report`]: an OCR result inserted as a new sheet row

pub mod assessments;
pub mod json;
pub mod ocr;

pub use assessments::write_assessments;
pub use json::write_json_export;
pub use ocr::{OcrPlacement, apply_ocr_report};
