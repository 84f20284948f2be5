//! Blood test data model definitions.
//!
//! Types shared by the parser, the spreadsheet loaders, the report writers
//! and the language-model layer.

pub mod biomarker;
pub mod export;
pub mod header;
pub mod lab_test;
pub mod ocr;

pub use biomarker::{BiomarkerColumn, BiomarkerReading, BiomarkerValue};
pub use export::{Categories, Category, ExportDocument, ExportTest, SCHEMA_VERSION};
pub use header::HeaderSpec;
pub use lab_test::{AssessmentMap, HistoryPoint, LabTest};
pub use ocr::{OcrBiomarker, OcrReport};
