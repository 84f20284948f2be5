use std::path::PathBuf;
use std::time::Duration;

use bt_core::HeaderParseMode;
use bt_llm::PageImages;
use bt_model::OcrReport;
use bt_report::OcrPlacement;

#[derive(Debug, Clone)]
pub struct AssessOptions {
    pub ods: PathBuf,
    /// Overrides the configured model.
    pub model: Option<String>,
    /// Process at most this many pending tests.
    pub limit: Option<usize>,
    pub dry_run: bool,
    pub mode: HeaderParseMode,
    pub sort_by_date: bool,
    pub timeout: Duration,
    pub show_progress: bool,
}

#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub input: PathBuf,
    pub output: PathBuf,
    pub mode: HeaderParseMode,
}

#[derive(Debug, Clone)]
pub struct OcrOptions {
    pub pdf: PathBuf,
    pub ods: PathBuf,
    pub prefix: String,
    pub model: Option<String>,
    /// Stop after rasterizing.
    pub no_ocr: bool,
    pub output: Option<PathBuf>,
    pub timeout: Duration,
}

/// What happened to one pending test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssessmentStatus {
    Written { characters: usize },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestOutcome {
    /// Sheet row, header is row 0.
    pub row: usize,
    pub date: String,
    pub important: usize,
    pub status: AssessmentStatus,
}

#[derive(Debug)]
pub struct AssessResult {
    pub ods: PathBuf,
    pub total_tests: usize,
    pub biomarker_columns: usize,
    pub pending: usize,
    pub dry_run: bool,
    pub outcomes: Vec<TestOutcome>,
    pub written: usize,
}

impl AssessResult {
    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|outcome| matches!(outcome.status, AssessmentStatus::Failed { .. }))
            .count()
    }
}

#[derive(Debug)]
pub struct ConvertResult {
    pub input: PathBuf,
    pub output: PathBuf,
    pub tests: usize,
    pub readings: usize,
    pub biomarkers: usize,
    pub categories: usize,
}

#[derive(Debug)]
pub enum OcrOutcome {
    /// `--no-ocr`: only the rendered pages.
    Images(PageImages),
    Inserted {
        ods: PathBuf,
        report: OcrReport,
        placement: OcrPlacement,
        /// Where the extracted JSON was saved, if requested.
        output: Option<PathBuf>,
    },
}
