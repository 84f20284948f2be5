//! Command-line arguments for `bloodwork`.

use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::time::Duration;

use bt_core::HeaderParseMode;
use bt_llm::DEFAULT_MODEL;
use bt_cli::types::{AssessOptions, ConvertOptions, OcrOptions};
use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "bloodwork",
    version,
    about = "Blood test spreadsheet tools: assessments, JSON export and report OCR",
    long_about = "Work with a blood test spreadsheet whose columns are headed \
                  `Name {unit} [low-high]`.\n\n\
                  assess   draft assessments for tests that have none\n\
                  convert  export tests to JSON\n\
                  ocr      read a PDF lab report into a new spreadsheet row"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format.
    #[arg(long = "log-format", value_enum, default_value = "pretty", global = true)]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Include biomarker values in trace logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate assessments for tests whose Assessment cell is empty.
    Assess(AssessArgs),

    /// Convert a CSV or ODS sheet to the JSON export format.
    Convert(ConvertArgs),

    /// OCR a PDF lab report and insert it as a new row.
    Ocr(OcrArgs),
}

#[derive(Parser)]
pub struct AssessArgs {
    /// Spreadsheet with Date, Lab, biomarker and Assessment columns.
    #[arg(value_name = "ODS")]
    pub ods: PathBuf,

    /// Model used for assessments.
    #[arg(long, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Process at most N tests.
    #[arg(long, value_name = "N")]
    pub limit: Option<usize>,

    /// Write placeholder assessments without calling the API.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Reject malformed headers instead of ignoring the bad fragment.
    #[arg(long)]
    pub strict: bool,

    /// Sort tests by date before computing history.
    ///
    /// Row order is otherwise taken as chronological. Any date that does not
    /// parse is an error.
    #[arg(long = "sort-by-date")]
    pub sort_by_date: bool,

    /// Request timeout in seconds.
    #[arg(long, value_name = "SECS", default_value_t = 120)]
    pub timeout: u64,
}

#[derive(Parser)]
pub struct ConvertArgs {
    /// CSV or ODS input.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// JSON output path.
    #[arg(value_name = "OUTPUT", default_value = "data.json")]
    pub output: PathBuf,

    /// Reject malformed headers instead of ignoring the bad fragment.
    #[arg(long)]
    pub strict: bool,
}

#[derive(Parser)]
pub struct OcrArgs {
    /// PDF lab report.
    #[arg(value_name = "PDF")]
    pub pdf: PathBuf,

    /// Spreadsheet that receives the new row; its headers and lab names
    /// steer the extraction.
    #[arg(long, value_name = "ODS")]
    pub ods: PathBuf,

    /// File name prefix for the rendered pages.
    #[arg(long, default_value = "page")]
    pub prefix: String,

    /// Model used for OCR.
    #[arg(long, default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Only render the pages and print their paths.
    #[arg(long = "no-ocr")]
    pub no_ocr: bool,

    /// Also save the extracted JSON here (printed to stdout otherwise).
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Request timeout in seconds.
    #[arg(long, value_name = "SECS", default_value_t = 120)]
    pub timeout: u64,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

fn parse_mode(strict: bool) -> HeaderParseMode {
    if strict {
        HeaderParseMode::Strict
    } else {
        HeaderParseMode::Lenient
    }
}

impl AssessArgs {
    pub fn to_options(&self) -> AssessOptions {
        AssessOptions {
            ods: self.ods.clone(),
            model: Some(self.model.clone()),
            limit: self.limit,
            dry_run: self.dry_run,
            mode: parse_mode(self.strict),
            sort_by_date: self.sort_by_date,
            timeout: Duration::from_secs(self.timeout),
            show_progress: io::stderr().is_terminal(),
        }
    }
}

impl ConvertArgs {
    pub fn to_options(&self) -> ConvertOptions {
        ConvertOptions {
            input: self.input.clone(),
            output: self.output.clone(),
            mode: parse_mode(self.strict),
        }
    }
}

impl OcrArgs {
    pub fn to_options(&self) -> OcrOptions {
        OcrOptions {
            pdf: self.pdf.clone(),
            ods: self.ods.clone(),
            prefix: self.prefix.clone(),
            model: Some(self.model.clone()),
            no_ocr: self.no_ocr,
            output: self.output.clone(),
            timeout: Duration::from_secs(self.timeout),
        }
    }
}
