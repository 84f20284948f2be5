//! `assess`, `convert` and `ocr` runners.

use std::collections::BTreeSet;
use std::fs;

use anyhow::{Context, Result, bail};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, info_span, trace, warn};

use bt_core::{redact_value, sort_chronologically};
use bt_ingest::{
    SourceKind, known_biomarker_headers, known_lab_names, load_converter_records, load_lab_sheet,
    read_ods_table, read_table,
};
use bt_llm::{
    AnthropicClient, Assessor, AssistantConfig, CompletionBackend, OcrExtractor, rasterize_pdf,
};
use bt_model::{AssessmentMap, LabTest, OcrReport};
use bt_report::{apply_ocr_report, write_assessments, write_json_export};

use crate::types::{
    AssessOptions, AssessResult, AssessmentStatus, ConvertOptions, ConvertResult, OcrOptions,
    OcrOutcome, TestOutcome,
};

const PROGRESS_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} tests {msg}";

fn assistant_config(model: Option<&str>, timeout: std::time::Duration) -> AssistantConfig {
    let config = AssistantConfig::from_env().with_timeout(timeout);
    match model {
        Some(model) => config.with_model(model),
        None => config,
    }
}

fn progress_bar(length: usize, visible: bool) -> Result<ProgressBar> {
    if !visible {
        return Ok(ProgressBar::hidden());
    }
    let bar = ProgressBar::new(length as u64);
    bar.set_style(
        ProgressStyle::default_bar()
            .template(PROGRESS_TEMPLATE)
            .context("progress bar template")?
            .progress_chars("#>-"),
    );
    Ok(bar)
}

/// Assess each test in `pending` (indices into `tests`) and collect the
/// text by sheet row. A failed test is logged and skipped.
pub fn assess_pending<B: CompletionBackend>(
    assessor: &Assessor<B>,
    tests: &[LabTest],
    pending: &[usize],
    progress: &ProgressBar,
) -> (AssessmentMap, Vec<TestOutcome>) {
    let window = assessor.window();
    let mut assessments = AssessmentMap::new();
    let mut outcomes = Vec::with_capacity(pending.len());
    for &index in pending {
        let test = &tests[index];
        progress.set_message(test.date.clone());
        let important = window.important_biomarkers(tests, index).len();
        let status = match assessor.assess(tests, index) {
            Ok(text) => {
                let characters = text.chars().count();
                info!(row = test.row_index, date = %test.date, characters, "assessment generated");
                assessments.insert(test.row_index, text);
                AssessmentStatus::Written { characters }
            }
            Err(error) => {
                warn!(row = test.row_index, date = %test.date, %error, "failed to generate assessment");
                AssessmentStatus::Failed {
                    reason: error.to_string(),
                }
            }
        };
        outcomes.push(TestOutcome {
            row: test.row_index,
            date: test.date.clone(),
            important,
            status,
        });
        progress.inc(1);
    }
    progress.finish_and_clear();
    (assessments, outcomes)
}

pub fn run_assess(options: &AssessOptions) -> Result<AssessResult> {
    let span = info_span!("assess", ods = %options.ods.display());
    let _guard = span.enter();

    if SourceKind::from_path(&options.ods)? != SourceKind::Ods {
        bail!(
            "assessments are written back to the spreadsheet; {} is not an .ods file",
            options.ods.display()
        );
    }
    let table = read_ods_table(&options.ods)?;
    let mut sheet = load_lab_sheet(&table, options.mode)
        .with_context(|| format!("load tests from {}", options.ods.display()))?;
    info!(
        tests = sheet.tests.len(),
        biomarker_columns = sheet.biomarker_columns.len(),
        "loaded lab sheet"
    );
    let assessment_column = sheet.assessment_column;
    let biomarker_columns = sheet.biomarker_columns.len();
    if options.sort_by_date {
        sheet.tests = sort_chronologically(sheet.tests).context("sort tests by date")?;
    }

    let mut pending: Vec<usize> = sheet.pending().map(|(index, _)| index).collect();
    let tests = sheet.tests;
    let pending_total = pending.len();
    if let Some(limit) = options.limit.filter(|limit| *limit > 0) {
        pending.truncate(limit);
        info!(limit, processing = pending.len(), "limiting tests");
    }

    let mut result = AssessResult {
        ods: options.ods.clone(),
        total_tests: tests.len(),
        biomarker_columns,
        pending: pending_total,
        dry_run: options.dry_run,
        outcomes: Vec::new(),
        written: 0,
    };
    if pending.is_empty() {
        info!("all tests already have assessments");
        return Ok(result);
    }

    let progress = progress_bar(pending.len(), options.show_progress)?;
    let (assessments, outcomes) = if options.dry_run {
        assess_pending(&Assessor::<AnthropicClient>::dry_run(), &tests, &pending, &progress)
    } else {
        let config = assistant_config(options.model.as_deref(), options.timeout);
        let client = AnthropicClient::new(&config)?;
        info!(model = %config.model, pending = pending.len(), "generating assessments");
        assess_pending(&Assessor::new(client, &config), &tests, &pending, &progress)
    };
    result.outcomes = outcomes;

    if assessments.is_empty() {
        warn!("no assessments were generated");
        return Ok(result);
    }
    result.written = write_assessments(&options.ods, assessment_column, &assessments)?;
    Ok(result)
}

pub fn run_convert(options: &ConvertOptions) -> Result<ConvertResult> {
    let span = info_span!("convert", input = %options.input.display());
    let _guard = span.enter();

    let table = read_table(&options.input)?;
    let document = load_converter_records(&table, options.mode)
        .with_context(|| format!("convert {}", options.input.display()))?;
    write_json_export(&document, &options.output)?;

    let biomarkers: BTreeSet<&str> = document
        .tests
        .iter()
        .flat_map(|test| test.biomarkers.iter().map(|reading| reading.name.as_str()))
        .collect();
    Ok(ConvertResult {
        input: options.input.clone(),
        output: options.output.clone(),
        tests: document.tests.len(),
        readings: document.tests.iter().map(|test| test.biomarkers.len()).sum(),
        biomarkers: biomarkers.len(),
        categories: document.categories.len(),
    })
}

fn log_report_values(report: &OcrReport) {
    for biomarker in &report.biomarkers {
        let value = biomarker
            .value
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default();
        trace!(name = %biomarker.name, value = redact_value(&value), "OCR biomarker");
    }
}

pub fn run_ocr(options: &OcrOptions) -> Result<OcrOutcome> {
    let span = info_span!("ocr", pdf = %options.pdf.display());
    let _guard = span.enter();

    let table = read_ods_table(&options.ods)?;
    let biomarker_names = known_biomarker_headers(&table);
    let lab_names = known_lab_names(&table);
    info!(
        biomarkers = biomarker_names.len(),
        labs = lab_names.len(),
        "read known names"
    );

    let images = rasterize_pdf(&options.pdf, &options.prefix)?;
    if options.no_ocr {
        return Ok(OcrOutcome::Images(images));
    }

    let config = assistant_config(options.model.as_deref(), options.timeout);
    let extractor = OcrExtractor::new(AnthropicClient::new(&config)?, &config);
    let report = extractor
        .extract_report(&images.pages, &biomarker_names, &lab_names)
        .context("OCR failed")?;
    log_report_values(&report);

    // Written before the sheet is edited.
    if let Some(output) = &options.output {
        let json = serde_json::to_string_pretty(&report).context("serialize OCR report")?;
        fs::write(output, json).with_context(|| format!("write {}", output.display()))?;
        info!(path = %output.display(), "saved OCR results");
    }

    let placement = apply_ocr_report(&options.ods, &report)?;
    Ok(OcrOutcome::Inserted {
        ods: options.ods.clone(),
        report,
        placement,
        output: options.output.clone(),
    })
}
