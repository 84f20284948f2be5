use anyhow::{Context, Result};
use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use bt_cli::types::{AssessResult, AssessmentStatus, ConvertResult, OcrOutcome, TestOutcome};

pub fn print_assess_summary(result: &AssessResult) {
    println!("Spreadsheet: {}", result.ods.display());
    println!(
        "Tests: {} ({} biomarker columns), pending: {}",
        result.total_tests, result.biomarker_columns, result.pending
    );
    if result.outcomes.is_empty() {
        println!("All tests already have assessments. Nothing to do.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Row"),
        header_cell("Date"),
        header_cell("Important"),
        header_cell("Result"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    for outcome in &result.outcomes {
        table.add_row(outcome_row(outcome, result.dry_run));
    }
    println!("{table}");
    let failed = result.failed();
    if failed > 0 {
        println!("{failed} test(s) failed; rerun to retry them.");
    }
    println!("Wrote {} assessment(s) to {}", result.written, result.ods.display());
}

fn outcome_row(outcome: &TestOutcome, dry_run: bool) -> Vec<Cell> {
    let status = match &outcome.status {
        AssessmentStatus::Written { characters } if dry_run => {
            Cell::new(format!("dry run ({characters} chars)")).fg(Color::Yellow)
        }
        AssessmentStatus::Written { characters } => {
            Cell::new(format!("written ({characters} chars)")).fg(Color::Green)
        }
        AssessmentStatus::Failed { reason } => Cell::new(format!("failed: {reason}")).fg(Color::Red),
    };
    vec![
        Cell::new(outcome.row + 1),
        Cell::new(&outcome.date),
        count_cell(outcome.important),
        status,
    ]
}

pub fn print_convert_summary(result: &ConvertResult) {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Input"), header_cell("Output")]);
    apply_summary_table_style(&mut table);
    table.add_row(vec![
        Cell::new(result.input.display()),
        Cell::new(result.output.display()),
    ]);
    println!("{table}");
    println!(
        "{} test(s), {} reading(s), {} distinct biomarker(s), {} categor{}",
        result.tests,
        result.readings,
        result.biomarkers,
        result.categories,
        if result.categories == 1 { "y" } else { "ies" }
    );
}

/// Prints page paths for `--no-ocr`; otherwise the placement table and,
/// without `--output`, the extracted JSON.
pub fn print_ocr_summary(outcome: &OcrOutcome) -> Result<()> {
    match outcome {
        OcrOutcome::Images(images) => {
            println!("{}", images.dir.display());
            for page in &images.pages {
                println!("{}", page.display());
            }
        }
        OcrOutcome::Inserted {
            ods,
            report,
            placement,
            output,
        } => {
            let mut table = Table::new();
            table.set_header(vec![header_cell("Column"), header_cell("Status")]);
            apply_summary_table_style(&mut table);
            for header in &placement.added {
                table.add_row(vec![Cell::new(header), Cell::new("added").fg(Color::Yellow)]);
            }
            table.add_row(vec![
                Cell::new("matched existing columns").add_attribute(Attribute::Bold),
                count_cell(placement.matched),
            ]);
            table.add_row(vec![
                Cell::new("biomarkers without a value").add_attribute(Attribute::Bold),
                count_cell(placement.empty),
            ]);
            eprintln!("{table}");
            eprintln!("Inserted a row into {}", ods.display());
            match output {
                Some(path) => eprintln!("OCR results also saved to {}", path.display()),
                None => {
                    let json = serde_json::to_string_pretty(report)
                        .context("serialize OCR report")?;
                    println!("{json}");
                }
            }
        }
    }
    Ok(())
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label).add_attribute(Attribute::Bold).fg(Color::Cyan)
}

fn count_cell(count: usize) -> Cell {
    if count == 0 {
        Cell::new(count).add_attribute(Attribute::Dim)
    } else {
        Cell::new(count)
    }
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}
