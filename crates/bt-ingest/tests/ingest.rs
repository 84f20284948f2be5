//! Tests for sheet loading and record extraction.

use std::fs;
use std::path::PathBuf;

use bt_core::HeaderParseMode;
use bt_ingest::{
    IngestError, SheetTable, known_biomarker_headers, known_lab_names, load_converter_records,
    load_lab_sheet, read_table,
};
use bt_model::BiomarkerValue;
use bt_ods::{CellValue, OdsDocument};
use tempfile::TempDir;

fn write_csv(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write csv");
    path
}

fn table(rows: &[&[&str]]) -> SheetTable {
    SheetTable::from_rows(
        rows.iter()
            .map(|row| row.iter().map(|cell| (*cell).to_string()).collect())
            .collect(),
    )
}

#[test]
fn csv_rows_keep_sheet_positions() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_csv(
        &dir,
        "labs.csv",
        "\u{feff}Date,Lab,Glucose {mg/dL} [70-100]\n2024-01-01, Quest ,92\n,,\n2024-02-01,Quest\n",
    );
    let table = read_table(&path).expect("read csv");
    assert_eq!(table.headers, ["Date", "Lab", "Glucose {mg/dL} [70-100]"]);
    assert_eq!(table.rows.len(), 3);
    assert_eq!(table.cell(0, 1), "Quest");
    assert_eq!(table.cell(2, 2), "");
}

#[test]
fn unsupported_extension_is_rejected() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_csv(&dir, "labs.xlsx", "Date,Lab\n");
    assert!(matches!(
        read_table(&path),
        Err(IngestError::UnsupportedFile { .. })
    ));
}

#[test]
fn lab_sheet_reads_biomarkers_between_lab_and_assessment() {
    let sheet = table(&[
        &["Date", "Lab", "Glucose {mg/dL} [70-100]", "", "Notes", "Assessment", "Extra"],
        &["2024-01-10", "Quest", "92", "x", "fasting", "", "ignored"],
        &["", "Quest", "100", "", "", "", ""],
        &["2024-02-10", "Quest", ".", "", "", "Fine.", ""],
    ]);
    let loaded = load_lab_sheet(&sheet, HeaderParseMode::Lenient).expect("load");
    assert_eq!(loaded.assessment_column, 5);
    let names: Vec<_> = loaded
        .biomarker_columns
        .iter()
        .map(|column| column.spec.name.as_str())
        .collect();
    assert_eq!(names, ["Glucose", "Notes"]);

    assert_eq!(loaded.tests.len(), 2);
    let first = &loaded.tests[0];
    assert_eq!(first.row_index, 1);
    assert_eq!(first.biomarkers[0].value, BiomarkerValue::Number(92.0));
    assert_eq!(first.biomarkers[0].high, Some(100.0));
    assert_eq!(
        first.biomarkers[1].value,
        BiomarkerValue::Text("fasting".to_string())
    );

    let second = &loaded.tests[1];
    assert_eq!(second.row_index, 3);
    assert!(second.biomarkers.is_empty());
    assert_eq!(second.assessment, "Fine.");
    assert_eq!(loaded.pending().map(|(index, _)| index).collect::<Vec<_>>(), [0]);
}

#[test]
fn lab_sheet_requires_assessment_column() {
    let sheet = table(&[&["Date", "Lab", "Glucose"], &["2024-01-10", "Quest", "92"]]);
    let err = load_lab_sheet(&sheet, HeaderParseMode::Lenient).unwrap_err();
    assert!(matches!(
        err,
        IngestError::MissingColumn {
            column: "Assessment"
        }
    ));
    assert_eq!(err.to_string(), "no 'Assessment' column found in header");
}

#[test]
fn lab_sheet_needs_a_data_row() {
    let sheet = table(&[&["Date", "Lab", "Assessment"]]);
    assert!(matches!(
        load_lab_sheet(&sheet, HeaderParseMode::Lenient),
        Err(IngestError::NoDataRows)
    ));
    assert!(matches!(
        load_lab_sheet(&SheetTable::default(), HeaderParseMode::Lenient),
        Err(IngestError::EmptySheet)
    ));
}

#[test]
fn strict_mode_rejects_bad_headers() {
    let sheet = table(&[
        &["Date", "Lab", "LDL {mg/dL} [abc-130]", "Assessment"],
        &["2024-01-10", "Quest", "99", ""],
    ]);
    assert!(load_lab_sheet(&sheet, HeaderParseMode::Lenient).is_ok());
    assert!(matches!(
        load_lab_sheet(&sheet, HeaderParseMode::Strict),
        Err(IngestError::InvalidHeader { column: 2, .. })
    ));
}

#[test]
fn converter_normalizes_dates_and_reads_categories() {
    let sheet = table(&[
        &["Date", "Lab", "Glucose {mg/dL} [70-100]", "TSH [0.4-4.0]"],
        &["01/02/2024", "Quest", "92", "2.1"],
        &["2024-03-01", "Quest", "", "."],
        &["", "", "", ""],
        &["Categories", "", "", ""],
        &["Metabolic", "Glucose", "", ""],
        &["Lonely", "", "", ""],
        &["Thyroid", "TSH", "", ""],
    ]);
    let document = load_converter_records(&sheet, HeaderParseMode::Lenient).expect("convert");
    assert_eq!(document.tests.len(), 1);
    assert_eq!(document.tests[0].date, "2024-02-01");
    assert_eq!(document.tests[0].lab_name, "Quest");
    assert_eq!(document.tests[0].biomarkers.len(), 2);

    let names: Vec<_> = document
        .categories
        .iter()
        .map(|category| category.name.as_str())
        .collect();
    assert_eq!(names, ["Metabolic", "Thyroid"]);
    assert_eq!(document.categories.get("Thyroid"), Some(&["TSH".to_string()][..]));
}

#[test]
fn converter_reports_row_numbers() {
    let sheet = table(&[
        &["Date", "Lab", "Glucose"],
        &["2024-01-01", "Quest", "92"],
        &["2024-02-01", "", "95"],
    ]);
    let err = load_converter_records(&sheet, HeaderParseMode::Lenient).unwrap_err();
    assert!(matches!(err, IngestError::MissingLab { row: 3 }));

    let sheet = table(&[&["Date", "Lab", "Glucose"], &["someday", "Quest", "92"]]);
    let err = load_converter_records(&sheet, HeaderParseMode::Lenient).unwrap_err();
    assert!(matches!(err, IngestError::InvalidDate { row: 2, .. }));
    assert_eq!(
        err.to_string(),
        "invalid date in row 2: unable to parse date: 'someday'"
    );
}

#[test]
fn converter_needs_biomarker_columns() {
    let sheet = table(&[&["Date", "Lab", "Assessment"], &["2024-01-01", "Quest", ""]]);
    assert!(matches!(
        load_converter_records(&sheet, HeaderParseMode::Lenient),
        Err(IngestError::NoBiomarkerColumns)
    ));
}

#[test]
fn ods_source_feeds_known_names() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("labs.ods");
    let rows: Vec<Vec<CellValue>> = [
        ["Date", "Lab", "Glucose {mg/dL} [70-100]", "Assessment"],
        ["2024-01-10", "Quest", "92", ""],
        ["2024-02-10", "Labcorp", "95", ""],
        ["2024-03-10", "Quest", "97", ""],
        ["", "", "", ""],
        ["2024-04-10", "Hidden", "91", ""],
    ]
    .iter()
    .map(|row| row.iter().map(|cell| CellValue::infer(cell)).collect())
    .collect();
    OdsDocument::create(&path, &rows).expect("create ods");

    let sheet = read_table(&path).expect("read ods");
    assert_eq!(known_biomarker_headers(&sheet), ["Glucose {mg/dL} [70-100]"]);
    let labs: Vec<_> = known_lab_names(&sheet).into_iter().collect();
    assert_eq!(labs, ["Labcorp", "Quest"]);
}
