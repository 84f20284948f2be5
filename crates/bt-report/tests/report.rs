//! Tests for the output writers.

use std::fs;
use std::path::{Path, PathBuf};

use bt_model::{
    AssessmentMap, BiomarkerReading, BiomarkerValue, Categories, ExportDocument, ExportTest,
    OcrBiomarker, OcrReport,
};
use bt_ods::{CellValue, OdsDocument};
use bt_report::{OcrPlacement, apply_ocr_report, write_assessments, write_json_export};
use tempfile::TempDir;

fn create_sheet(dir: &TempDir, rows: &[&[&str]]) -> PathBuf {
    let path = dir.path().join("labs.ods");
    let rows: Vec<Vec<CellValue>> = rows
        .iter()
        .map(|row| row.iter().map(|cell| CellValue::infer(cell)).collect())
        .collect();
    OdsDocument::create(&path, &rows).expect("create sheet");
    path
}

fn read_rows(path: &Path) -> Vec<Vec<String>> {
    OdsDocument::open(path)
        .and_then(|document| document.read_first_table())
        .expect("read sheet")
}

fn ocr_biomarker(name: &str, value: Option<f64>) -> OcrBiomarker {
    OcrBiomarker {
        name: name.to_string(),
        value: value.map(BiomarkerValue::Number),
        unit: None,
        range_lower: None,
        range_upper: None,
    }
}

#[test]
fn json_export_is_pretty_and_keeps_unicode() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("data.json");
    let mut categories = Categories::default();
    categories.insert("Kidney".to_string(), vec!["Creatinine".to_string()]);
    let reading = BiomarkerReading {
        name: "Creatinine".to_string(),
        value: BiomarkerValue::Number(71.0),
        unit: Some("µmol/L".to_string()),
        low: Some(45.0),
        high: Some(90.0),
    };
    let document = ExportDocument::new(
        vec![ExportTest {
            date: "2024-02-01".to_string(),
            lab_name: "Quest".to_string(),
            biomarkers: vec![reading],
        }],
        categories,
    );
    write_json_export(&document, &path).expect("write json");

    let text = fs::read_to_string(&path).expect("read json");
    assert!(text.contains("µmol/L"));
    assert!(text.starts_with("{\n  \"schemaVersion\": 1,"));
    let value: serde_json::Value = serde_json::from_str(&text).expect("parse json");
    assert_eq!(value["tests"][0]["labName"], "Quest");
    assert_eq!(value["tests"][0]["biomarkers"][0]["value"], 71.0);
    assert_eq!(value["categories"]["Kidney"][0], "Creatinine");
}

#[test]
fn assessments_land_in_their_rows() {
    let dir = TempDir::new().expect("temp dir");
    let path = create_sheet(
        &dir,
        &[
            &["Date", "Lab", "Glucose", "Assessment"],
            &["2024-01-10", "Quest", "92"],
            &["2024-02-10", "Quest", "95", "Existing."],
            &["2024-03-10", "Quest", "140"],
        ],
    );
    let mut assessments = AssessmentMap::new();
    assessments.insert(1, "Normal glucose.".to_string());
    assessments.insert(3, "Glucose elevated.\nRecheck fasting.".to_string());

    let written = write_assessments(&path, 3, &assessments).expect("write assessments");
    assert_eq!(written, 2);

    let rows = read_rows(&path);
    assert_eq!(rows[1][3], "Normal glucose.");
    assert_eq!(rows[2][3], "Existing.");
    assert_eq!(rows[3][3], "Glucose elevated.\nRecheck fasting.");
}

#[test]
fn empty_assessment_map_leaves_file_alone() {
    let dir = TempDir::new().expect("temp dir");
    let path = create_sheet(&dir, &[&["Date", "Lab", "Assessment"], &["2024-01-10", "Quest"]]);
    let before = fs::read(&path).expect("read before");
    assert_eq!(write_assessments(&path, 2, &AssessmentMap::new()).expect("write"), 0);
    assert_eq!(fs::read(&path).expect("read after"), before);
}

#[test]
fn assessment_rows_past_the_end_fail_without_writing() {
    let dir = TempDir::new().expect("temp dir");
    let path = create_sheet(&dir, &[&["Date", "Lab", "Assessment"], &["2024-01-10", "Quest"]]);
    let before = fs::read(&path).expect("read before");
    let mut assessments = AssessmentMap::new();
    assessments.insert(5, "Nowhere.".to_string());
    assert!(write_assessments(&path, 2, &assessments).is_err());
    assert_eq!(fs::read(&path).expect("read after"), before);
}

#[test]
fn ocr_row_goes_below_header_with_new_columns_before_assessment() {
    let dir = TempDir::new().expect("temp dir");
    let path = create_sheet(
        &dir,
        &[
            &["Date", "Lab", "Glucose {mg/dL} [70-100]", "TSH [0.4-4.0]", "Assessment"],
            &["2024-01-10", "Quest", "92", "2.1", "Fine."],
        ],
    );
    let mut ferritin = ocr_biomarker("Ferritin", Some(310.0));
    ferritin.unit = Some("ng/mL".to_string());
    ferritin.range_upper = Some(BiomarkerValue::Number(300.0));
    let report = OcrReport {
        lab_name: Some("Labcorp".to_string()),
        date: Some("2024-03-05".to_string()),
        biomarkers: vec![
            ocr_biomarker(" glucose ", Some(101.0)),
            ocr_biomarker("tsh [0.4-4.0]", Some(1.8)),
            ferritin,
            ocr_biomarker("Iron", None),
            ocr_biomarker("FERRITIN", Some(311.0)),
        ],
    };

    let placement = apply_ocr_report(&path, &report).expect("apply report");
    assert_eq!(
        placement,
        OcrPlacement {
            matched: 2,
            added: vec!["Ferritin {ng/mL} [-300]".to_string(), "Iron".to_string()],
            empty: 1,
        }
    );

    let rows = read_rows(&path);
    assert_eq!(
        rows[0],
        [
            "Date",
            "Lab",
            "Glucose {mg/dL} [70-100]",
            "TSH [0.4-4.0]",
            "Ferritin {ng/mL} [-300]",
            "Iron",
            "Assessment"
        ]
    );
    assert_eq!(rows[1], ["2024-03-05", "Labcorp", "101", "1.8", "311"]);
    assert_eq!(rows[2], ["2024-01-10", "Quest", "92", "2.1", "", "", "Fine."]);
}

#[test]
fn ocr_without_assessment_column_appends_columns() {
    let dir = TempDir::new().expect("temp dir");
    let path = create_sheet(&dir, &[&["Date", "Lab", "HDL"], &["2024-01-10", "Quest", "55"]]);
    let report = OcrReport {
        lab_name: None,
        date: Some("2024-04-01".to_string()),
        biomarkers: vec![ocr_biomarker("LDL", Some(99.0))],
    };
    apply_ocr_report(&path, &report).expect("apply report");
    let rows = read_rows(&path);
    assert_eq!(rows[0], ["Date", "Lab", "HDL", "LDL"]);
    assert_eq!(rows[1], ["2024-04-01", "", "", "99"]);
}

#[test]
fn ocr_requires_date_and_lab_columns() {
    let dir = TempDir::new().expect("temp dir");
    let path = create_sheet(&dir, &[&["Name", "HDL"], &["x", "55"]]);
    let err = apply_ocr_report(&path, &OcrReport::default()).unwrap_err();
    assert!(err.to_string().contains("Date"));
}
