//! Tests for bt-model types.

use bt_model::{
    BiomarkerReading, BiomarkerValue, Categories, ExportDocument, ExportTest, OcrReport,
};

#[test]
fn value_parse_falls_back_to_text() {
    assert_eq!(BiomarkerValue::parse(" 4.5 "), BiomarkerValue::Number(4.5));
    assert_eq!(
        BiomarkerValue::parse("<0.1"),
        BiomarkerValue::Text("<0.1".to_string())
    );
    assert_eq!(BiomarkerValue::Text("12".to_string()).as_f64(), Some(12.0));
    assert_eq!(BiomarkerValue::Text("trace".to_string()).as_f64(), None);
}

#[test]
fn value_display_drops_trailing_zero() {
    assert_eq!(BiomarkerValue::Number(70.0).to_string(), "70");
    assert_eq!(BiomarkerValue::Number(0.45).to_string(), "0.45");
    assert_eq!(BiomarkerValue::Text("neg".to_string()).to_string(), "neg");
}

#[test]
fn export_document_serializes_schema() {
    let mut categories = Categories::default();
    categories.insert("Lipids".to_string(), vec!["LDL".to_string(), "HDL".to_string()]);
    let doc = ExportDocument::new(
        vec![ExportTest {
            date: "2024-03-01".to_string(),
            lab_name: "Central".to_string(),
            biomarkers: vec![
                BiomarkerReading::bare("LDL", BiomarkerValue::Number(130.0))
                    .with_range(None, Some(100.0)),
                BiomarkerReading::bare("Urine", BiomarkerValue::Text("clear".to_string())),
            ],
        }],
        categories,
    );

    let json = serde_json::to_value(&doc).expect("serialize");
    assert_eq!(json["schemaVersion"], 1);
    assert_eq!(json["tests"][0]["labName"], "Central");
    assert_eq!(json["tests"][0]["biomarkers"][0]["value"], 130.0);
    assert_eq!(json["tests"][0]["biomarkers"][0]["high"], 100.0);
    assert!(json["tests"][0]["biomarkers"][0]["low"].is_null());
    assert!(json["tests"][0]["biomarkers"][1]["unit"].is_null());
    assert_eq!(json["tests"][0]["biomarkers"][1]["value"], "clear");
    assert_eq!(json["categories"]["Lipids"][1], "HDL");
}

#[test]
fn export_document_omits_empty_categories() {
    let doc = ExportDocument::new(vec![], Categories::default());
    let json = serde_json::to_string(&doc).expect("serialize");
    assert_eq!(json, r#"{"schemaVersion":1,"tests":[]}"#);
}

#[test]
fn categories_keep_sheet_order() {
    let mut categories = Categories::default();
    categories.insert("Thyroid".to_string(), vec!["TSH".to_string()]);
    categories.insert("Blood".to_string(), vec!["WBC".to_string()]);
    categories.insert("Thyroid".to_string(), vec!["FT4".to_string()]);
    let json = serde_json::to_string(&categories).expect("serialize");
    assert_eq!(json, r#"{"Thyroid":["FT4"],"Blood":["WBC"]}"#);
    assert_eq!(categories.len(), 2);
    assert_eq!(categories.get("Thyroid"), Some(&["FT4".to_string()][..]));
}

#[test]
fn ocr_report_accepts_nulls_and_strings() {
    let raw = r#"{
        "lab_name": "Quest",
        "date": null,
        "biomarkers": [
            {"name": "Glucose", "value": 91, "unit": "mg/dL", "range_lower": 70, "range_upper": "100"},
            {"name": "Color", "value": "yellow"}
        ]
    }"#;
    let report: OcrReport = serde_json::from_str(raw).expect("parse");
    assert_eq!(report.lab_name.as_deref(), Some("Quest"));
    assert!(report.date.is_none());
    assert_eq!(report.biomarkers.len(), 2);
    let glucose = &report.biomarkers[0];
    assert_eq!(glucose.value, Some(BiomarkerValue::Number(91.0)));
    assert_eq!(
        glucose.range_upper.as_ref().and_then(BiomarkerValue::as_f64),
        Some(100.0)
    );
    assert!(report.biomarkers[1].unit.is_none());
}
