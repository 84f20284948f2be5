//! Tests for biomarker header parsing.

use bt_core::{HeaderError, HeaderParseMode, parse_header, parse_header_strict, parse_range};
use bt_model::HeaderSpec;
use proptest::prelude::*;

#[test]
fn full_header() {
    let spec = parse_header("Glucose {mg/dL} [70-100]");
    assert_eq!(spec.name, "Glucose");
    assert_eq!(spec.unit.as_deref(), Some("mg/dL"));
    assert_eq!(spec.low, Some(70.0));
    assert_eq!(spec.high, Some(100.0));
}

#[test]
fn range_without_unit() {
    let spec = parse_header("TSH [0.4-4.0]");
    assert_eq!(spec.name, "TSH");
    assert_eq!(spec.unit, None);
    assert_eq!(spec.low, Some(0.4));
    assert_eq!(spec.high, Some(4.0));
}

#[test]
fn unit_without_range() {
    let spec = parse_header("WBC {k/uL}");
    assert_eq!(spec.name, "WBC");
    assert_eq!(spec.unit.as_deref(), Some("k/uL"));
    assert!(!spec.has_range());
}

#[test]
fn bare_number_is_high_bound() {
    let spec = parse_header("Ferritin [300]");
    assert_eq!(spec.low, None);
    assert_eq!(spec.high, Some(300.0));
}

#[test]
fn name_only() {
    assert_eq!(parse_header("CRP"), HeaderSpec::named("CRP"));
    assert_eq!(parse_header("  CRP  "), HeaderSpec::named("CRP"));
}

#[test]
fn empty_braces_mean_no_unit() {
    let spec = parse_header("Sodium {} [135-145]");
    assert_eq!(spec.name, "Sodium");
    assert_eq!(spec.unit, None);
    assert_eq!(spec.low, Some(135.0));
}

#[test]
fn name_keeps_inner_spaces() {
    let spec = parse_header("Vitamin D 25-OH {ng/mL} [30-100]");
    assert_eq!(spec.name, "Vitamin D 25-OH");
}

#[test]
fn groups_must_be_trailing() {
    let spec = parse_header("HDL [40-] note");
    assert_eq!(spec.name, "HDL [40-] note");
    assert!(!spec.has_range());
}

#[test]
fn one_sided_ranges() {
    assert_eq!(parse_range("40-"), (Some(40.0), None));
    assert_eq!(parse_range("-200"), (None, Some(200.0)));
    assert_eq!(parse_range(" 1.5 - 3 "), (Some(1.5), Some(3.0)));
    assert_eq!(parse_range("   "), (None, None));
    assert_eq!(parse_range("high"), (None, None));
}

#[test]
fn strict_accepts_well_formed_headers() {
    let spec = parse_header_strict("Glucose {mg/dL} [70-100]").unwrap();
    assert_eq!(spec, parse_header("Glucose {mg/dL} [70-100]"));
    assert!(parse_header_strict("Ferritin [-300]").is_ok());
}

#[test]
fn strict_rejects_bad_bound() {
    let err = parse_header_strict("LDL {mg/dL} [abc-130]").unwrap_err();
    assert_eq!(
        err,
        HeaderError::InvalidBound {
            header: "LDL {mg/dL} [abc-130]".to_string(),
            fragment: "abc".to_string(),
        }
    );
}

#[test]
fn strict_rejects_stray_delimiters() {
    let err = parse_header_strict("Iron {ug/dL").unwrap_err();
    assert!(matches!(
        err,
        HeaderError::UnexpectedDelimiter { delimiter: '{', .. }
    ));
}

#[test]
fn strict_rejects_empty_name() {
    assert!(matches!(
        parse_header_strict("   "),
        Err(HeaderError::EmptyName { .. })
    ));
}

#[test]
fn lenient_mode_never_fails() {
    let spec = HeaderParseMode::Lenient.parse("Iron {ug/dL").unwrap();
    assert_eq!(spec.name, "Iron {ug/dL");
    assert!(HeaderParseMode::Strict.parse("Iron {ug/dL").is_err());
}

#[test]
fn display_forms() {
    let spec = HeaderSpec::named("HDL").with_unit("mg/dL").with_range(Some(40.0), None);
    assert_eq!(spec.to_string(), "HDL {mg/dL} [40-]");
    let spec = HeaderSpec::named("Ferritin").with_range(None, Some(300.0));
    assert_eq!(spec.to_string(), "Ferritin [-300]");
    let spec = HeaderSpec::named("TSH").with_range(Some(0.4), Some(4.0));
    assert_eq!(spec.to_string(), "TSH [0.4-4]");
}

fn header_spec() -> impl Strategy<Value = HeaderSpec> {
    let name = "[A-Za-z][A-Za-z0-9 ()/%.-]{0,20}"
        .prop_map(|name| name.trim().to_string())
        .prop_filter("non-empty name", |name| !name.is_empty());
    let unit = proptest::option::of("[A-Za-z0-9/%.^]{1,8}");
    let bound = proptest::option::of(0.0f64..1.0e6);
    (name, unit, bound.clone(), bound).prop_map(|(name, unit, low, high)| HeaderSpec {
        name,
        unit,
        low,
        high,
    })
}

proptest! {
    #[test]
    fn format_then_parse_round_trips(spec in header_spec()) {
        let rendered = spec.to_string();
        prop_assert_eq!(parse_header(&rendered), spec.clone());
        prop_assert_eq!(parse_header_strict(&rendered).ok(), Some(spec));
    }
}
