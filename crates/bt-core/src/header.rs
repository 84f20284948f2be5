//! Biomarker column header parsing.
//!
//! Headers follow `Name {unit} [low-high]` where unit and range are optional.
//! The forms are tried from most to least specific and the first match wins:
//!
//! 1. `Name {unit} [low-high]`
//! 2. `Name {unit}`
//! 3. `Name [low-high]`
//! 4. `Name`
//!
//! Parsing is permissive: a fragment that cannot be understood becomes `None`
//! instead of an error. [`parse_header_strict`] reports those fragments.

use std::sync::LazyLock;

use regex::Regex;

use bt_model::HeaderSpec;

use crate::error::HeaderError;

static UNIT_AND_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+?)\s*\{([^}]*)\}\s*\[([^\]]*)\]$").expect("Invalid unit+range header regex")
});

static UNIT_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?)\s*\{([^}]*)\}$").expect("Invalid unit header regex"));

static RANGE_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?)\s*\[([^\]]*)\]$").expect("Invalid range header regex"));

const DELIMITERS: [char; 4] = ['{', '}', '[', ']'];

/// How header fragments that do not parse are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HeaderParseMode {
    /// Degrade to `None` / bare name.
    #[default]
    Lenient,
    /// Reject the header.
    Strict,
}

impl HeaderParseMode {
    pub fn parse(self, raw: &str) -> Result<HeaderSpec, HeaderError> {
        match self {
            Self::Lenient => Ok(parse_header(raw)),
            Self::Strict => parse_header_strict(raw),
        }
    }
}

/// Header text split into its name, unit and range fragments.
struct HeaderParts<'a> {
    name: &'a str,
    unit: Option<&'a str>,
    range: &'a str,
}

fn split_header(raw: &str) -> HeaderParts<'_> {
    let header = raw.trim();
    if let Some(caps) = UNIT_AND_RANGE.captures(header) {
        return HeaderParts {
            name: caps.get(1).map_or("", |m| m.as_str()),
            unit: caps.get(2).map(|m| m.as_str()),
            range: caps.get(3).map_or("", |m| m.as_str()),
        };
    }
    if let Some(caps) = UNIT_ONLY.captures(header) {
        return HeaderParts {
            name: caps.get(1).map_or("", |m| m.as_str()),
            unit: caps.get(2).map(|m| m.as_str()),
            range: "",
        };
    }
    if let Some(caps) = RANGE_ONLY.captures(header) {
        return HeaderParts {
            name: caps.get(1).map_or("", |m| m.as_str()),
            unit: None,
            range: caps.get(2).map_or("", |m| m.as_str()),
        };
    }
    HeaderParts {
        name: header,
        unit: None,
        range: "",
    }
}

fn clean_unit(unit: Option<&str>) -> Option<String> {
    unit.map(str::trim)
        .filter(|unit| !unit.is_empty())
        .map(str::to_string)
}

/// Parse a header cell. Never fails.
///
/// ```
/// use bt_core::parse_header;
///
/// let spec = parse_header("Glucose {mg/dL} [70-100]");
/// assert_eq!(spec.name, "Glucose");
/// assert_eq!(spec.unit.as_deref(), Some("mg/dL"));
/// assert_eq!((spec.low, spec.high), (Some(70.0), Some(100.0)));
/// ```
pub fn parse_header(raw: &str) -> HeaderSpec {
    let parts = split_header(raw);
    let (low, high) = parse_range(parts.range);
    HeaderSpec {
        name: parts.name.trim().to_string(),
        unit: clean_unit(parts.unit),
        low,
        high,
    }
}

/// Parse a header cell, rejecting anything the lenient parser would drop.
pub fn parse_header_strict(raw: &str) -> Result<HeaderSpec, HeaderError> {
    let parts = split_header(raw);
    let header = raw.trim().to_string();
    let name = parts.name.trim();
    if name.is_empty() {
        return Err(HeaderError::EmptyName { header });
    }
    if let Some(delimiter) = name.chars().find(|ch| DELIMITERS.contains(ch)) {
        return Err(HeaderError::UnexpectedDelimiter { header, delimiter });
    }
    for fragment in range_fragments(parts.range) {
        if parse_bound(fragment).is_none() {
            return Err(HeaderError::InvalidBound {
                header,
                fragment: fragment.trim().to_string(),
            });
        }
    }
    Ok(parse_header(raw))
}

/// Non-empty bound fragments of a range string.
fn range_fragments(range: &str) -> Vec<&str> {
    let range = range.trim();
    let fragments = match range.split_once('-') {
        Some((left, right)) => vec![left, right],
        None => vec![range],
    };
    fragments
        .into_iter()
        .filter(|fragment| !fragment.trim().is_empty())
        .collect()
}

/// Parse the contents of a `[...]` group into `(low, high)`.
///
/// With a `-` the string is split on the first one and each side parsed on
/// its own. Without one, the number is an upper limit only.
///
/// ```
/// use bt_core::parse_range;
///
/// assert_eq!(parse_range("0.4-4.0"), (Some(0.4), Some(4.0)));
/// assert_eq!(parse_range("300"), (None, Some(300.0)));
/// assert_eq!(parse_range("40-"), (Some(40.0), None));
/// assert_eq!(parse_range(""), (None, None));
/// ```
pub fn parse_range(range: &str) -> (Option<f64>, Option<f64>) {
    let range = range.trim();
    if range.is_empty() {
        return (None, None);
    }
    match range.split_once('-') {
        Some((left, right)) => (parse_bound(left), parse_bound(right)),
        None => (None, parse_bound(range)),
    }
}

fn parse_bound(fragment: &str) -> Option<f64> {
    let trimmed = fragment.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}
