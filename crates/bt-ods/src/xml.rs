//! OpenDocument element names and attribute helpers.

use quick_xml::events::BytesStart;

use crate::error::Result;

pub(crate) const ROW_TAG: &str = "table:table-row";
pub(crate) const CELL_TAG: &str = "table:table-cell";
pub(crate) const PARAGRAPH_TAG: &str = "text:p";

pub(crate) const TABLE: &[u8] = b"table:table";
pub(crate) const TABLE_COLUMN: &[u8] = b"table:table-column";
pub(crate) const ROW: &[u8] = ROW_TAG.as_bytes();
pub(crate) const CELL: &[u8] = CELL_TAG.as_bytes();
pub(crate) const COVERED_CELL: &[u8] = b"table:covered-table-cell";
pub(crate) const PARAGRAPH: &[u8] = PARAGRAPH_TAG.as_bytes();
pub(crate) const SPACE: &[u8] = b"text:s";
pub(crate) const TAB: &[u8] = b"text:tab";
pub(crate) const LINE_BREAK: &[u8] = b"text:line-break";
pub(crate) const ANNOTATION: &[u8] = b"office:annotation";

pub(crate) const COLUMNS_REPEATED: &str = "table:number-columns-repeated";
pub(crate) const ROWS_REPEATED: &str = "table:number-rows-repeated";
pub(crate) const SPACE_COUNT: &str = "text:c";

pub(crate) fn is_cell(element: &BytesStart<'_>) -> bool {
    matches!(element.name().as_ref(), CELL | COVERED_CELL)
}

/// Unescaped value of an attribute.
pub(crate) fn attribute(element: &BytesStart<'_>, key: &[u8]) -> Result<Option<String>> {
    for attr in element.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == key {
            let value = attr.unescape_value().map_err(quick_xml::Error::from)?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

/// Positive count attribute, defaulting to 1.
pub(crate) fn count_attribute(element: &BytesStart<'_>, key: &str) -> Result<usize> {
    Ok(attribute(element, key.as_bytes())?
        .and_then(|value| value.trim().parse::<usize>().ok())
        .filter(|count| *count > 0)
        .unwrap_or(1))
}

/// Copy of `element` without `key`, plus the count `key` held.
pub(crate) fn strip_count(element: &BytesStart<'_>, key: &str) -> Result<(BytesStart<'static>, usize)> {
    let name = String::from_utf8_lossy(element.name().as_ref()).into_owned();
    let mut stripped = BytesStart::new(name);
    let mut count = 1;
    for attr in element.attributes() {
        let attr = attr?;
        if attr.key.as_ref() == key.as_bytes() {
            count = std::str::from_utf8(&attr.value)
                .ok()
                .and_then(|value| value.trim().parse::<usize>().ok())
                .filter(|count| *count > 0)
                .unwrap_or(1);
        } else {
            stripped.push_attribute(attr);
        }
    }
    Ok((stripped, count))
}

/// Copy of `element` with `key` set to `count`, omitted when it is 1.
pub(crate) fn with_count(element: &BytesStart<'static>, key: &str, count: usize) -> BytesStart<'static> {
    let mut element = element.clone();
    if count > 1 {
        element.push_attribute((key, count.to_string().as_str()));
    }
    element
}
