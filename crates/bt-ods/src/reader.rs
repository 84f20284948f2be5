//! Cell text extraction from `content.xml`.

use quick_xml::Reader;
use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesRef, BytesStart, Event};

use crate::error::{OdsError, Result};
use crate::xml::{
    ANNOTATION, CELL, COLUMNS_REPEATED, COVERED_CELL, LINE_BREAK, PARAGRAPH, ROW, ROWS_REPEATED,
    SPACE, SPACE_COUNT, TAB, TABLE, attribute, count_attribute, is_cell,
};

/// Largest repeat count that is expanded.
///
/// Spreadsheet applications pad rows and tables with one huge repeated
/// element; anything above this ends the row (or table) instead.
pub const MAX_EXPANDED_REPEAT: usize = 100;

/// Value attributes used when a cell has no paragraphs.
const VALUE_ATTRIBUTES: [&[u8]; 3] = [b"office:string-value", b"office:value", b"office:date-value"];

#[derive(Default)]
struct CellText {
    paragraphs: Vec<String>,
    current: Option<String>,
    fallback: Option<String>,
    repeat: usize,
}

impl CellText {
    fn start(element: &BytesStart<'_>) -> Result<Self> {
        let mut fallback = None;
        for key in VALUE_ATTRIBUTES {
            if let Some(value) = attribute(element, key)? {
                fallback = Some(value);
                break;
            }
        }
        Ok(Self {
            fallback,
            repeat: count_attribute(element, COLUMNS_REPEATED)?,
            ..Self::default()
        })
    }

    fn push_str(&mut self, text: &str) {
        if let Some(current) = self.current.as_mut() {
            current.push_str(text);
        }
    }

    fn finish(self) -> String {
        if self.paragraphs.is_empty() {
            return self.fallback.unwrap_or_default().trim().to_string();
        }
        self.paragraphs.join("\n").trim().to_string()
    }
}

#[derive(Default)]
struct RowText {
    cells: Vec<String>,
    repeat: usize,
    /// Set once a filler cell has been seen.
    closed: bool,
}

impl RowText {
    fn push(&mut self, cell: CellText) {
        if self.closed {
            return;
        }
        if cell.repeat > MAX_EXPANDED_REPEAT {
            self.closed = true;
            return;
        }
        let repeat = cell.repeat;
        let text = cell.finish();
        self.cells.extend(std::iter::repeat_n(text, repeat));
    }

    fn finish(mut self) -> Vec<String> {
        while self.cells.last().is_some_and(String::is_empty) {
            self.cells.pop();
        }
        self.cells
    }
}

/// Reads the first `table:table` of a `content.xml` document.
pub(crate) fn read_first_table(xml: &str) -> Result<Vec<Vec<String>>> {
    let mut reader = Reader::from_str(xml);
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut seen_table = false;
    let mut table_depth = 0usize;
    let mut annotation_depth = 0usize;
    let mut row: Option<RowText> = None;
    let mut cell: Option<CellText> = None;

    loop {
        let event = reader.read_event()?;
        let in_table = table_depth == 1;
        match event {
            Event::Start(element) => match element.name().as_ref() {
                TABLE if !seen_table => {
                    seen_table = true;
                    table_depth = 1;
                }
                TABLE if table_depth > 0 => table_depth += 1,
                _ if !in_table => {}
                ROW => {
                    row = Some(RowText {
                        repeat: count_attribute(&element, ROWS_REPEATED)?,
                        ..RowText::default()
                    });
                }
                _ if is_cell(&element) => cell = Some(CellText::start(&element)?),
                ANNOTATION => annotation_depth += 1,
                PARAGRAPH if annotation_depth == 0 => {
                    if let Some(cell) = cell.as_mut() {
                        cell.current = Some(String::new());
                    }
                }
                name => push_inline(cell.as_mut(), annotation_depth, name, &element)?,
            },
            Event::Empty(element) => match element.name().as_ref() {
                TABLE if !seen_table => {
                    seen_table = true;
                    break;
                }
                _ if !in_table => {}
                ROW => {
                    let repeat = count_attribute(&element, ROWS_REPEATED)?;
                    if repeat > MAX_EXPANDED_REPEAT {
                        break;
                    }
                    rows.extend(std::iter::repeat_n(Vec::new(), repeat));
                }
                _ if is_cell(&element) => {
                    if let Some(row) = row.as_mut() {
                        row.push(CellText::start(&element)?);
                    }
                }
                PARAGRAPH if annotation_depth == 0 => {
                    if let Some(cell) = cell.as_mut() {
                        cell.paragraphs.push(String::new());
                    }
                }
                name => push_inline(cell.as_mut(), annotation_depth, name, &element)?,
            },
            Event::End(element) => match element.name().as_ref() {
                TABLE if table_depth > 0 => {
                    table_depth -= 1;
                    if table_depth == 0 {
                        break;
                    }
                }
                _ if !in_table => {}
                ROW => {
                    if let Some(row) = row.take() {
                        let repeat = row.repeat;
                        if repeat > MAX_EXPANDED_REPEAT {
                            break;
                        }
                        rows.extend(std::iter::repeat_n(row.finish(), repeat));
                    }
                }
                CELL | COVERED_CELL => {
                    if let (Some(row), Some(cell)) = (row.as_mut(), cell.take()) {
                        row.push(cell);
                    }
                }
                ANNOTATION => annotation_depth = annotation_depth.saturating_sub(1),
                PARAGRAPH if annotation_depth == 0 => {
                    if let Some(cell) = cell.as_mut()
                        && let Some(text) = cell.current.take()
                    {
                        cell.paragraphs.push(text);
                    }
                }
                _ => {}
            },
            Event::Text(text) if in_table && annotation_depth == 0 => {
                if let Some(cell) = cell.as_mut() {
                    cell.push_str(&String::from_utf8_lossy(&text));
                }
            }
            Event::CData(text) if in_table && annotation_depth == 0 => {
                if let Some(cell) = cell.as_mut() {
                    cell.push_str(&String::from_utf8_lossy(&text));
                }
            }
            Event::GeneralRef(reference) if in_table && annotation_depth == 0 => {
                if let Some(cell) = cell.as_mut() {
                    cell.push_str(&resolve_reference(&reference));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !seen_table {
        return Err(OdsError::NoTable);
    }
    Ok(rows)
}

/// Whitespace elements inside a paragraph.
fn push_inline(
    cell: Option<&mut CellText>,
    annotation_depth: usize,
    name: &[u8],
    element: &BytesStart<'_>,
) -> Result<()> {
    let Some(cell) = cell else {
        return Ok(());
    };
    if annotation_depth > 0 {
        return Ok(());
    }
    match name {
        SPACE => {
            let count = count_attribute(element, SPACE_COUNT)?;
            cell.push_str(&" ".repeat(count));
        }
        TAB => cell.push_str("\t"),
        LINE_BREAK => cell.push_str("\n"),
        _ => {}
    }
    Ok(())
}

/// Character or predefined entity text; unknown entities are kept verbatim.
fn resolve_reference(reference: &BytesRef<'_>) -> String {
    if let Some(ch) = reference.resolve_char_ref().ok().flatten() {
        return ch.to_string();
    }
    let name = String::from_utf8_lossy(reference);
    resolve_predefined_entity(&name).map_or_else(|| format!("&{name};"), str::to_string)
}
