//! Cell values and buffered cell elements.

use std::io::Write;

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use crate::error::Result;
use crate::xml::{CELL_TAG, COLUMNS_REPEATED, PARAGRAPH_TAG, strip_count, with_count};

/// A value written into a cell.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Float(f64),
}

impl CellValue {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Float when the trimmed text parses as a number, text otherwise.
    pub fn infer(raw: &str) -> Self {
        match raw.trim().parse::<f64>() {
            Ok(number) => Self::Float(number),
            Err(_) => Self::Text(raw.to_string()),
        }
    }

    pub(crate) fn is_blank(&self) -> bool {
        matches!(self, Self::Text(text) if text.is_empty())
    }
}

impl From<&str> for CellValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(number: f64) -> Self {
        Self::Float(number)
    }
}

/// One cell element covering `repeat` adjacent columns.
#[derive(Debug, Clone)]
pub(crate) struct CellSpan {
    start: BytesStart<'static>,
    children: Vec<Event<'static>>,
    pub(crate) repeat: usize,
}

impl CellSpan {
    pub(crate) fn from_element(element: &BytesStart<'_>, children: Vec<Event<'static>>) -> Result<Self> {
        let (start, repeat) = strip_count(element, COLUMNS_REPEATED)?;
        Ok(Self {
            start,
            children,
            repeat,
        })
    }

    pub(crate) fn empty(repeat: usize) -> Self {
        Self {
            start: BytesStart::new(CELL_TAG),
            children: Vec::new(),
            repeat,
        }
    }

    pub(crate) fn from_value(value: &CellValue) -> Self {
        if value.is_blank() {
            return Self::empty(1);
        }
        let mut start = BytesStart::new(CELL_TAG);
        let display = match value {
            CellValue::Text(text) => {
                start.push_attribute(("office:value-type", "string"));
                text.clone()
            }
            CellValue::Float(number) => {
                let number = number.to_string();
                start.push_attribute(("office:value-type", "float"));
                start.push_attribute(("office:value", number.as_str()));
                number
            }
        };
        let mut children = Vec::new();
        for line in display.split('\n') {
            children.push(Event::Start(BytesStart::new(PARAGRAPH_TAG)));
            if !line.is_empty() {
                children.push(Event::Text(BytesText::new(line).into_owned()));
            }
            children.push(Event::End(BytesEnd::new(PARAGRAPH_TAG)));
        }
        Self {
            start,
            children,
            repeat: 1,
        }
    }

    /// Same cell covering a different number of columns.
    pub(crate) fn with_repeat(&self, repeat: usize) -> Self {
        Self {
            start: self.start.clone(),
            children: self.children.clone(),
            repeat,
        }
    }

    pub(crate) fn write<W: Write>(&self, writer: &mut Writer<W>) -> Result<()> {
        let start = with_count(&self.start, COLUMNS_REPEATED, self.repeat);
        if self.children.is_empty() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }
        let end = start.to_end().into_owned();
        writer.write_event(Event::Start(start))?;
        for child in &self.children {
            writer.write_event(child.clone())?;
        }
        writer.write_event(Event::End(end))?;
        Ok(())
    }
}

/// Insert empty cells at the given original column positions.
///
/// Positions must be ascending and are relative to the row before any
/// insertion. Positions past the row end need no cell.
pub(crate) fn insert_columns(spans: Vec<CellSpan>, positions: &[usize]) -> Vec<CellSpan> {
    if positions.is_empty() {
        return spans;
    }
    let mut out = Vec::with_capacity(spans.len() + positions.len());
    let mut pending = positions.iter().copied().peekable();
    let mut column = 0;
    for span in spans {
        let mut rest = span;
        while let Some(position) = pending.next_if(|position| *position < column + rest.repeat) {
            let offset = position - column;
            if offset > 0 {
                out.push(rest.with_repeat(offset));
                rest = rest.with_repeat(rest.repeat - offset);
                column += offset;
            }
            out.push(CellSpan::empty(1));
        }
        column += rest.repeat;
        out.push(rest);
    }
    out
}

/// Overwrite cells at final column positions, padding the row as needed.
pub(crate) fn set_cells<'a>(
    spans: Vec<CellSpan>,
    cells: impl IntoIterator<Item = (&'a usize, &'a CellValue)>,
) -> Vec<CellSpan> {
    let mut out = Vec::with_capacity(spans.len());
    let mut pending = cells.into_iter().peekable();
    let mut column = 0;
    for span in spans {
        let mut rest = Some(span);
        while let Some(current) = rest.take() {
            let Some((&target, value)) = pending.next_if(|(target, _)| **target < column + current.repeat)
            else {
                rest = Some(current);
                break;
            };
            let offset = target - column;
            if offset > 0 {
                out.push(current.with_repeat(offset));
            }
            out.push(CellSpan::from_value(value));
            let remaining = current.repeat - offset - 1;
            column = target + 1;
            if remaining > 0 {
                rest = Some(current.with_repeat(remaining));
            }
        }
        if let Some(current) = rest {
            column += current.repeat;
            out.push(current);
        }
    }
    for (&target, value) in pending {
        if target > column {
            out.push(CellSpan::empty(target - column));
        }
        out.push(CellSpan::from_value(value));
        column = target + 1;
    }
    out
}
