//! Batched edits to the first table, applied in one streaming pass.
//!
//! Rows and columns are addressed by logical index: repeated rows and cells
//! count once per repetition, the same way [`crate::OdsDocument::read_first_table`]
//! reports them. Column insertions are applied before cell values, so cell
//! and new-row coordinates refer to the table after insertion.

use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;

use quick_xml::events::{BytesStart, Event};
use quick_xml::{Reader, Writer};

use crate::cell::{CellSpan, CellValue, insert_columns, set_cells};
use crate::error::{OdsError, Result};
use crate::xml::{
    COLUMNS_REPEATED, ROW, ROW_TAG, ROWS_REPEATED, TABLE, TABLE_COLUMN, is_cell, strip_count,
    with_count,
};

/// Cells of a row keyed by column.
pub type RowCells = BTreeMap<usize, CellValue>;

/// A set of pending edits to the first table.
#[derive(Debug, Clone, Default)]
pub struct TableEdits {
    columns: Vec<usize>,
    cells: BTreeMap<usize, RowCells>,
    new_rows: BTreeMap<usize, Vec<RowCells>>,
}

impl TableEdits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() && self.cells.is_empty() && self.new_rows.is_empty()
    }

    /// Insert an empty column so that it ends up at `index`, optionally
    /// titled in row 0.
    pub fn insert_column(&mut self, index: usize, header: Option<&str>) -> &mut Self {
        self.columns.push(index);
        if let Some(header) = header {
            self.set_cell(0, index, CellValue::text(header));
        }
        self
    }

    pub fn set_cell(&mut self, row: usize, column: usize, value: CellValue) -> &mut Self {
        self.cells.entry(row).or_default().insert(column, value);
        self
    }

    /// Add a row directly after `row`. Several rows after the same anchor
    /// keep the order they were added in.
    pub fn insert_row_after(&mut self, row: usize, cells: RowCells) -> &mut Self {
        self.new_rows.entry(row).or_default().push(cells);
        self
    }

    /// Insertion points in the coordinates of the unedited table.
    fn original_positions(&self) -> Vec<usize> {
        let mut columns = self.columns.clone();
        columns.sort_unstable();
        columns
            .into_iter()
            .enumerate()
            .map(|(shift, index)| index.saturating_sub(shift))
            .collect()
    }

    /// Rows in `first..last` that need their own element.
    fn touched_rows(&self, first: usize, last: usize) -> BTreeSet<usize> {
        self.cells
            .range(first..last)
            .map(|(row, _)| *row)
            .chain(self.new_rows.range(first..last).map(|(row, _)| *row))
            .collect()
    }

    fn last_row(&self) -> Option<usize> {
        let cells = self.cells.keys().next_back().copied();
        let rows = self.new_rows.keys().next_back().copied();
        cells.max(rows)
    }
}

/// A buffered `table:table-row` covering `repeat` logical rows.
struct RowBuffer {
    start: BytesStart<'static>,
    first: usize,
    repeat: usize,
    spans: Vec<CellSpan>,
    cell: Option<CellCapture>,
}

struct CellCapture {
    start: BytesStart<'static>,
    children: Vec<Event<'static>>,
    depth: usize,
}

impl RowBuffer {
    fn new(element: &BytesStart<'_>, first: usize) -> Result<Self> {
        let (start, repeat) = strip_count(element, ROWS_REPEATED)?;
        Ok(Self {
            start,
            first,
            repeat,
            spans: Vec::new(),
            cell: None,
        })
    }

    /// Feed one event from inside the row. Returns true at the row end.
    fn push(&mut self, event: Event<'_>) -> Result<bool> {
        if let Some(capture) = &mut self.cell {
            match &event {
                Event::Start(_) => capture.depth += 1,
                Event::End(_) if capture.depth == 0 => {
                    if let Some(capture) = self.cell.take() {
                        self.spans
                            .push(CellSpan::from_element(&capture.start, capture.children)?);
                    }
                    return Ok(false);
                }
                Event::End(_) => capture.depth -= 1,
                Event::Eof => return Err(OdsError::Truncated { row: self.first }),
                _ => {}
            }
            capture.children.push(event.into_owned());
            return Ok(false);
        }
        match event {
            Event::Start(element) if is_cell(&element) => {
                self.cell = Some(CellCapture {
                    start: element.into_owned(),
                    children: Vec::new(),
                    depth: 0,
                });
            }
            Event::Empty(element) if is_cell(&element) => {
                self.spans.push(CellSpan::from_element(&element, Vec::new())?);
            }
            Event::End(element) if element.name().as_ref() == ROW => return Ok(true),
            Event::Eof => return Err(OdsError::Truncated { row: self.first }),
            _ => {}
        }
        Ok(false)
    }

    fn write<W: Write>(self, writer: &mut Writer<W>, edits: &TableEdits, positions: &[usize]) -> Result<()> {
        let last = self.first + self.repeat;
        let base = insert_columns(self.spans, positions);
        let mut next = self.first;
        for row in edits.touched_rows(self.first, last) {
            if row > next {
                write_row(writer, &self.start, row - next, &base)?;
            }
            let spans = match edits.cells.get(&row) {
                Some(cells) => set_cells(base.clone(), cells),
                None => base.clone(),
            };
            write_row(writer, &self.start, 1, &spans)?;
            for cells in edits.new_rows.get(&row).into_iter().flatten() {
                write_row(writer, &BytesStart::new(ROW_TAG), 1, &set_cells(Vec::new(), cells))?;
            }
            next = row + 1;
        }
        if next < last {
            write_row(writer, &self.start, last - next, &base)?;
        }
        Ok(())
    }
}

fn write_row<W: Write>(
    writer: &mut Writer<W>,
    start: &BytesStart<'static>,
    repeat: usize,
    spans: &[CellSpan],
) -> Result<()> {
    let start = with_count(start, ROWS_REPEATED, repeat);
    if spans.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }
    let end = start.to_end().into_owned();
    writer.write_event(Event::Start(start))?;
    for span in spans {
        span.write(writer)?;
    }
    writer.write_event(Event::End(end))?;
    Ok(())
}

/// Widen a column definition for the insertions that fall inside it.
fn widen_column(element: &BytesStart<'_>, column: &mut usize, positions: &[usize]) -> Result<BytesStart<'static>> {
    let (start, repeat) = strip_count(element, COLUMNS_REPEATED)?;
    let span = *column..*column + repeat;
    let added = positions.iter().filter(|position| span.contains(*position)).count();
    *column += repeat;
    Ok(with_count(&start, COLUMNS_REPEATED, repeat + added))
}

/// Rewrite `content.xml` with `edits` applied to its first table.
pub(crate) fn rewrite_first_table(xml: &str, edits: &TableEdits) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    let mut writer = Writer::new(Vec::new());
    let positions = edits.original_positions();
    let mut seen_table = false;
    let mut table_depth = 0usize;
    let mut next_row = 0usize;
    let mut next_column = 0usize;
    let mut row: Option<RowBuffer> = None;

    loop {
        let event = reader.read_event()?;
        if let Some(buffer) = row.as_mut() {
            if buffer.push(event)? {
                if let Some(buffer) = row.take() {
                    buffer.write(&mut writer, edits, &positions)?;
                }
            }
            continue;
        }
        let in_table = table_depth == 1;
        match &event {
            Event::Eof => break,
            Event::Start(element) if element.name().as_ref() == TABLE => {
                if !seen_table {
                    seen_table = true;
                    table_depth = 1;
                } else if table_depth > 0 {
                    table_depth += 1;
                }
            }
            Event::Empty(element) if element.name().as_ref() == TABLE => seen_table = true,
            Event::End(element) if element.name().as_ref() == TABLE && table_depth > 0 => {
                table_depth -= 1;
            }
            Event::Empty(element) if in_table && element.name().as_ref() == TABLE_COLUMN => {
                if !positions.is_empty() {
                    let widened = widen_column(element, &mut next_column, &positions)?;
                    writer.write_event(Event::Empty(widened))?;
                    continue;
                }
            }
            Event::Start(element) if in_table && element.name().as_ref() == TABLE_COLUMN => {
                if !positions.is_empty() {
                    let widened = widen_column(element, &mut next_column, &positions)?;
                    writer.write_event(Event::Start(widened))?;
                    continue;
                }
            }
            Event::Start(element) if in_table && element.name().as_ref() == ROW => {
                let buffer = RowBuffer::new(element, next_row)?;
                next_row += buffer.repeat;
                if !positions.is_empty() || !edits.touched_rows(buffer.first, next_row).is_empty() {
                    row = Some(buffer);
                    continue;
                }
            }
            Event::Empty(element) if in_table && element.name().as_ref() == ROW => {
                let buffer = RowBuffer::new(element, next_row)?;
                next_row += buffer.repeat;
                if !edits.touched_rows(buffer.first, next_row).is_empty() {
                    buffer.write(&mut writer, edits, &positions)?;
                    continue;
                }
            }
            _ => {}
        }
        writer.write_event(event)?;
    }

    if !seen_table {
        return Err(OdsError::NoTable);
    }
    if let Some(row) = edits.last_row().filter(|row| *row >= next_row) {
        return Err(OdsError::MissingRow { row });
    }
    Ok(String::from_utf8_lossy(&writer.into_inner()).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::read_first_table;

    const HEAD: &str = r#"<office:document-content xmlns:office="o" xmlns:table="t" xmlns:text="x"><office:body><office:spreadsheet><table:table table:name="Sheet1">"#;
    const TAIL: &str = "</table:table></office:spreadsheet></office:body></office:document-content>";

    fn content(body: &str) -> String {
        format!("{HEAD}{body}{TAIL}")
    }

    fn cell(text: &str) -> String {
        format!(r#"<table:table-cell office:value-type="string"><text:p>{text}</text:p></table:table-cell>"#)
    }

    fn row(cells: &[&str]) -> String {
        let cells: String = cells.iter().map(|text| cell(text)).collect();
        format!("<table:table-row>{cells}</table:table-row>")
    }

    fn sheet() -> String {
        content(&format!(
            r#"<table:table-column table:number-columns-repeated="3"/>{}{}{}"#,
            row(&["Date", "Lab", "Assessment"]),
            row(&["2024-01-01", "Quest"]),
            row(&["2024-02-01", "Quest", "done"]),
        ))
    }

    #[test]
    fn untouched_content_passes_through() {
        let xml = sheet();
        let out = rewrite_first_table(&xml, &TableEdits::new()).unwrap();
        assert_eq!(out, xml);
    }

    #[test]
    fn set_cell_pads_short_row() {
        let mut edits = TableEdits::new();
        edits.set_cell(1, 2, CellValue::text("Stable.\nNo action."));
        let out = rewrite_first_table(&sheet(), &edits).unwrap();
        let rows = read_first_table(&out).unwrap();
        assert_eq!(rows[1], ["2024-01-01", "Quest", "Stable.\nNo action."]);
        assert_eq!(rows[2], ["2024-02-01", "Quest", "done"]);
    }

    #[test]
    fn insert_column_and_row() {
        let mut edits = TableEdits::new();
        edits.insert_column(2, Some("Iron {ug/dL}"));
        let mut cells = RowCells::new();
        cells.insert(0, CellValue::text("2024-03-01"));
        cells.insert(2, CellValue::Float(88.0));
        edits.insert_row_after(0, cells);
        let out = rewrite_first_table(&sheet(), &edits).unwrap();
        let rows = read_first_table(&out).unwrap();
        assert_eq!(rows[0], ["Date", "Lab", "Iron {ug/dL}", "Assessment"]);
        assert_eq!(rows[1], ["2024-03-01", "", "88"]);
        assert_eq!(rows[2], ["2024-01-01", "Quest"]);
        assert_eq!(rows[3], ["2024-02-01", "Quest", "", "done"]);
        assert!(out.contains(r#"table:number-columns-repeated="4""#));
        assert!(out.contains(r#"office:value-type="float" office:value="88""#));
    }

    #[test]
    fn repeated_rows_split_around_edits() {
        let body = format!(
            r#"{}<table:table-row table:number-rows-repeated="3">{}</table:table-row>"#,
            row(&["Name"]),
            cell("same"),
        );
        let mut edits = TableEdits::new();
        edits.set_cell(2, 1, CellValue::text("middle"));
        let out = rewrite_first_table(&content(&body), &edits).unwrap();
        let rows = read_first_table(&out).unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[1], ["same"]);
        assert_eq!(rows[2], ["same", "middle"]);
        assert_eq!(rows[3], ["same"]);
    }

    #[test]
    fn edits_past_the_end_fail() {
        let mut edits = TableEdits::new();
        edits.set_cell(7, 0, CellValue::text("x"));
        assert!(matches!(
            rewrite_first_table(&sheet(), &edits),
            Err(OdsError::MissingRow { row: 7 })
        ));
    }

    #[test]
    fn original_positions_account_for_earlier_insertions() {
        let mut edits = TableEdits::new();
        edits.insert_column(6, None).insert_column(5, None);
        assert_eq!(edits.original_positions(), [5, 5]);
    }
}
