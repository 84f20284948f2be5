//! Names already present in a sheet, used to steer OCR output.

use std::collections::BTreeSet;

use crate::layout::ColumnLayout;
use crate::table::SheetTable;

/// Header text of every non-empty column other than Date, Lab and
/// Assessment, in sheet order.
pub fn known_biomarker_headers(table: &SheetTable) -> Vec<String> {
    let layout = ColumnLayout::detect(&table.headers);
    table
        .headers
        .iter()
        .enumerate()
        .filter(|(index, header)| {
            !header.is_empty() && ![layout.date, layout.lab, layout.assessment].contains(&Some(*index))
        })
        .map(|(_, header)| header.clone())
        .collect()
}

/// Distinct lab names from the Lab column, read until the first empty cell.
pub fn known_lab_names(table: &SheetTable) -> BTreeSet<String> {
    let Some(lab) = ColumnLayout::detect(&table.headers).lab else {
        return BTreeSet::new();
    };
    (0..table.rows.len())
        .map(|row| table.cell(row, lab))
        .take_while(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
