//! JSON export output.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use bt_model::ExportDocument;

/// Write `document` as pretty-printed UTF-8 JSON.
pub fn write_json_export(document: &ExportDocument, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(document).context("serialize export document")?;
    fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
    info!(
        path = %path.display(),
        tests = document.tests.len(),
        categories = document.categories.len(),
        "wrote JSON export"
    );
    Ok(())
}
