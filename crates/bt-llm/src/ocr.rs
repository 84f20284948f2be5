//! Report OCR: PDF pages to PNG, PNG to [`OcrReport`].

use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::LazyLock;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bt_core::redact_value;
use bt_model::OcrReport;
use regex::Regex;
use tracing::{debug, info, trace, warn};

use crate::client::{CompletionBackend, ContentBlock, ImageSource, MessageRequest};
use crate::config::AssistantConfig;
use crate::error::{LlmError, Result};
use crate::prompt::build_ocr_prompt;

pub const OCR_MAX_TOKENS: u32 = 4096;
const OCR_TEMPERATURE: f32 = 0.0;

const RASTERIZER: &str = "pdftoppm";
const RASTER_DPI: &str = "300";
const TEMP_DIR_PREFIX: &str = "bt-ocr-";

/// First fenced block holding a JSON object.
static FENCED_JSON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json)?\s*(\{.*?\})\s*```").expect("valid fenced JSON regex")
});

/// Rendered pages of one PDF.
///
/// The directory is left on disk so the images can be inspected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageImages {
    pub dir: PathBuf,
    /// `{prefix}-*.png`, sorted by file name.
    pub pages: Vec<PathBuf>,
}

/// Render every page of `pdf` at 300 dpi into a fresh temporary directory.
pub fn rasterize_pdf(pdf: &Path, prefix: &str) -> Result<PageImages> {
    if !pdf.is_file() {
        return Err(LlmError::PdfNotFound(pdf.to_path_buf()));
    }
    let dir = tempfile::Builder::new()
        .prefix(TEMP_DIR_PREFIX)
        .tempdir()
        .map_err(|source| LlmError::Io {
            path: std::env::temp_dir(),
            source,
        })?
        .keep();

    let status = Command::new(RASTERIZER)
        .args(["-png", "-r", RASTER_DPI])
        .arg(pdf)
        .arg(dir.join(prefix))
        .status()
        .map_err(|error| match error.kind() {
            ErrorKind::NotFound => LlmError::RasterizerMissing,
            _ => LlmError::RasterizerFailed(error.to_string()),
        })?;
    if !status.success() {
        return Err(LlmError::RasterizerFailed(status.to_string()));
    }

    let pages = page_files(&dir, prefix)?;
    if pages.is_empty() {
        return Err(LlmError::NoPages);
    }
    info!(pdf = %pdf.display(), dir = %dir.display(), pages = pages.len(), "rasterized PDF");
    Ok(PageImages { dir, pages })
}

fn page_files(dir: &Path, prefix: &str) -> Result<Vec<PathBuf>> {
    let io_error = |source| LlmError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let page_prefix = format!("{prefix}-");
    let mut pages = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        let is_page = path.file_name().and_then(|name| name.to_str()).is_some_and(|name| {
            name.starts_with(&page_prefix) && name.ends_with(".png")
        });
        if is_page {
            pages.push(path);
        }
    }
    pages.sort();
    Ok(pages)
}

/// Parse the model's reply as an [`OcrReport`].
///
/// The JSON may be wrapped in a fenced code block; otherwise the whole reply
/// is parsed.
pub fn parse_ocr_response(text: &str) -> Result<OcrReport> {
    let json = FENCED_JSON
        .captures(text)
        .and_then(|captures| captures.get(1))
        .map_or(text.trim(), |found| found.as_str());
    serde_json::from_str(json).map_err(|source| LlmError::OcrParse {
        source,
        raw: text.to_string(),
    })
}

/// Sends page images to a backend and parses the structured reply.
#[derive(Debug)]
pub struct OcrExtractor<B> {
    backend: B,
    model: String,
    max_tokens: u32,
}

impl<B: CompletionBackend> OcrExtractor<B> {
    pub fn new(backend: B, config: &AssistantConfig) -> Self {
        Self {
            backend,
            model: config.model.clone(),
            max_tokens: config.max_tokens.unwrap_or(OCR_MAX_TOKENS),
        }
    }

    pub fn extract_report(
        &self,
        images: &[PathBuf],
        biomarker_names: &[String],
        lab_names: &BTreeSet<String>,
    ) -> Result<OcrReport> {
        let mut content = vec![ContentBlock::text(build_ocr_prompt(biomarker_names, lab_names))];
        for image in images {
            let bytes = fs::read(image).map_err(|source| LlmError::Io {
                path: image.clone(),
                source,
            })?;
            content.push(ContentBlock::Image {
                source: ImageSource::png(STANDARD.encode(bytes)),
            });
        }
        debug!(
            images = images.len(),
            known_biomarkers = biomarker_names.len(),
            known_labs = lab_names.len(),
            "requesting OCR"
        );
        let request =
            MessageRequest::user(self.model.clone(), self.max_tokens, OCR_TEMPERATURE, content);
        let text = self.backend.complete(&request)?;
        let report = parse_ocr_response(&text).inspect_err(|_| {
            warn!(chars = text.len(), "OCR response was not valid JSON");
            trace!(raw = redact_value(&text), "OCR response");
        })?;
        info!(
            biomarkers = report.biomarkers.len(),
            lab = report.lab_name.as_deref().unwrap_or(""),
            "extracted OCR report"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_files_filters_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["page-2.png", "page-1.png", "page-10.png", "other-1.png", "page-1.txt"] {
            fs::write(dir.path().join(name), b"").unwrap();
        }
        let names: Vec<String> = page_files(dir.path(), "page")
            .unwrap()
            .iter()
            .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["page-1.png", "page-10.png", "page-2.png"]);
    }

    #[test]
    fn missing_pdf_is_reported() {
        let err = rasterize_pdf(Path::new("/nonexistent/report.pdf"), "page").unwrap_err();
        assert!(matches!(err, LlmError::PdfNotFound(_)));
    }
}
