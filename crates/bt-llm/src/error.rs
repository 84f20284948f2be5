use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LlmError>;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LlmError {
    #[error("ANTHROPIC_API_KEY is not set")]
    MissingApiKey,

    #[error("API key is not a valid header value")]
    InvalidApiKey,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status from the API.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("response contained no text")]
    EmptyResponse,

    #[error("no test at index {index} (have {len})")]
    NoSuchTest { index: usize, len: usize },

    #[error("PDF not found: {}", .0.display())]
    PdfNotFound(PathBuf),

    #[error("pdftoppm command not found; install poppler-utils and try again")]
    RasterizerMissing,

    #[error("pdftoppm failed to convert the PDF: {0}")]
    RasterizerFailed(String),

    #[error("no images were generated")]
    NoPages,

    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The OCR response was not the expected JSON. `raw` holds the text the
    /// model returned.
    #[error("failed to parse OCR response: {source}")]
    OcrParse {
        #[source]
        source: serde_json::Error,
        raw: String,
    },
}
