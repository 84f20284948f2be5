//! Language-model layer for the blood test tools.
//!
//! - [`client`]: the Messages API request types, the [`CompletionBackend`]
//!   seam and its HTTP implementation
//! - [`prompt`]: assessment and OCR prompt text
//! - [`assess`]: per-test assessment generation (or dry-run placeholders)
//! - [`ocr`]: PDF rasterization and structured extraction from page images

pub mod assess;
pub mod client;
pub mod config;
mod error;
pub mod ocr;
pub mod prompt;

pub use assess::{ASSESSMENT_MAX_TOKENS, ASSESSMENT_TEMPERATURE, Assessor};
pub use client::{
    AnthropicClient, CompletionBackend, ContentBlock, ImageSource, Message, MessageRequest, Role,
};
pub use config::{AssistantConfig, DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TIMEOUT};
pub use error::{LlmError, Result};
pub use ocr::{OCR_MAX_TOKENS, OcrExtractor, PageImages, parse_ocr_response, rasterize_pdf};
pub use prompt::{build_assessment_prompt, build_ocr_prompt, format_reference_range};
