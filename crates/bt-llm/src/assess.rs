//! Assessment generation for one test at a time.

use tracing::{debug, trace};

use bt_core::{ImportanceWindow, redact_value};
use bt_model::LabTest;

use crate::client::{CompletionBackend, ContentBlock, MessageRequest};
use crate::config::AssistantConfig;
use crate::error::{LlmError, Result};
use crate::prompt::build_assessment_prompt;

pub const ASSESSMENT_MAX_TOKENS: u32 = 2048;
pub const ASSESSMENT_TEMPERATURE: f32 = 0.3;

/// Produces assessment text for tests in a chronological sequence.
///
/// Without a backend the assessor runs dry: it returns a placeholder naming
/// the test date and the number of important biomarkers, and makes no calls.
#[derive(Debug)]
pub struct Assessor<B> {
    backend: Option<B>,
    model: String,
    max_tokens: u32,
    temperature: f32,
    window: ImportanceWindow,
}

impl<B: CompletionBackend> Assessor<B> {
    pub fn new(backend: B, config: &AssistantConfig) -> Self {
        Self {
            backend: Some(backend),
            model: config.model.clone(),
            max_tokens: config.max_tokens.unwrap_or(ASSESSMENT_MAX_TOKENS),
            temperature: config.temperature.unwrap_or(ASSESSMENT_TEMPERATURE),
            window: ImportanceWindow::default(),
        }
    }

    pub fn dry_run() -> Self {
        Self {
            backend: None,
            model: String::new(),
            max_tokens: ASSESSMENT_MAX_TOKENS,
            temperature: ASSESSMENT_TEMPERATURE,
            window: ImportanceWindow::default(),
        }
    }

    #[must_use]
    pub fn with_window(mut self, window: ImportanceWindow) -> Self {
        self.window = window;
        self
    }

    pub fn window(&self) -> ImportanceWindow {
        self.window
    }

    pub fn is_dry_run(&self) -> bool {
        self.backend.is_none()
    }

    /// Assessment text for `tests[index]`, trimmed.
    pub fn assess(&self, tests: &[LabTest], index: usize) -> Result<String> {
        let test = tests.get(index).ok_or(LlmError::NoSuchTest {
            index,
            len: tests.len(),
        })?;
        let context = self.window.context(tests, index);
        debug!(
            row = test.row_index,
            date = %test.date,
            important = context.important.len(),
            "assessing test"
        );

        let Some(backend) = &self.backend else {
            return Ok(format!(
                "[DRY RUN] Assessment for test on {} with {} important biomarkers.",
                test.date,
                context.important.len()
            ));
        };

        let prompt = build_assessment_prompt(test, &context, self.window.lookback());
        trace!(
            chars = prompt.len(),
            prompt = redact_value(&prompt),
            "assessment prompt"
        );
        let request = MessageRequest::user(
            self.model.clone(),
            self.max_tokens,
            self.temperature,
            vec![ContentBlock::text(prompt)],
        );
        let text = backend.complete(&request)?;
        Ok(text.trim().to_string())
    }
}
