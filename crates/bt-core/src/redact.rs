//! Process-wide switch for logging biomarker values.
//!
//! Values, prompts and model responses reach the logs only through
//! [`redact_value`]; the binary turns the switch on with `--log-data`.

use std::sync::atomic::{AtomicBool, Ordering};

static LOG_DATA_ENABLED: AtomicBool = AtomicBool::new(false);

/// Placeholder used when value logging is disabled.
pub const REDACTED_VALUE: &str = "[REDACTED]";

pub fn set_log_data_enabled(enabled: bool) {
    LOG_DATA_ENABLED.store(enabled, Ordering::Release);
}

pub fn log_data_enabled() -> bool {
    LOG_DATA_ENABLED.load(Ordering::Acquire)
}

/// Returns `value` when value logging is enabled, otherwise a redacted token.
pub fn redact_value(value: &str) -> &str {
    if log_data_enabled() {
        value
    } else {
        REDACTED_VALUE
    }
}
