//! Internal helpers for input normalization.

use crate::{EngineError, ResultEngine};

/// Trim `value` and reject it if nothing is left.
pub(crate) fn normalize_required(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidInput(format!(
            "{label} must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}
