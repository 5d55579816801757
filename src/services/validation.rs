// Request Validation
// Rejects unusable text before it reaches the scoring engine

use crate::services::text_processor::char_len;
use thiserror::Error;

pub const DEFAULT_MAX_TEXT_CHARS: usize = 10_000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Text is required")]
    EmptyText,
    #[error("Text too long (max {max} characters, got {actual})")]
    TextTooLong { max: usize, actual: usize },
}

/// Accept text that is non-blank and at most `max_chars` characters.
/// Returns the text unchanged; trimming is the engine's job.
pub fn validate_text(text: &str, max_chars: usize) -> Result<&str, ValidationError> {
    if text.trim().is_empty() {
        return Err(ValidationError::EmptyText);
    }

    let actual = char_len(text);
    if actual > max_chars {
        return Err(ValidationError::TextTooLong { max: max_chars, actual });
    }

    Ok(text)
}
