// ABOUTME: Input validation helpers shared across packages
// ABOUTME: Title checks and string truncation for log-safe output

use thiserror::Error;

/// Maximum accepted length of a meeting title
pub const MAX_TITLE_LENGTH: usize = 200;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
}

/// Validate a user supplied title and return it trimmed
pub fn validate_title(title: &str) -> Result<String, ValidationError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Empty { field: "title" });
    }
    if trimmed.chars().count() > MAX_TITLE_LENGTH {
        return Err(ValidationError::TooLong {
            field: "title",
            max: MAX_TITLE_LENGTH,
        });
    }
    Ok(trimmed.to_string())
}

/// Truncate a string to `max_chars` characters, appending "..." when cut
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_chars).collect();
        format!("{}...", cut)
    }
}
