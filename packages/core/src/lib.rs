// ABOUTME: Core types, constants, and utilities for Reqhub
// ABOUTME: Foundational package shared by storage, review, api, and cli packages

pub mod constants;
pub mod utils;
pub mod validation;

// Re-export constants
pub use constants::{default_database_path, reqhub_dir, DATABASE_FILE_NAME, MEETING_NO_PREFIX};

// Re-export utilities
pub use utils::{format_meeting_no, meeting_no_day_prefix, parse_meeting_no_sequence};

// Re-export validation
pub use validation::{truncate, validate_title, ValidationError, MAX_TITLE_LENGTH};
