// ABOUTME: Shared utility functions for Reqhub
// ABOUTME: Review meeting number formatting and parsing

use chrono::NaiveDate;

use crate::constants::MEETING_NO_PREFIX;

/// Prefix shared by all meeting numbers issued on `date`, e.g. `RM-20261016-`
pub fn meeting_no_day_prefix(date: NaiveDate) -> String {
    format!("{}-{}-", MEETING_NO_PREFIX, date.format("%Y%m%d"))
}

/// Format a meeting number from its issue date and per-day sequence.
///
/// Sequences below 1000 are zero padded to three digits; larger ones keep all digits
/// so numbers stay unique on very busy days.
pub fn format_meeting_no(date: NaiveDate, sequence: u32) -> String {
    format!("{}{:03}", meeting_no_day_prefix(date), sequence)
}

/// Extract the per-day sequence from a meeting number issued on `date`
pub fn parse_meeting_no_sequence(meeting_no: &str, date: NaiveDate) -> Option<u32> {
    meeting_no
        .strip_prefix(&meeting_no_day_prefix(date))
        .and_then(|seq| seq.parse().ok())
}
