//! Capture time handling
//!
//! This module provides:
//! - Filename pattern parsers that infer a capture timestamp
//! - The metadata gateway that checks and writes EXIF capture dates
//!
//! All timestamps are naive local wall-clock values; no timezone is
//! attached or converted anywhere.

pub mod exif;
pub mod filename;

use chrono::NaiveDateTime;

/// A capture timestamp without timezone
pub type Timestamp = NaiveDateTime;

/// Format used in user-facing messages and reports
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format EXIF stores date tags in
pub const EXIF_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Render a timestamp for messages, e.g. `2023-01-15 12:30:45`
pub fn format_timestamp(timestamp: &Timestamp) -> String {
    timestamp.format(DISPLAY_FORMAT).to_string()
}
