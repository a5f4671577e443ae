//! Filename timestamp parsing
//!
//! Each supported naming convention is one [`FilenameConvention`]. The
//! [`ParserRegistry`] tries them in a fixed order and the first match wins.

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;
use tracing::trace;

/// Pattern: IMG-YYYYMMDD-WAxxxx / VID-YYYYMMDD-WAxxxx
static PATTERN_WHATSAPP: OnceLock<Regex> = OnceLock::new();

/// Pattern: YYYYMMDD_HHmmss at the start of the name
static PATTERN_SAMSUNG: OnceLock<Regex> = OnceLock::new();

/// Pattern: WP_YYYYMMDD_HH_mm_ss with an optional suffix
static PATTERN_WINDOWS_PHONE: OnceLock<Regex> = OnceLock::new();

fn whatsapp_pattern() -> &'static Regex {
    PATTERN_WHATSAPP.get_or_init(|| {
        Regex::new(r"(?i)(?:IMG|VID)-([0-9]{8})-WA[0-9]+").expect("valid WhatsApp pattern")
    })
}

fn samsung_pattern() -> &'static Regex {
    PATTERN_SAMSUNG.get_or_init(|| {
        Regex::new(r"^([0-9]{8})_([0-9]{6})(?:[^0-9]|$)").expect("valid Samsung pattern")
    })
}

fn windows_phone_pattern() -> &'static Regex {
    PATTERN_WINDOWS_PHONE.get_or_init(|| {
        Regex::new(r"(?i)WP_([0-9]{8})_([0-9]{2})_([0-9]{2})_([0-9]{2})(?:[^0-9]|$)")
            .expect("valid Windows Phone pattern")
    })
}

/// A strategy that infers a capture timestamp from a bare filename.
///
/// Implementations must be pure: no filesystem access, same answer for the
/// same input.
pub trait FilenameDateParser: Send + Sync {
    /// Display name used in reports
    fn name(&self) -> &str;

    /// Parse a timestamp out of `filename` (base name only, not a path)
    fn parse(&self, filename: &str) -> Option<NaiveDateTime>;
}

/// The filename conventions recognized out of the box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilenameConvention {
    /// Messaging app export: `IMG-20230115-WA0001.jpg`, date only
    WhatsApp,
    /// Camera default: `20230115_123045.jpg`, anchored at the start
    Samsung,
    /// Smartphone OS default: `WP_20230115_12_30_45_Pro.jpg`
    WindowsPhone,
}

impl FilenameConvention {
    /// Resolution order used by [`ParserRegistry::default`]
    pub const PRIORITY: [FilenameConvention; 3] = [
        FilenameConvention::WhatsApp,
        FilenameConvention::Samsung,
        FilenameConvention::WindowsPhone,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            FilenameConvention::WhatsApp => "WhatsApp",
            FilenameConvention::Samsung => "Samsung",
            FilenameConvention::WindowsPhone => "Windows Phone",
        }
    }
}

impl FilenameDateParser for FilenameConvention {
    fn name(&self) -> &str {
        self.display_name()
    }

    fn parse(&self, filename: &str) -> Option<NaiveDateTime> {
        match self {
            FilenameConvention::WhatsApp => try_pattern_whatsapp(filename),
            FilenameConvention::Samsung => try_pattern_samsung(filename),
            FilenameConvention::WindowsPhone => try_pattern_windows_phone(filename),
        }
    }
}

fn try_pattern_whatsapp(s: &str) -> Option<NaiveDateTime> {
    let caps = whatsapp_pattern().captures(s)?;
    build_datetime(caps.get(1)?.as_str(), "00", "00", "00")
}

fn try_pattern_samsung(s: &str) -> Option<NaiveDateTime> {
    let caps = samsung_pattern().captures(s)?;
    let time = caps.get(2)?.as_str();
    build_datetime(caps.get(1)?.as_str(), &time[0..2], &time[2..4], &time[4..6])
}

fn try_pattern_windows_phone(s: &str) -> Option<NaiveDateTime> {
    let caps = windows_phone_pattern().captures(s)?;
    build_datetime(
        caps.get(1)?.as_str(),
        caps.get(2)?.as_str(),
        caps.get(3)?.as_str(),
        caps.get(4)?.as_str(),
    )
}

/// Build a timestamp from a `YYYYMMDD` group and time components.
///
/// Range checks are left to chrono, so month 13, Feb 30 or hour 25 simply
/// yield `None`.
fn build_datetime(date: &str, hour: &str, minute: &str, second: &str) -> Option<NaiveDateTime> {
    let year: i32 = date.get(0..4)?.parse().ok()?;
    let month: u32 = date.get(4..6)?.parse().ok()?;
    let day: u32 = date.get(6..8)?.parse().ok()?;
    let hour: u32 = hour.parse().ok()?;
    let minute: u32 = minute.parse().ok()?;
    let second: u32 = second.parse().ok()?;

    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(hour, minute, second)
}

/// Outcome of running the registry over one filename
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    NoMatch,
    Matched {
        timestamp: NaiveDateTime,
        /// Name of the parser that matched, for reporting only
        parser: String,
    },
}

/// Ordered set of filename parsers, tried first to last
pub struct ParserRegistry {
    parsers: Vec<Box<dyn FilenameDateParser>>,
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new(
            FilenameConvention::PRIORITY
                .into_iter()
                .map(|c| Box::new(c) as Box<dyn FilenameDateParser>)
                .collect(),
        )
    }
}

impl fmt::Debug for ParserRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl ParserRegistry {
    pub fn new(parsers: Vec<Box<dyn FilenameDateParser>>) -> Self {
        Self { parsers }
    }

    /// Parser names in resolution order
    pub fn names(&self) -> Vec<&str> {
        self.parsers.iter().map(|p| p.name()).collect()
    }

    /// Run every parser in order; the first match wins
    pub fn parse(&self, filename: &str) -> ParseOutcome {
        for parser in &self.parsers {
            if let Some(timestamp) = parser.parse(filename) {
                trace!(filename, parser = parser.name(), "Matched filename pattern");
                return ParseOutcome::Matched {
                    timestamp,
                    parser: parser.name().to_string(),
                };
            }
        }

        ParseOutcome::NoMatch
    }
}
