//! Date normalization for listing pages.
//!
//! Dates are resolved through an ordered chain of [`DateStrategy`] values and the
//! first strategy that produces a timestamp wins. A machine-readable attribute
//! (such as `<time datetime="...">`) is always tried before the visible text.
//! Text without a timezone is read as UTC, and date-only values are placed at
//! midnight UTC.

use std::sync::OnceLock;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;

use crate::errors::{FeederError, FeederResult};

/// Human-readable patterns, in priority order
pub const HUMAN_PATTERNS: &[&str] = &[
    "%B %d, %Y", // March 3, 2024
    "%b %d, %Y", // Mar 3, 2024
    "%B %d %Y",  // March 3 2024
    "%b %d %Y",  // Mar 3 2024
    "%Y-%m-%d",  // 2024-03-03
    "%m/%d/%Y",  // 03/03/2024
    "%d %B %Y",  // 3 March 2024
    "%d %b %Y",  // 3 Mar 2024
];

const NAIVE_DATETIME_PATTERNS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"];

fn ordinal_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b(\d{1,2})(?:st|nd|rd|th)\b").unwrap())
}

fn sept_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)\bsept\b").unwrap())
}

fn relative_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d+|an?|one)\s+(minute|hour|day|week)s?\s+ago$").unwrap()
    })
}

fn month_then_number_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)\b(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+\d")
            .unwrap()
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateStrategy {
    /// RFC 3339, RFC 2822, ISO date-times and ISO dates
    MachineReadable,
    /// `today`, `yesterday`, `3 days ago`, resolved against the fetch time
    Relative,
    /// A chrono format string
    Pattern(String),
}

impl DateStrategy {
    fn attempt(&self, text: &str, fetched_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            DateStrategy::MachineReadable => parse_machine_readable(text),
            DateStrategy::Relative => parse_relative(text, fetched_at),
            DateStrategy::Pattern(pattern) => parse_pattern(text, pattern),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DateNormalizer {
    strategies: Vec<DateStrategy>,
}

impl DateNormalizer {
    pub fn new() -> Self {
        let mut strategies = vec![DateStrategy::MachineReadable, DateStrategy::Relative];
        strategies.extend(
            HUMAN_PATTERNS
                .iter()
                .map(|p| DateStrategy::Pattern(p.to_string())),
        );
        Self { strategies }
    }

    /// Append a pattern at the end of the chain
    pub fn with_pattern(mut self, pattern: &str) -> Self {
        self.strategies.push(DateStrategy::Pattern(pattern.to_string()));
        self
    }

    pub fn strategies(&self) -> &[DateStrategy] {
        &self.strategies
    }

    /// Normalize visible date text
    pub fn normalize(&self, text: &str, fetched_at: DateTime<Utc>) -> FeederResult<DateTime<Utc>> {
        self.normalize_with_attr(None, text, fetched_at)
    }

    /// Normalize a date, preferring the machine-readable attribute when present
    pub fn normalize_with_attr(
        &self,
        attr: Option<&str>,
        text: &str,
        fetched_at: DateTime<Utc>,
    ) -> FeederResult<DateTime<Utc>> {
        if let Some(date) = attr
            .map(clean_text)
            .filter(|a| !a.is_empty())
            .and_then(|a| DateStrategy::MachineReadable.attempt(&a, fetched_at))
            .filter(in_feed_range)
        {
            return Ok(date);
        }

        let cleaned = clean_text(text);
        if !cleaned.is_empty() {
            if let Some(date) = self
                .strategies
                .iter()
                .filter_map(|strategy| strategy.attempt(&cleaned, fetched_at))
                .find(in_feed_range)
            {
                return Ok(date);
            }
        }

        Err(FeederError::DateUnparseable(text.trim().to_string()))
    }

    /// Whether a label reads as a date rather than a category
    pub fn is_date_like(&self, text: &str, fetched_at: DateTime<Utc>) -> bool {
        month_then_number_pattern().is_match(text) || self.normalize(text, fetched_at).is_ok()
    }
}

impl Default for DateNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// RFC 2822 output only covers four-digit years
fn in_feed_range(date: &DateTime<Utc>) -> bool {
    (1900..=9999).contains(&date.year())
}

fn clean_text(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let without_ordinals = ordinal_pattern().replace_all(&collapsed, "$1");
    sept_pattern().replace_all(&without_ordinals, "Sep").into_owned()
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .unwrap_or_default()
}

fn parse_machine_readable(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = DateTime::parse_from_rfc3339(text) {
        return Some(date.with_timezone(&Utc));
    }
    if let Ok(date) = DateTime::parse_from_rfc2822(text) {
        return Some(date.with_timezone(&Utc));
    }
    if let Some(date) = NAIVE_DATETIME_PATTERNS
        .iter()
        .find_map(|p| NaiveDateTime::parse_from_str(text, p).ok())
    {
        return Some(date.and_utc());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok().map(midnight)
}

fn parse_relative(text: &str, fetched_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let lowered = text.to_lowercase();
    let today = fetched_at.date_naive();

    match lowered.as_str() {
        "just now" | "now" => return Some(fetched_at),
        "today" => return Some(midnight(today)),
        "yesterday" => return today.pred_opt().map(midnight),
        _ => {}
    }

    let caps = relative_pattern().captures(&lowered)?;
    let amount: i64 = match &caps[1] {
        "a" | "an" | "one" => 1,
        n => n.parse().ok()?,
    };

    match &caps[2] {
        "minute" => fetched_at.checked_sub_signed(Duration::try_minutes(amount)?),
        "hour" => fetched_at.checked_sub_signed(Duration::try_hours(amount)?),
        "day" => today.checked_sub_signed(Duration::try_days(amount)?).map(midnight),
        "week" => today.checked_sub_signed(Duration::try_weeks(amount)?).map(midnight),
        _ => None,
    }
}

fn parse_pattern(text: &str, pattern: &str) -> Option<DateTime<Utc>> {
    if let Ok(date) = NaiveDateTime::parse_from_str(text, pattern) {
        return Some(date.and_utc());
    }
    NaiveDate::parse_from_str(text, pattern).ok().map(midnight)
}
