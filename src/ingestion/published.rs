//! Publish-date normalization.
//!
//! Feeds in the wild use a handful of date formats. Layouts are tried in a
//! fixed order and the first one that parses wins, so a string that several
//! layouts accept always takes the interpretation of the earliest one.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use std::fmt;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Layout {
    /// `2006-01-02T15:04:05Z07:00`
    Rfc3339,
    /// `02 Jan 06 15:04 MST`, parsed leniently as RFC 2822
    Rfc822,
    /// `Mon, 02 Jan 2006 15:04:05 MST`
    Rfc1123,
    /// `2006-01-02 15:04:05`, taken as UTC
    DateTime,
    /// `02 Jan 2006 15:04:05 MST`
    DayMonthYear,
}

/// Priority order. Changing it changes results for ambiguous input.
pub const LAYOUTS: [Layout; 5] = [
    Layout::Rfc3339,
    Layout::Rfc822,
    Layout::Rfc1123,
    Layout::DateTime,
    Layout::DayMonthYear,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeParseError {
    pub input: String,
}

impl fmt::Display for TimeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized date format: {:?}", self.input)
    }
}

impl std::error::Error for TimeParseError {}

impl Layout {
    pub fn parse(self, s: &str) -> Option<DateTime<Utc>> {
        match self {
            Layout::Rfc3339 => DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.with_timezone(&Utc)),
            Layout::Rfc822 => DateTime::parse_from_rfc2822(s).ok().map(|dt| dt.with_timezone(&Utc)),
            Layout::Rfc1123 => parse_with_zone(s, "%a, %d %b %Y %H:%M:%S"),
            Layout::DateTime => NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").ok().map(|n| n.and_utc()),
            Layout::DayMonthYear => parse_with_zone(s, "%d %b %Y %H:%M:%S"),
        }
    }
}

pub fn normalize_published(raw: &str) -> Result<DateTime<Utc>, TimeParseError> {
    match_layout(raw)
        .map(|(_, dt)| dt)
        .ok_or_else(|| TimeParseError { input: raw.to_string() })
}

/// First layout that accepts `raw`, with the instant it produced.
pub fn match_layout(raw: &str) -> Option<(Layout, DateTime<Utc>)> {
    let s = raw.trim();
    if s.is_empty() { return None; }
    LAYOUTS.iter().find_map(|layout| layout.parse(s).map(|dt| (*layout, dt)))
}

// "<date-time> <zone>" where zone is a numeric offset or an abbreviation.
fn parse_with_zone(s: &str, fmt: &str) -> Option<DateTime<Utc>> {
    let (local, zone) = s.rsplit_once(' ')?;
    let offset = zone_offset(zone)?;
    let naive = NaiveDateTime::parse_from_str(local.trim_end(), fmt).ok()?;
    offset.from_local_datetime(&naive).single().map(|dt| dt.with_timezone(&Utc))
}

fn zone_offset(zone: &str) -> Option<FixedOffset> {
    if let Some(sign) = zone.strip_prefix('+').map(|_| 1).or_else(|| zone.strip_prefix('-').map(|_| -1)) {
        let digits = zone[1..].replace(':', "");
        if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) { return None; }
        let hours: i32 = digits[..2].parse().ok()?;
        let minutes: i32 = digits[2..].parse().ok()?;
        return FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60));
    }
    if zone.is_empty() || zone.len() > 5 || !zone.bytes().all(|b| b.is_ascii_uppercase()) {
        return None;
    }
    let hours = match zone {
        "UT" | "UTC" | "GMT" | "Z" | "WET" => 0,
        "BST" | "CET" | "WEST" => 1,
        "CEST" | "EET" => 2,
        "EEST" | "MSK" => 3,
        "IST" => return FixedOffset::east_opt(5 * 3600 + 1800),
        "JST" | "KST" => 9,
        "AEST" => 10,
        "AEDT" => 11,
        "EST" => -5,
        "EDT" => -4,
        "CST" => -6,
        "CDT" => -5,
        "MST" => -7,
        "MDT" => -6,
        "PST" => -8,
        "PDT" => -7,
        // unknown abbreviations keep the wall time at a zero offset
        _ => 0,
    };
    FixedOffset::east_opt(hours * 3600)
}
