//! Date helpers for post metadata, feeds and health snapshots.
//!
//! Post dates are free-form strings written by hand, so parsing is lenient:
//!
//! - `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DD HH:MM`, `YYYY-MM-DDTHH:MM:SS`
//! - `YYYY-MM-DD`
//! - RFC 3339 with an explicit offset (`2024-06-15T14:30:45+08:00`)
//!
//! Dates without an offset are interpreted in the site's configured UTC
//! offset when formatted for RSS.
//!
//! # Examples
//!
//! ```ignore
//! let offset = parse_utc_offset("+08:00").unwrap();
//! assert_eq!(
//!     to_rfc2822("2024-06-15 14:30:45", offset).unwrap(),
//!     "Sat, 15 Jun 2024 14:30:45 +0800"
//! );
//! ```

use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, TimeZone};

/// Display format used for post dates and `last_updated` stamps.
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Current local wall-clock time.
pub fn now_local() -> NaiveDateTime {
    Local::now().naive_local()
}

/// Format as `YYYY-MM-DD HH:MM:SS`.
pub fn format_display(dt: NaiveDateTime) -> String {
    dt.format(DISPLAY_FORMAT).to_string()
}

/// Parse a post date without timezone information.
pub fn parse_naive(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Resolve a post date to an absolute time, using `offset` when the string has none.
pub fn parse_with_offset(s: &str, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s.trim()) {
        return Some(dt);
    }
    let naive = parse_naive(s)?;
    offset.from_local_datetime(&naive).single()
}

/// Format a post date as RFC 2822 for RSS `pubDate`.
pub fn to_rfc2822(s: &str, offset: FixedOffset) -> Option<String> {
    parse_with_offset(s, offset).map(|dt| dt.to_rfc2822())
}

/// Parse `+HH:MM`, `-HHMM`, `+HH` or `Z` into a fixed offset.
pub fn parse_utc_offset(s: &str) -> Option<FixedOffset> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("z") {
        return FixedOffset::east_opt(0);
    }

    let (sign, rest) = match s.as_bytes().first()? {
        b'+' => (1, &s[1..]),
        b'-' => (-1, &s[1..]),
        _ => return None,
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let (hours, minutes) = match digits.len() {
        2 => (digits.parse::<i32>().ok()?, 0),
        4 => (digits[..2].parse::<i32>().ok()?, digits[2..].parse::<i32>().ok()?),
        _ => return None,
    };
    if hours > 23 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
