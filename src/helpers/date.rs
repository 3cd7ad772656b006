//! Date helper functions
//!
//! Post dates are free-form strings taken from front matter or a heading.
//! They are only reformatted when they parse; otherwise they are shown as-is.

use chrono::NaiveDate;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%B %d, %Y", "%b %d, %Y"];

/// Parse a post date string in the formats authors actually write
pub fn parse_post_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }

    // Dates with a time component, e.g. "2025-10-10 09:00:00" or RFC 3339
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    chrono::DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.date_naive())
}

/// Format a date like "October 10, 2025", or return the input unchanged
pub fn format_long_date(s: &str) -> String {
    match parse_post_date(s) {
        Some(d) => d.format("%B %-d, %Y").to_string(),
        None => s.trim().to_string(),
    }
}
