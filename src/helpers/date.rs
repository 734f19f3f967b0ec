//! Date helper functions

use chrono::{DateTime, FixedOffset, TimeZone};

/// Format a date using a date-fns style format string
///
/// # Examples
/// ```ignore
/// format_date(&date, "dd MMM yyyy") // -> "15 Mar 2021"
/// ```
pub fn format_date<Tz: TimeZone>(date: &DateTime<Tz>, format: &str) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let chrono_format = date_fns_to_chrono_format(format);
    date.format(&chrono_format).to_string()
}

/// Format a publication date in the site timezone
pub fn format_in<Z: TimeZone>(date: &DateTime<FixedOffset>, tz: &Z, format: &str) -> String
where
    Z::Offset: std::fmt::Display,
{
    format_date(&date.with_timezone(tz), format)
}

/// Format a date in ISO 8601 / XML format
pub fn date_xml<Tz: TimeZone>(date: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    date.format("%Y-%m-%dT%H:%M:%S%:z").to_string()
}

/// Convert date-fns format tokens to chrono format
fn date_fns_to_chrono_format(format: &str) -> String {
    // Longest tokens first within each letter; tokens are case-sensitive
    // so `MM` (month) and `mm` (minute) never collide
    let replacements = [
        // Year
        ("yyyy", "%Y"),
        ("yy", "%y"),
        // Month
        ("MMMM", "%B"),
        ("MMM", "%b"),
        ("MM", "%m"),
        // Day of month
        ("dd", "%d"),
        // Weekday
        ("EEEE", "%A"),
        ("EEE", "%a"),
        // Hour 24h / 12h
        ("HH", "%H"),
        ("hh", "%I"),
        // Minute
        ("mm", "%M"),
        // Second
        ("ss", "%S"),
    ];

    let mut result = format.to_string();

    for (from, to) in replacements {
        result = result.replace(from, to);
    }

    result
}
