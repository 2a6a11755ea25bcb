use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").unwrap());

/// Parse a strict `YYYY-MM-DD` string.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let caps = DATE_RE.captures(s)?;
    let year: i32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let day: u32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Long display form of a manifest date, e.g. `2024-03-14` → `14 March 2024`.
///
/// Anything that is not a valid calendar date comes back unchanged.
pub fn format_date(s: &str) -> String {
    match parse_date(s) {
        Some(date) => date.format("%-d %B %Y").to_string(),
        None => s.to_string(),
    }
}
