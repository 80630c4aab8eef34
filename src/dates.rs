//! Best-effort normalization of the date strings found on listing pages.
//!
//! Listing pages expose dates in whatever shape their templates happen to
//! use: a machine readable `datetime` attribute, an RFC 2822 string, or
//! human text such as `March 4, 2024`. [`parse_date`] turns all of them into
//! a UTC timestamp and never fails; anything it cannot read becomes "now".
//!
//! # Recognized shapes
//!
//! | Shape | Example |
//! |-------|---------|
//! | RFC 3339 | `2024-03-04T17:00:00Z` |
//! | RFC 2822 | `Mon, 04 Mar 2024 17:00:00 +0000` |
//! | ISO date-time, compact offset | `2024-03-04T17:00Z`, `2024-03-04T17:00:00+0000` |
//! | ISO date-time, no offset (UTC) | `2024-03-04T17:00:00`, `2024-03-04 17:00:00` |
//! | Month-name day year | `March 4, 2024`, `Mar 4 2024` |
//! | Numeric slash | `3/4/2024` (month first), `25/12/2024` |
//! | ISO-like date | `2024-3-4`, also the date part of `2024-03-04T...` |
//!
//! Date-only shapes resolve to midnight UTC.

use chrono::{DateTime, Month, NaiveDate, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static MONTH_DAY_YEAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([A-Za-z]+)\.?\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(\d{4})\b")
        .expect("month-name date pattern")
});

static SLASH_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b").expect("slash date pattern"));

static ISO_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{4})-(\d{1,2})-(\d{1,2})(?:T|\b)").expect("iso date pattern"));

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
];

// `%#z` accepts `Z`, `+0000` and `+00:00`.
const OFFSET_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M%#z",
    "%Y-%m-%dT%H:%M:%S%#z",
    "%Y-%m-%dT%H:%M:%S%.f%#z",
];

/// Parse a scraped date string, falling back to the current time.
///
/// `None`, empty input, and text in none of the recognized shapes all
/// produce `Utc::now()`. A single unreadable date must never stop the
/// extraction of the article it belongs to.
pub fn parse_date(raw: Option<&str>) -> DateTime<Utc> {
    match raw.and_then(try_parse_date) {
        Some(ts) => ts,
        None => {
            debug!(raw = ?raw, "Unrecognized date; using current time");
            Utc::now()
        }
    }
}

/// Parse a scraped date string without the "now" fallback.
///
/// Returns `None` when the string matches none of the recognized shapes or
/// names an impossible calendar date.
pub fn try_parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    parse_direct(raw).or_else(|| parse_textual(raw).and_then(at_midnight))
}

fn parse_direct(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Some(dt) = OFFSET_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| DateTime::parse_from_str(raw, fmt).ok())
    {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn parse_textual(raw: &str) -> Option<NaiveDate> {
    month_name_date(raw)
        .or_else(|| slash_date(raw))
        .or_else(|| iso_date(raw))
}

fn month_name_date(raw: &str) -> Option<NaiveDate> {
    MONTH_DAY_YEAR.captures_iter(raw).find_map(|caps| {
        let month = caps[1].parse::<Month>().ok()?;
        let day = caps[2].parse().ok()?;
        let year = caps[3].parse().ok()?;
        NaiveDate::from_ymd_opt(year, month.number_from_month(), day)
    })
}

fn slash_date(raw: &str) -> Option<NaiveDate> {
    let caps = SLASH_DATE.captures(raw)?;
    let first: u32 = caps[1].parse().ok()?;
    let second: u32 = caps[2].parse().ok()?;
    let year: i32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, first, second).or_else(|| NaiveDate::from_ymd_opt(year, second, first))
}

fn iso_date(raw: &str) -> Option<NaiveDate> {
    let caps = ISO_DATE.captures(raw)?;
    NaiveDate::from_ymd_opt(
        caps[1].parse().ok()?,
        caps[2].parse().ok()?,
        caps[3].parse().ok()?,
    )
}

fn at_midnight(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
    }

    fn assert_is_now(ts: DateTime<Utc>) {
        let delta = (Utc::now() - ts).num_seconds().abs();
        assert!(delta < 5, "expected a timestamp close to now, got {ts}");
    }

    #[test]
    fn test_rfc3339() {
        assert_eq!(
            try_parse_date("2024-03-04T17:00:00Z"),
            Some(utc(2024, 3, 4, 17, 0, 0))
        );
        assert_eq!(
            try_parse_date("2024-03-04T19:00:00+02:00"),
            Some(utc(2024, 3, 4, 17, 0, 0))
        );
    }

    #[test]
    fn test_rfc2822() {
        assert_eq!(
            try_parse_date("Mon, 04 Mar 2024 17:00:00 +0000"),
            Some(utc(2024, 3, 4, 17, 0, 0))
        );
    }

    #[test]
    fn test_naive_datetime_is_utc() {
        assert_eq!(
            try_parse_date("2024-03-04T17:30:00"),
            Some(utc(2024, 3, 4, 17, 30, 0))
        );
        assert_eq!(
            try_parse_date("2024-03-04 08:15:00"),
            Some(utc(2024, 3, 4, 8, 15, 0))
        );
    }

    #[test]
    fn test_month_name_shapes() {
        let expected = Some(utc(2024, 3, 4, 0, 0, 0));
        assert_eq!(try_parse_date("March 4, 2024"), expected);
        assert_eq!(try_parse_date("Mar 4 2024"), expected);
        assert_eq!(try_parse_date("mar. 4, 2024"), expected);
        assert_eq!(try_parse_date("Published March 4th, 2024 by the team"), expected);
    }

    #[test]
    fn test_month_name_skips_non_month_words() {
        assert_eq!(
            try_parse_date("Issue 12 2023, released May 9, 2024"),
            Some(utc(2024, 5, 9, 0, 0, 0))
        );
    }

    #[test]
    fn test_slash_dates() {
        assert_eq!(try_parse_date("3/4/2024"), Some(utc(2024, 3, 4, 0, 0, 0)));
        // 25 cannot be a month, so the day comes first.
        assert_eq!(try_parse_date("25/12/2024"), Some(utc(2024, 12, 25, 0, 0, 0)));
        assert_eq!(try_parse_date("31/31/2024"), None);
    }

    #[test]
    fn test_iso_like_date() {
        assert_eq!(try_parse_date("2024-3-4"), Some(utc(2024, 3, 4, 0, 0, 0)));
        assert_eq!(try_parse_date("2024-03-04"), Some(utc(2024, 3, 4, 0, 0, 0)));
        assert_eq!(try_parse_date("2024-13-40"), None);
    }

    #[test]
    fn test_compact_offsets() {
        let expected = Some(utc(2024, 3, 4, 17, 0, 0));
        assert_eq!(try_parse_date("2024-03-04T17:00Z"), expected);
        assert_eq!(try_parse_date("2024-03-04T17:00:00+0000"), expected);
        assert_eq!(try_parse_date("2024-03-04T17:00:00.000+0000"), expected);
        assert_eq!(try_parse_date("2024-03-04T19:00+0200"), expected);
    }

    #[test]
    fn test_unreadable_time_keeps_the_date() {
        assert_eq!(
            try_parse_date("2024-03-04T99:99:99"),
            Some(utc(2024, 3, 4, 0, 0, 0))
        );
        assert_eq!(
            try_parse_date("2024-03-04T17:00 PST"),
            Some(utc(2024, 3, 4, 0, 0, 0))
        );
    }

    #[test]
    fn test_unrecognized_is_none() {
        assert_eq!(try_parse_date(""), None);
        assert_eq!(try_parse_date("   "), None);
        assert_eq!(try_parse_date("yesterday"), None);
        assert_eq!(try_parse_date("Febtober 40, 2024"), None);
    }

    #[test]
    fn test_parse_date_falls_back_to_now() {
        assert_is_now(parse_date(None));
        assert_is_now(parse_date(Some("")));
        assert_is_now(parse_date(Some("not a date at all")));
        assert_is_now(parse_date(Some("\u{0}\u{ffff}//--")));
    }

    #[test]
    fn test_parse_date_never_panics_on_garbage() {
        let inputs = [
            "99/99/9999",
            "0000-00-00",
            "January 0, 2024",
            "February 30, 2024",
            "9999999999-1-1",
            "::::",
        ];
        for raw in inputs {
            assert_eq!(try_parse_date(raw), None, "{raw} should not parse");
            assert_is_now(parse_date(Some(raw)));
        }
    }

    #[test]
    fn test_parse_date_keeps_valid_dates() {
        assert_eq!(
            parse_date(Some("2023-11-06T18:00:00.000Z")),
            utc(2023, 11, 6, 18, 0, 0)
        );
    }
}
