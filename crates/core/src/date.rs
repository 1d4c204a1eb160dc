//! Effective-date handling
//!
//! Effective dates are supplied by callers at day granularity
//! (`YYYY-MM-DD`) and stored as UTC timestamps at the start of that day.
//! Versions written without an explicit date take effect at their
//! creation instant.
//!
//! All timestamps produced here are truncated to microseconds so that they
//! survive a round trip through text storage unchanged.
//!
//! Only years 0001..=9999 are accepted. Inside that range every timestamp
//! has a four-digit year, so its fixed-width text form sorts like time.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, SubsecRound, TimeZone, Utc};

use crate::error::{Error, Result};

/// Calendar format accepted for effective dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Earliest accepted year
pub const MIN_YEAR: i32 = 1;

/// Latest accepted year
pub const MAX_YEAR: i32 = 9999;

/// Current time, truncated to microsecond precision
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Parse a `YYYY-MM-DD` calendar date
///
/// Returns `None` for anything else, including dates with a time part and
/// signed or five-digit years.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    let shaped = s.len() == 10
        && s.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shaped {
        return None;
    }
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .ok()
        .filter(|d| is_in_range(*d))
}

/// True if `date` falls in years 0001..=9999
pub fn is_in_range(date: NaiveDate) -> bool {
    (MIN_YEAR..=MAX_YEAR).contains(&date.year())
}

/// Reject dates outside years 0001..=9999
///
/// # Errors
///
/// Returns `InvalidDate` for out-of-range dates.
pub fn check_range(date: NaiveDate) -> Result<NaiveDate> {
    if is_in_range(date) {
        Ok(date)
    } else {
        Err(Error::InvalidDate {
            date: date.to_string(),
        })
    }
}

/// Midnight UTC at the start of `date`
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::default()))
}

/// Exclusive upper bound for "on or before `date`"
pub fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    match date.succ_opt() {
        Some(next) => start_of_day(next),
        None => DateTime::<Utc>::MAX_UTC,
    }
}

/// Last microsecond of `date`
///
/// Inclusive upper bound for "on or before `date`". Unlike `end_of_day`
/// it stays on `date`, so its year never leaves the accepted range.
pub fn last_instant_of_day(date: NaiveDate) -> DateTime<Utc> {
    end_of_day(date) - Duration::microseconds(1)
}

/// True if an instant falls on or before the given calendar day
pub fn is_on_or_before(instant: DateTime<Utc>, date: NaiveDate) -> bool {
    instant < end_of_day(date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn test_parse_date() {
        let d = parse_date("2024-02-29").unwrap();
        assert_eq!((d.year(), d.month(), d.day()), (2024, 2, 29));
        assert!(parse_date("2023-02-29").is_none());
        assert!(parse_date("2024-01-01T00:00:00").is_none());
        assert!(parse_date("yesterday").is_none());
        assert!(parse_date(" 2024-01-01 ").is_some());
    }

    #[test]
    fn test_parse_date_rejects_signed_and_wide_years() {
        assert!(parse_date("-0001-01-01").is_none());
        assert!(parse_date("+10000-01-01").is_none());
        assert!(parse_date("+2024-01-01").is_none());
        assert!(parse_date("0000-01-01").is_none());
        assert!(parse_date("2024-1-01").is_none());
        assert!(parse_date("0001-01-01").is_some());
        assert!(parse_date("9999-12-31").is_some());
    }

    #[test]
    fn test_check_range() {
        let ok = parse_date("2024-01-01").unwrap();
        assert_eq!(check_range(ok).unwrap(), ok);

        let too_late = NaiveDate::from_ymd_opt(10000, 1, 1).unwrap();
        let too_early = NaiveDate::from_ymd_opt(-1, 1, 1).unwrap();
        assert!(matches!(check_range(too_late), Err(Error::InvalidDate { .. })));
        assert!(matches!(check_range(too_early), Err(Error::InvalidDate { .. })));
    }

    #[test]
    fn test_last_instant_of_last_day_keeps_four_digit_year() {
        let last = parse_date("9999-12-31").unwrap();
        let ts = last_instant_of_day(last);
        assert_eq!(ts.date_naive(), last);
        assert_eq!(ts.hour(), 23);
        assert_eq!(ts.nanosecond(), 999_999_000);
        assert!(is_on_or_before(ts, last));
    }

    #[test]
    fn test_start_of_day_is_midnight() {
        let ts = start_of_day(parse_date("2024-05-01").unwrap());
        assert_eq!(ts.hour(), 0);
        assert_eq!(ts.minute(), 0);
        assert_eq!(ts.date_naive(), parse_date("2024-05-01").unwrap());
    }

    #[test]
    fn test_on_or_before_covers_whole_day() {
        let day = parse_date("2024-05-01").unwrap();
        let late = start_of_day(day) + chrono::Duration::hours(23);
        let next = start_of_day(parse_date("2024-05-02").unwrap());

        assert!(is_on_or_before(start_of_day(day), day));
        assert!(is_on_or_before(late, day));
        assert!(!is_on_or_before(next, day));
    }

    #[test]
    fn test_now_has_microsecond_precision() {
        let ts = now();
        assert_eq!(ts.nanosecond() % 1_000, 0);
    }
}
