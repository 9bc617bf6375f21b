//! Parsing the `--cutoff` date.
//!
//! Accepts ISO dates and datetimes, bare years and year-months, simple
//! relative expressions (`3 months ago`, `last year`), and falls back to
//! natural language via `chrono-english`. All results are start-of-period
//! instants in UTC, the zone archive timestamps are written in.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use chrono_english::{Dialect, parse_date_string};
use tracing::{debug, trace};

use crate::error::{Result, XstaticError};

/// Parse a cutoff expression relative to the current time.
///
/// # Errors
/// Returns [`XstaticError::InvalidDate`] if the expression cannot be parsed.
pub fn parse_cutoff(input: &str) -> Result<DateTime<Utc>> {
    parse_cutoff_with_base(input, Utc::now())
}

/// Parse a cutoff expression using a fixed base time.
///
/// # Errors
/// Returns [`XstaticError::InvalidDate`] if the expression cannot be parsed.
pub fn parse_cutoff_with_base(input: &str, base: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(XstaticError::invalid_date(input, "cutoff (empty)"));
    }

    if let Some(parsed) = try_parse_iso(trimmed) {
        trace!(input = trimmed, "Parsed ISO cutoff");
        return Ok(parsed);
    }

    let normalized = trimmed.to_lowercase();
    if let Some(parsed) = try_parse_relative(&normalized, base.date_naive()) {
        debug!(input = trimmed, "Parsed relative cutoff");
        return Ok(parsed);
    }

    match parse_date_string(&normalized, base, Dialect::Us) {
        Ok(dt) => {
            debug!(input = trimmed, "Parsed natural language cutoff");
            Ok(dt)
        }
        Err(err) => Err(XstaticError::invalid_date(
            trimmed,
            format!("cutoff ({err})"),
        )),
    }
}

fn try_parse_iso(input: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Some(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return start_of_day(date);
    }

    // "2021-06" and "2021"
    if let Some((year, month)) = input.split_once('-') {
        let year = parse_year(year)?;
        let month = month.parse::<u32>().ok()?;
        return start_of_day(NaiveDate::from_ymd_opt(year, month, 1)?);
    }
    let year = parse_year(input)?;
    start_of_day(NaiveDate::from_ymd_opt(year, 1, 1)?)
}

fn parse_year(token: &str) -> Option<i32> {
    if token.len() != 4 || !token.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

#[derive(Clone, Copy)]
enum RelativeUnit {
    Day,
    Week,
    Month,
    Year,
}

fn parse_unit(token: &str) -> Option<RelativeUnit> {
    match token.trim_end_matches('s') {
        "day" => Some(RelativeUnit::Day),
        "week" => Some(RelativeUnit::Week),
        "month" => Some(RelativeUnit::Month),
        "year" => Some(RelativeUnit::Year),
        _ => None,
    }
}

fn try_parse_relative(input: &str, base: NaiveDate) -> Option<DateTime<Utc>> {
    let tokens: Vec<&str> = input.split_whitespace().collect();

    let date = match tokens.as_slice() {
        ["today"] => base,
        ["yesterday"] => base.pred_opt()?,
        ["this", "month"] => NaiveDate::from_ymd_opt(base.year(), base.month(), 1)?,
        ["this", "year"] => NaiveDate::from_ymd_opt(base.year(), 1, 1)?,
        ["last" | "past", unit] => shift(base, 1, parse_unit(unit)?)?,
        ["last" | "past", count, unit] | [count, unit, "ago"] => {
            let count = count.parse::<u32>().ok().filter(|n| *n > 0)?;
            shift(base, count, parse_unit(unit)?)?
        }
        _ => return None,
    };

    start_of_day(date)
}

fn shift(base: NaiveDate, count: u32, unit: RelativeUnit) -> Option<NaiveDate> {
    match unit {
        RelativeUnit::Day => base.checked_sub_signed(Duration::days(i64::from(count))),
        RelativeUnit::Week => base.checked_sub_signed(Duration::weeks(i64::from(count))),
        RelativeUnit::Month => base.checked_sub_months(chrono::Months::new(count)),
        RelativeUnit::Year => base.checked_sub_months(chrono::Months::new(count.checked_mul(12)?)),
    }
}

fn start_of_day(date: NaiveDate) -> Option<DateTime<Utc>> {
    Some(date.and_time(NaiveTime::MIN).and_utc())
}
