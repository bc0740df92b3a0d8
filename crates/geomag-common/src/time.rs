//! Epoch conversions used by geomagnetic models.
//!
//! Models tabulate their coefficients against decimal years and are evaluated
//! in MJD2000 (fractional days since 2000-01-01T00:00:00Z). Both conversions
//! are calendar-aware: a decimal year's fraction is the elapsed share of that
//! particular year, so leap years stretch over 366 days.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};

use crate::error::{GeomagError, GeomagResult};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Parse a timestamp given on the command line or in a config file.
///
/// Accepts RFC 3339 (`2020-01-01T00:00:00Z`), a naive datetime assumed UTC
/// (`2020-01-01T00:00:00`), a plain date (`2020-01-01`) or a decimal year
/// (`2020.5`).
pub fn parse_time(s: &str) -> GeomagResult<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
        return Ok(Utc.from_utc_datetime(&ndt));
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(ndt) = date.and_hms_opt(0, 0, 0) {
            return Ok(Utc.from_utc_datetime(&ndt));
        }
    }

    if let Ok(year) = s.parse::<f64>() {
        return decimal_year_to_datetime(year);
    }

    Err(GeomagError::InvalidTime(s.to_string()))
}

/// Start of the given calendar year.
fn year_start(year: i32) -> GeomagResult<DateTime<Utc>> {
    Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| GeomagError::InvalidTime(format!("year {} out of range", year)))
}

/// Number of days in a calendar year (365 or 366).
pub fn days_in_year(year: i32) -> f64 {
    let leap = (year % 4 == 0 && year % 100 != 0) || year % 400 == 0;
    if leap {
        366.0
    } else {
        365.0
    }
}

/// Days from 2000-01-01 to January 1st of `year` (negative before 2000).
fn mjd2000_of_year_start(year: i32) -> GeomagResult<f64> {
    let start = year_start(year)?;
    let epoch = year_start(2000)?;
    Ok((start - epoch).num_seconds() as f64 / SECONDS_PER_DAY)
}

/// Convert a UTC timestamp to a decimal year.
pub fn datetime_to_decimal_year(time: &DateTime<Utc>) -> GeomagResult<f64> {
    let year = time.year();
    let start = year_start(year)?;
    let elapsed = time.signed_duration_since(start);
    let seconds = elapsed.num_seconds() as f64
        + elapsed.subsec_nanos() as f64 * 1e-9;
    Ok(year as f64 + seconds / (days_in_year(year) * SECONDS_PER_DAY))
}

/// Convert a decimal year to a UTC timestamp (microsecond resolution).
pub fn decimal_year_to_datetime(decimal_year: f64) -> GeomagResult<DateTime<Utc>> {
    if !decimal_year.is_finite() {
        return Err(GeomagError::InvalidTime(format!("{}", decimal_year)));
    }
    let year = decimal_year.floor() as i32;
    let fraction = decimal_year - year as f64;
    let micros = (fraction * days_in_year(year) * SECONDS_PER_DAY * 1e6).round() as i64;
    Ok(year_start(year)? + Duration::microseconds(micros))
}

/// Convert a decimal year to MJD2000.
pub fn decimal_year_to_mjd2000(decimal_year: f64) -> GeomagResult<f64> {
    if !decimal_year.is_finite() {
        return Err(GeomagError::InvalidTime(format!("{}", decimal_year)));
    }
    let year = decimal_year.floor() as i32;
    let fraction = decimal_year - year as f64;
    Ok(mjd2000_of_year_start(year)? + fraction * days_in_year(year))
}

/// Convert MJD2000 to a decimal year.
pub fn mjd2000_to_decimal_year(mjd2000: f64) -> GeomagResult<f64> {
    if !mjd2000.is_finite() {
        return Err(GeomagError::InvalidTime(format!("MJD2000 {}", mjd2000)));
    }
    // Estimate the year, then correct for the calendar boundary.
    let mut year = 2000 + (mjd2000 / 365.25).floor() as i32;
    let mut start = mjd2000_of_year_start(year)?;
    if mjd2000 < start {
        year -= 1;
        start = mjd2000_of_year_start(year)?;
    } else if mjd2000 >= start + days_in_year(year) {
        start += days_in_year(year);
        year += 1;
    }
    Ok(year as f64 + (mjd2000 - start) / days_in_year(year))
}

/// Convert a UTC timestamp directly to MJD2000.
pub fn datetime_to_mjd2000(time: &DateTime<Utc>) -> GeomagResult<f64> {
    decimal_year_to_mjd2000(datetime_to_decimal_year(time)?)
}
