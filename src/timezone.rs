//! Calendar helpers pinned to Western Indonesia Time (WIB, UTC+7).
//!
//! Day and month boundaries for reports and the monthly payout rule are
//! always taken in WIB, whatever the server clock's zone is.

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, TimeZone, Utc};

use crate::error::{AppError, AppResult};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
const WIB_DISPLAY_FORMAT: &str = "%d-%m-%Y %H:%M:%S WIB";

/// Calendar years accepted from clients.
pub const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1900..=9999;

pub fn wib() -> FixedOffset {
    FixedOffset::east_opt(7 * 3600).expect("UTC+7 is a valid offset")
}

fn out_of_range() -> AppError {
    AppError::InvalidInput("Tanggal di luar jangkauan.".into())
}

/// Start of `date` (00:00 WIB) as a UTC instant.
pub fn start_of_day(date: NaiveDate) -> AppResult<DateTime<Utc>> {
    let midnight = date.and_hms_opt(0, 0, 0).ok_or_else(out_of_range)?;
    wib()
        .from_local_datetime(&midnight)
        .single()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(out_of_range)
}

/// Half-open range `[start 00:00, (end + 1 day) 00:00)` in WIB, which is the
/// inclusive day range `[start, end]`.
pub fn day_range(start: NaiveDate, end: NaiveDate) -> AppResult<(DateTime<Utc>, DateTime<Utc>)> {
    if end < start {
        return Err(AppError::InvalidInput(
            "end_date tidak boleh sebelum start_date.".into(),
        ));
    }
    let next = end
        .succ_opt()
        .ok_or_else(|| AppError::InvalidInput("end_date di luar jangkauan.".into()))?;
    Ok((start_of_day(start)?, start_of_day(next)?))
}

/// First day of the WIB calendar month that contains `instant`.
pub fn month_of(instant: DateTime<Utc>) -> AppResult<NaiveDate> {
    let local = instant.with_timezone(&wib()).date_naive();
    first_of_month(local.year(), local.month())
}

/// Half-open range covering the whole WIB month that starts at `periode`.
pub fn month_range(periode: NaiveDate) -> AppResult<(DateTime<Utc>, DateTime<Utc>)> {
    let first = first_of_month(periode.year(), periode.month())?;
    let next = if first.month() == 12 {
        first_of_month(first.year() + 1, 1)?
    } else {
        first_of_month(first.year(), first.month() + 1)?
    };
    Ok((start_of_day(first)?, start_of_day(next)?))
}

pub fn parse_date(raw: &str, field: &str) -> AppResult<NaiveDate> {
    let date = NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|_| {
        AppError::InvalidInput(format!(
            "Format {field} tidak valid. Gunakan format YYYY-MM-DD."
        ))
    })?;
    check_year(date.year())?;
    Ok(date)
}

/// Parses `YYYY-MM` into the first day of that month.
pub fn parse_month(raw: &str) -> AppResult<NaiveDate> {
    let invalid = || AppError::InvalidInput("Format month tidak valid. Gunakan format YYYY-MM.".into());
    let (year, month) = raw.trim().split_once('-').ok_or_else(invalid)?;
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    check_year(year)?;
    Ok(first)
}

/// Accepts an RFC 3339 timestamp or a bare `YYYY-MM-DD` (00:00 WIB).
pub fn parse_due_date(raw: &str) -> AppResult<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        check_year(instant.year())?;
        return Ok(instant.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| {
        AppError::InvalidInput(
            "Format due_date tidak valid. Gunakan RFC 3339 atau YYYY-MM-DD.".into(),
        )
    })?;
    check_year(date.year())?;
    start_of_day(date)
}

/// `dd-mm-yyyy HH:MM:SS WIB`, the display format used in payout responses.
pub fn format_wib(instant: DateTime<Utc>) -> String {
    instant.with_timezone(&wib()).format(WIB_DISPLAY_FORMAT).to_string()
}

fn check_year(year: i32) -> AppResult<()> {
    if YEAR_RANGE.contains(&year) {
        Ok(())
    } else {
        Err(AppError::InvalidInput(format!(
            "Tahun harus di antara {} dan {}.",
            YEAR_RANGE.start(),
            YEAR_RANGE.end()
        )))
    }
}

fn first_of_month(year: i32, month: u32) -> AppResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(out_of_range)
}
