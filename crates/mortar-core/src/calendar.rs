//! # Calendar Windows
//!
//! Converts the store's calendar days and months into half-open UTC
//! instant ranges `[start, end)` that reports bind against stored
//! timestamps.
//!
//! ```text
//! local day 2024-03-15  ──►  [2024-03-15 00:00 local, 2024-03-16 00:00 local)
//!                       ──►  [.. UTC, .. UTC)   (WHERE sold_at >= ?1 AND sold_at < ?2)
//! ```
//!
//! Functions are generic over the time zone so tests can pin `Utc` or a
//! fixed offset while the application passes `chrono::Local`.

use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::error::ValidationError;
use crate::validation::{validate_date_range, validate_month, ValidationResult};

/// Half-open UTC window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl Window {
    /// Whether `instant` falls inside the window.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }
}

/// Start of `day` in `tz`, as UTC.
///
/// On a DST gap at midnight the earliest valid instant after it is used.
fn start_of_day<Tz: TimeZone>(tz: &Tz, day: NaiveDate) -> DateTime<Utc> {
    let midnight = day.and_time(chrono::NaiveTime::MIN);
    resolve_local(tz, midnight)
}

fn resolve_local<Tz: TimeZone>(tz: &Tz, local: NaiveDateTime) -> DateTime<Utc> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => dt.with_timezone(&Utc),
        LocalResult::Ambiguous(earliest, _) => earliest.with_timezone(&Utc),
        LocalResult::None => {
            // Skipped hour: step forward until the local clock exists again.
            let mut candidate = local;
            for _ in 0..4 {
                candidate += Duration::minutes(30);
                if let Some(dt) = tz.from_local_datetime(&candidate).earliest() {
                    return dt.with_timezone(&Utc);
                }
            }
            Utc.from_utc_datetime(&local)
        }
    }
}

fn next_day(day: NaiveDate) -> ValidationResult<NaiveDate> {
    day.succ_opt().ok_or_else(|| ValidationError::InvalidFormat {
        field: "date".to_string(),
        reason: "out of supported range".to_string(),
    })
}

/// Window covering one calendar day.
pub fn day_window<Tz: TimeZone>(tz: &Tz, day: NaiveDate) -> ValidationResult<Window> {
    Ok(Window {
        start: start_of_day(tz, day),
        end: start_of_day(tz, next_day(day)?),
    })
}

/// Window covering the inclusive calendar-day range `[first, last]`.
///
/// ## Example
/// ```rust
/// use chrono::{NaiveDate, Utc};
/// use mortar_core::calendar::range_window;
///
/// let first = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
/// let last = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
/// let window = range_window(&Utc, first, last).unwrap();
/// assert_eq!((window.end - window.start).num_days(), 31);
///
/// assert!(range_window(&Utc, last, first).is_err());
/// ```
pub fn range_window<Tz: TimeZone>(
    tz: &Tz,
    first: NaiveDate,
    last: NaiveDate,
) -> ValidationResult<Window> {
    validate_date_range(first, last)?;
    Ok(Window {
        start: start_of_day(tz, first),
        end: start_of_day(tz, next_day(last)?),
    })
}

/// Window covering a calendar month.
pub fn month_window<Tz: TimeZone>(tz: &Tz, year: i32, month: u32) -> ValidationResult<Window> {
    validate_month(month)?;
    let invalid = || ValidationError::InvalidFormat {
        field: "year".to_string(),
        reason: "out of supported range".to_string(),
    };

    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let following = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(invalid)?;

    Ok(Window {
        start: start_of_day(tz, first),
        end: start_of_day(tz, following),
    })
}

/// `(year, month)` of `day`.
pub fn year_month(day: NaiveDate) -> (i32, u32) {
    (day.year(), day.month())
}
