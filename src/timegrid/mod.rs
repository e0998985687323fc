//! TimeGrid: the interval index that everything downstream walks (§4.1).
//!
//! Builds and labels the ordered interval sequence for a request period,
//! decomposing each interval into local wall-clock time, day class, and
//! billing-month assignment. Billing-month boundaries are computed by a
//! single canonical helper (`billing_month_key` / `billing_month_bounds`),
//! reused by `ChargeAllocator::customer` and `ChargeAllocator::demand` for
//! day-of-scope accounting, per §9 design notes.

pub mod errors;

use std::collections::HashSet;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc, Weekday};
use chrono_tz::Tz;

use crate::domain::DayClass;
pub use errors::TimeGridError;

/// A single labeled interval in the grid (spec §4.1).
#[derive(Clone, Debug, PartialEq)]
pub struct Interval {
    pub utc_start: DateTime<Utc>,
    pub utc_end: DateTime<Utc>,
    pub local_start: NaiveDateTime,
    pub local_end: NaiveDateTime,
    pub day_class: DayClass,
    pub billing_month_key: (i32, u32),
}

/// The ordered interval index for a billing computation. Owned by a single
/// computation and discarded after result emission (§3 ownership & lifecycle).
#[derive(Debug)]
pub struct TimeGrid {
    pub intervals: Vec<Interval>,
    pub step_minutes: u32,
}

impl TimeGrid {
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Parses an IANA zone id before delegating to `build`; the natural place
    /// for the `TimeZoneUnknown` failure named in §4.1 to surface when the
    /// caller only has a raw string (e.g. from an ingested customer record).
    pub fn build_from_tz_name(
        start_date_local: NaiveDate,
        end_date_local: NaiveDate,
        tz_name: &str,
        step_minutes: u32,
        billing_day: u32,
        holidays: &HashSet<NaiveDate>,
    ) -> Result<TimeGrid, TimeGridError> {
        let tz = Tz::from_str(tz_name).map_err(|_| TimeGridError::TimeZoneUnknown(tz_name.to_string()))?;
        Self::build(start_date_local, end_date_local, tz, step_minutes, billing_day, holidays)
    }

    /// Builds the grid covering `[start_date_local, end_date_local]` inclusive.
    pub fn build(
        start_date_local: NaiveDate,
        end_date_local: NaiveDate,
        tz: Tz,
        step_minutes: u32,
        billing_day: u32,
        holidays: &HashSet<NaiveDate>,
    ) -> Result<TimeGrid, TimeGridError> {
        if step_minutes == 0 || 1440 % step_minutes != 0 {
            return Err(TimeGridError::InvalidStep(step_minutes));
        }
        if end_date_local < start_date_local {
            return Err(TimeGridError::InvertedPeriod {
                start: start_date_local.to_string(),
                end: end_date_local.to_string(),
            });
        }

        let step = Duration::minutes(step_minutes as i64);
        let first = start_date_local.and_hms_opt(0, 0, 0).unwrap();
        let last_exclusive = end_date_local
            .succ_opt()
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();

        let mut intervals = Vec::new();
        let mut local_cursor = first;
        while local_cursor < last_exclusive {
            let local_end = local_cursor + step;

            for utc_start in resolve_utc_starts(&tz, local_cursor) {
                let utc_end = utc_start + step;
                let day_class = classify_day(local_cursor.date(), holidays);
                let billing_month_key = billing_month_key(local_cursor, billing_day);
                intervals.push(Interval {
                    utc_start,
                    utc_end,
                    local_start: local_cursor,
                    local_end,
                    day_class,
                    billing_month_key,
                });
            }

            local_cursor = local_end;
        }

        intervals.sort_by_key(|i| i.utc_start);

        Ok(TimeGrid { intervals, step_minutes })
    }
}

/// Resolves the local wall-clock time `naive` against `tz`, returning zero,
/// one, or two UTC instants (§4.1 DST policy):
/// - a spring-forward skip yields no instants (the interval simply doesn't exist),
/// - a fall-back repeat yields two, kept distinct by UTC timestamp,
/// - otherwise exactly one.
fn resolve_utc_starts(tz: &Tz, naive: NaiveDateTime) -> Vec<DateTime<Utc>> {
    match tz.from_local_datetime(&naive) {
        LocalResult::None => Vec::new(),
        LocalResult::Single(dt) => vec![dt.with_timezone(&Utc)],
        LocalResult::Ambiguous(a, b) => {
            let mut v = vec![a.with_timezone(&Utc), b.with_timezone(&Utc)];
            v.sort();
            v
        }
    }
}

fn classify_day(date: NaiveDate, holidays: &HashSet<NaiveDate>) -> DayClass {
    if holidays.contains(&date) {
        DayClass::Holiday
    } else {
        match date.weekday() {
            Weekday::Sat | Weekday::Sun => DayClass::Weekend,
            _ => DayClass::Weekday,
        }
    }
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let next_month_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1).unwrap()
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1).unwrap()
    };
    let this_month_first = NaiveDate::from_ymd_opt(year, month, 1).unwrap();
    (next_month_first - this_month_first).num_days() as u32
}

fn closing_date(year: i32, month: u32, billing_day: u32) -> NaiveDate {
    let day = billing_day.min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 { (year + 1, 1) } else { (year, month + 1) }
}

fn prev_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 { (year - 1, 12) } else { (year, month - 1) }
}

/// The half-open local-time window `[prev closing day + 1 00:00, this closing
/// day + 1 00:00)` for the billing month whose closing day falls in
/// `(year, month)`.
pub fn billing_month_bounds(key: (i32, u32), billing_day: u32) -> (NaiveDateTime, NaiveDateTime) {
    let (year, month) = key;
    let (py, pm) = prev_month(year, month);
    let start = closing_date(py, pm, billing_day)
        .succ_opt()
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let end = closing_date(year, month, billing_day)
        .succ_opt()
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    (start, end)
}

/// The canonical billing-month assignment helper (§9 design notes): finds
/// the `(year, month_number)` whose half-open local range contains `local`.
pub fn billing_month_key(local: NaiveDateTime, billing_day: u32) -> (i32, u32) {
    let mut key = (local.year(), local.month());
    for _ in 0..4 {
        let (start, end) = billing_month_bounds(key, billing_day);
        if local < start {
            key = prev_month(key.0, key.1);
        } else if local >= end {
            key = next_month(key.0, key.1);
        } else {
            return key;
        }
    }
    key
}

/// Calendar days spanned by the full billing month identified by `key`,
/// used as the denominator for monthly pro-rating (§4.4.3).
pub fn calendar_days_in_billing_month(key: (i32, u32), billing_day: u32) -> i64 {
    let (start, end) = billing_month_bounds(key, billing_day);
    (end.date() - start.date()).num_days()
}
