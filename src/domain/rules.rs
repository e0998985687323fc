//! Applicability rules: the predicate that decides, per interval, whether a
//! charge is in force (spec §3 `ApplicabilityRule`, §4.3).

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::domain::errors::ValidationError;

/// A (month, day) pair with the year deliberately dropped — rules repeat annually.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthDay {
    pub month: u32,
    pub day: u32,
}

impl MonthDay {
    pub fn new(month: u32, day: u32) -> Self {
        MonthDay { month, day }
    }

    fn ordinal(&self) -> u32 {
        self.month * 100 + self.day
    }

    /// True if `self` lies within `[start, end]`, where the window wraps the
    /// year boundary when `end < start` (e.g. Oct 1 - May 31).
    pub fn within(&self, start: MonthDay, end: MonthDay) -> bool {
        let (s, e, m) = (start.ordinal(), end.ordinal(), self.ordinal());
        if s <= e {
            m >= s && m <= e
        } else {
            m >= s || m <= e
        }
    }
}

/// Day classification; mutually exclusive, holiday overrides weekday/weekend.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayClass {
    Weekday,
    Weekend,
    Holiday,
}

/// A single applicability predicate. A charge's effective mask is the
/// bitwise OR of all its rules' masks (§4.3).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ApplicabilityRule {
    pub period_start_time_local: NaiveTime,
    pub period_end_time_local: NaiveTime,
    pub applies_start_md: Option<MonthDay>,
    pub applies_end_md: Option<MonthDay>,
    pub applies_weekdays: bool,
    pub applies_weekends: bool,
    pub applies_holidays: bool,
}

impl ApplicabilityRule {
    pub fn new(
        period_start_time_local: NaiveTime,
        period_end_time_local: NaiveTime,
        applies_start_md: Option<MonthDay>,
        applies_end_md: Option<MonthDay>,
        applies_weekdays: bool,
        applies_weekends: bool,
        applies_holidays: bool,
    ) -> Result<Self, ValidationError> {
        let midnight = NaiveTime::from_hms_opt(0, 0, 0).unwrap();
        let all_day = period_start_time_local == midnight && period_end_time_local == midnight;
        if period_end_time_local <= period_start_time_local && !all_day {
            return Err(ValidationError::InvalidPeriod {
                start: period_start_time_local.to_string(),
                end: period_end_time_local.to_string(),
            });
        }
        if applies_start_md.is_some() != applies_end_md.is_some() {
            return Err(ValidationError::MismatchedMonthDayBounds);
        }
        Ok(ApplicabilityRule {
            period_start_time_local,
            period_end_time_local,
            applies_start_md,
            applies_end_md,
            applies_weekdays,
            applies_weekends,
            applies_holidays,
        })
    }

    /// True when the rule's period-of-day window spans the whole day
    /// (the `00:00`-`00:00` all-day sentinel, §9 open question).
    pub fn is_all_day(&self) -> bool {
        let midnight = NaiveTime::from_hms_opt(0, 0, 0).unwrap();
        self.period_start_time_local == midnight && self.period_end_time_local == midnight
    }

    pub fn day_class_matches(&self, class: DayClass) -> bool {
        match class {
            DayClass::Weekday => self.applies_weekdays,
            DayClass::Weekend => self.applies_weekends,
            DayClass::Holiday => self.applies_holidays,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn all_day_sentinel_accepted() {
        let rule = ApplicabilityRule::new(t(0, 0), t(0, 0), None, None, true, true, true);
        assert!(rule.unwrap().is_all_day());
    }

    #[test]
    fn equal_nonzero_endpoints_rejected() {
        let rule = ApplicabilityRule::new(t(16, 0), t(16, 0), None, None, true, true, true);
        assert!(rule.is_err());
    }

    #[test]
    fn mismatched_month_day_bounds_rejected() {
        let rule = ApplicabilityRule::new(
            t(0, 0),
            t(0, 0),
            Some(MonthDay::new(10, 1)),
            None,
            true,
            true,
            true,
        );
        assert!(rule.is_err());
    }

    #[test]
    fn wrap_year_window_contains_boundary_dates() {
        let start = MonthDay::new(10, 1);
        let end = MonthDay::new(5, 31);
        assert!(MonthDay::new(12, 31).within(start, end));
        assert!(MonthDay::new(1, 1).within(start, end));
        assert!(!MonthDay::new(7, 15).within(start, end));
        assert!(MonthDay::new(3, 15).within(start, end));
        assert!(MonthDay::new(11, 15).within(start, end));
    }
}
