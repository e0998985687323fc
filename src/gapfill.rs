//! GapFiller: detects missing intervals in the usage series and repairs them
//! with one of the declared strategies (§4.2).

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::money::{Kw, Kwh};
use crate::domain::UsageInterval;
use crate::errors::BillingError;
use crate::timegrid::TimeGrid;

/// Gap-repair strategy selected by the caller (§6 `compute_bill` parameter).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapStrategy {
    ExtrapolateLast,
    LinearInterpolate,
}

/// One row of the fully-populated usage series, aligned 1:1 with the `TimeGrid`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FilledRow {
    pub energy: Kwh,
    pub peak_demand: Kw,
    /// True when this row did not come directly from the input usage stream.
    pub filled: bool,
}

/// The fully-populated usage series; always has exactly `|TimeGrid|` rows (§4.2 invariant).
#[derive(Debug)]
pub struct FilledUsage {
    pub rows: Vec<FilledRow>,
}

/// Per-billing-month gap statistics (§3 `BillResult.gaps`).
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthGaps {
    pub absent_count: usize,
    pub longest_gap_minutes: i64,
}

/// The gap report keyed by billing month.
#[derive(Debug, Default)]
pub struct GapReport {
    pub by_month: HashMap<(i32, u32), MonthGaps>,
}

/// Fills `usage` against `grid`, returning the populated series and a gap report.
pub fn fill(grid: &TimeGrid, usage: &[UsageInterval], strategy: GapStrategy) -> Result<(FilledUsage, GapReport), BillingError> {
    let by_start: HashMap<DateTime<Utc>, &UsageInterval> =
        usage.iter().map(|u| (u.interval_start_utc, u)).collect();

    let present: Vec<Option<(Kwh, Kw)>> = grid
        .intervals
        .iter()
        .map(|i| by_start.get(&i.utc_start).map(|u| (u.energy, u.peak_demand)))
        .collect();

    let any_present = present.iter().any(Option::is_some);

    let rows = match strategy {
        GapStrategy::ExtrapolateLast => fill_extrapolate_last(&present),
        GapStrategy::LinearInterpolate => {
            if !any_present {
                return Err(BillingError::MissingData(
                    "linear_interpolate has no observations to interpolate from".to_string(),
                ));
            }
            fill_linear_interpolate(&present)
        }
    };

    let report = build_gap_report(grid, &present);

    Ok((FilledUsage { rows }, report))
}

fn fill_extrapolate_last(present: &[Option<(Kwh, Kw)>]) -> Vec<FilledRow> {
    let n = present.len();
    let mut rows = vec![
        FilledRow { energy: Kwh::ZERO, peak_demand: Kw::ZERO, filled: true };
        n
    ];
    let mut resolved = vec![false; n];

    let mut last_seen: Option<(Kwh, Kw)> = None;
    for i in 0..n {
        match present[i] {
            Some((e, d)) => {
                last_seen = Some((e, d));
                rows[i] = FilledRow { energy: e, peak_demand: d, filled: false };
                resolved[i] = true;
            }
            None => {
                if let Some((e, d)) = last_seen {
                    rows[i] = FilledRow { energy: e, peak_demand: d, filled: true };
                    resolved[i] = true;
                }
            }
        }
    }

    // Leading gap with nothing preceding: fall back to the next following present value.
    let mut next_seen: Option<(Kwh, Kw)> = None;
    for i in (0..n).rev() {
        match present[i] {
            Some((e, d)) => next_seen = Some((e, d)),
            None => {
                if !resolved[i] {
                    if let Some((e, d)) = next_seen {
                        rows[i] = FilledRow { energy: e, peak_demand: d, filled: true };
                    }
                    // else: no observations anywhere — the declared zero fallback (§4.2).
                }
            }
        }
    }

    rows
}

fn fill_linear_interpolate(present: &[Option<(Kwh, Kw)>]) -> Vec<FilledRow> {
    let n = present.len();
    let mut rows: Vec<FilledRow> = present
        .iter()
        .map(|p| match p {
            Some((e, d)) => FilledRow { energy: *e, peak_demand: *d, filled: false },
            None => FilledRow { energy: Kwh::ZERO, peak_demand: Kw::ZERO, filled: true },
        })
        .collect();

    let mut i = 0;
    while i < n {
        if present[i].is_some() {
            i += 1;
            continue;
        }
        let gap_start = i;
        let mut gap_end = i;
        while gap_end < n && present[gap_end].is_none() {
            gap_end += 1;
        }
        // Gap spans [gap_start, gap_end).
        let left = if gap_start > 0 { present[gap_start - 1] } else { None };
        let right = if gap_end < n { present[gap_end] } else { None };

        match (left, right) {
            (Some(l), Some(r)) => {
                let span = Decimal::from((gap_end - gap_start + 1) as i64);
                for (step, k) in (gap_start..gap_end).enumerate() {
                    let t = Decimal::from((step + 1) as i64) / span;
                    let e = Kwh(l.0.0 + (r.0.0 - l.0.0) * t);
                    let d = Kw(l.1.0 + (r.1.0 - l.1.0) * t);
                    rows[k] = FilledRow { energy: e, peak_demand: d, filled: true };
                }
            }
            (Some(l), None) => {
                for k in gap_start..gap_end {
                    rows[k] = FilledRow { energy: l.0, peak_demand: l.1, filled: true };
                }
            }
            (None, Some(r)) => {
                for k in gap_start..gap_end {
                    rows[k] = FilledRow { energy: r.0, peak_demand: r.1, filled: true };
                }
            }
            (None, None) => {
                // Unreachable when `any_present` was checked by the caller.
            }
        }

        i = gap_end;
    }

    rows
}

fn build_gap_report(grid: &TimeGrid, present: &[Option<(Kwh, Kw)>]) -> GapReport {
    let mut report = GapReport::default();
    let step = grid.step_minutes as i64;

    let n = present.len();
    let mut i = 0;
    while i < n {
        if present[i].is_some() {
            i += 1;
            continue;
        }
        let run_start = i;
        let mut j = i;
        while j < n && present[j].is_none() {
            j += 1;
        }

        // Split the run by billing month so each month's longest-gap figure
        // reflects only the portion of the gap that falls in that month.
        let mut k = run_start;
        while k < j {
            let month = grid.intervals[k].billing_month_key;
            let mut m = k;
            while m < j && grid.intervals[m].billing_month_key == month {
                m += 1;
            }
            let sub_len = (m - k) as i64;
            let entry = report.by_month.entry(month).or_default();
            entry.absent_count += (m - k);
            entry.longest_gap_minutes = entry.longest_gap_minutes.max(sub_len * step);
            k = m;
        }

        i = j;
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::collections::HashSet;

    fn grid(n_hours: i64) -> TimeGrid {
        TimeGrid::build(
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + chrono::Duration::hours(n_hours - 1),
            chrono_tz::UTC,
            60,
            31,
            &HashSet::new(),
        )
        .unwrap()
    }

    fn usage_at(grid: &TimeGrid, idx: usize, energy: Decimal, demand: Decimal) -> UsageInterval {
        let iv = &grid.intervals[idx];
        UsageInterval::new(iv.utc_start, iv.utc_end, Kwh(energy), Kw(demand), 60).unwrap()
    }

    #[test]
    fn extrapolate_last_uses_preceding_value() {
        let grid = grid(24);
        let usage = vec![usage_at(&grid, 0, dec!(5), dec!(1))];
        let (filled, _report) = fill(&grid, &usage, GapStrategy::ExtrapolateLast).unwrap();
        assert_eq!(filled.rows.len(), 24);
        assert_eq!(filled.rows[10].energy.0, dec!(5));
        assert!(filled.rows[10].filled);
        assert!(!filled.rows[0].filled);
    }

    #[test]
    fn extrapolate_last_falls_back_to_next_when_nothing_precedes() {
        let grid = grid(24);
        let usage = vec![usage_at(&grid, 5, dec!(7), dec!(2))];
        let (filled, _) = fill(&grid, &usage, GapStrategy::ExtrapolateLast).unwrap();
        assert_eq!(filled.rows[0].energy.0, dec!(7));
    }

    #[test]
    fn extrapolate_last_zero_when_no_observations_at_all() {
        let grid = grid(24);
        let (filled, report) = fill(&grid, &[], GapStrategy::ExtrapolateLast).unwrap();
        assert!(filled.rows.iter().all(|r| r.energy.0 == Decimal::ZERO && r.filled));
        assert_eq!(report.by_month.get(&(2024, 1)).unwrap().absent_count, 24);
    }

    #[test]
    fn linear_interpolate_midpoint_between_two_anchors() {
        let grid = grid(5);
        let usage = vec![usage_at(&grid, 0, dec!(0), dec!(0)), usage_at(&grid, 4, dec!(8), dec!(4))];
        let (filled, _) = fill(&grid, &usage, GapStrategy::LinearInterpolate).unwrap();
        assert_eq!(filled.rows[2].energy.0, dec!(4));
        assert_eq!(filled.rows[1].energy.0, dec!(2));
    }

    #[test]
    fn linear_interpolate_single_sided_gap_repeats_known_end() {
        let grid = grid(5);
        let usage = vec![usage_at(&grid, 0, dec!(3), dec!(1))];
        let (filled, _) = fill(&grid, &usage, GapStrategy::LinearInterpolate).unwrap();
        assert_eq!(filled.rows[4].energy.0, dec!(3));
    }

    #[test]
    fn linear_interpolate_with_no_data_is_missing_data_error() {
        let grid = grid(5);
        let result = fill(&grid, &[], GapStrategy::LinearInterpolate);
        assert!(matches!(result, Err(BillingError::MissingData(_))));
    }
}
