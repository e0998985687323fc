//! CustomerAllocator: flat daily/monthly customer charges, unaffected by
//! applicability masks (§4.4.2).

use std::collections::HashMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::domain::charges::ChargeType;
use crate::domain::money::Usd;
use crate::domain::CustomerCharge;
use crate::timegrid::{calendar_days_in_billing_month, TimeGrid};

/// Emits the cost series for a single customer charge.
///
/// Both variants divide by the *nominal* full-scope interval count (a full
/// calendar day, or a full billing month), not by however many intervals the
/// request period happens to cover. That denominator is what makes a
/// request period that only partially covers a scope contribute
/// proportionally rather than the flat `amount_usd` (§4.4.2, and §9's open
/// question on partial-boundary days, resolved as proportional-by-coverage).
pub fn allocate(grid: &TimeGrid, charge: &CustomerCharge, billing_day: u32) -> Vec<Usd> {
    let n = grid.len();
    let mut cost = vec![Usd::ZERO; n];
    if n == 0 {
        return cost;
    }

    let nominal_per_day = Decimal::from(1440 / grid.step_minutes as i64);

    match charge.charge_type {
        ChargeType::Daily => {
            let mut groups: HashMap<NaiveDate, Vec<usize>> = HashMap::new();
            for (i, iv) in grid.intervals.iter().enumerate() {
                groups.entry(iv.local_start.date()).or_default().push(i);
            }
            let per_interval = Usd(charge.amount_usd.0 / nominal_per_day);
            for idxs in groups.values() {
                for &i in idxs {
                    cost[i] = per_interval;
                }
            }
        }
        ChargeType::Monthly => {
            let mut groups: HashMap<(i32, u32), Vec<usize>> = HashMap::new();
            for (i, iv) in grid.intervals.iter().enumerate() {
                groups.entry(iv.billing_month_key).or_default().push(i);
            }
            for (month, idxs) in groups {
                let nominal_for_month =
                    Decimal::from(calendar_days_in_billing_month(month, billing_day)) * nominal_per_day;
                let per_interval = Usd(charge.amount_usd.0 / nominal_for_month);
                for &i in &idxs {
                    cost[i] = per_interval;
                }
            }
        }
    }

    cost
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::money::Usd as UsdT;
    use rust_decimal_macros::dec;
    use std::collections::HashSet;

    #[test]
    fn monthly_charge_totals_amount_when_month_fully_covered() {
        let grid = TimeGrid::build(
            chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            chrono::NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            chrono_tz::UTC,
            60,
            31,
            &HashSet::new(),
        )
        .unwrap();
        let charge = CustomerCharge::new("c1".into(), "base".into(), UsdT(dec!(10)), ChargeType::Monthly).unwrap();
        let cost = allocate(&grid, &charge, 31);
        let total: Decimal = cost.iter().map(|u| u.0).sum();
        assert_eq!(total, dec!(10));
    }

    #[test]
    fn daily_charge_totals_amount_times_covered_days() {
        let grid = TimeGrid::build(
            chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            chrono::NaiveDate::from_ymd_opt(2024, 1, 3).unwrap(),
            chrono_tz::UTC,
            60,
            31,
            &HashSet::new(),
        )
        .unwrap();
        let charge = CustomerCharge::new("c1".into(), "base".into(), UsdT(dec!(2)), ChargeType::Daily).unwrap();
        let cost = allocate(&grid, &charge, 31);
        let total: Decimal = cost.iter().map(|u| u.0).sum();
        assert_eq!(total, dec!(6));
    }
}
