//! DemandAllocator — the hard one (§4.4.3). Within each scope (daily or
//! monthly), finds the peak qualifying interval(s) and allocates the scope's
//! pro-rated cost equally across every interval tied at that peak.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::applicability::evaluate_rules;
use crate::bitset::Bitset;
use crate::cancel::CancelToken;
use crate::domain::charges::PeakType;
use crate::domain::money::{Rate, Usd};
use crate::domain::DemandCharge;
use crate::errors::BillingError;
use crate::gapfill::FilledUsage;
use crate::timegrid::{calendar_days_in_billing_month, TimeGrid};

/// Checks `cancel` between every scope (§5: checked between charges and
/// between scopes within `DemandAllocator` specifically).
pub fn allocate(
    grid: &TimeGrid,
    charge: &DemandCharge,
    usage: &FilledUsage,
    billing_day: u32,
    cancel: Option<&CancelToken>,
) -> Result<Vec<Usd>, BillingError> {
    let mask = evaluate_rules(grid, &charge.rules);
    let n = grid.len();
    let mut cost = vec![Usd::ZERO; n];
    if n == 0 {
        return Ok(cost);
    }

    let nominal_per_day = Decimal::from(1440 / grid.step_minutes as i64);

    match charge.peak_type {
        PeakType::Daily => {
            let mut groups: HashMap<NaiveDate, Vec<usize>> = HashMap::new();
            for (i, iv) in grid.intervals.iter().enumerate() {
                groups.entry(iv.local_start.date()).or_default().push(i);
            }
            for idxs in groups.values() {
                if let Some(token) = cancel {
                    token.check()?;
                }
                let covered = Decimal::from(idxs.len() as i64);
                let f_s = if covered == nominal_per_day { Decimal::ONE } else { covered / nominal_per_day };
                allocate_scope(&mut cost, idxs, &mask, usage, charge.rate_usd_per_kw, f_s);
            }
        }
        PeakType::Monthly => {
            let mut groups: HashMap<(i32, u32), Vec<usize>> = HashMap::new();
            for (i, iv) in grid.intervals.iter().enumerate() {
                groups.entry(iv.billing_month_key).or_default().push(i);
            }
            for (month, idxs) in groups {
                if let Some(token) = cancel {
                    token.check()?;
                }
                let covered_days = idxs
                    .iter()
                    .map(|&i| grid.intervals[i].local_start.date())
                    .collect::<HashSet<_>>()
                    .len() as i64;
                let calendar_days = calendar_days_in_billing_month(month, billing_day);
                let f_s = Decimal::from(covered_days) / Decimal::from(calendar_days);
                allocate_scope(&mut cost, &idxs, &mask, usage, charge.rate_usd_per_kw, f_s);
            }
        }
    }

    Ok(cost)
}

/// Finds `M = max(peak_demand)` over mask-qualifying intervals in the scope,
/// and splits `M · rate · f_s` equally across every interval tied at `M`.
/// A scope with no qualifying interval contributes zero (§4.4.3).
fn allocate_scope(cost: &mut [Usd], idxs: &[usize], mask: &Bitset, usage: &FilledUsage, rate: Rate, f_s: Decimal) {
    let mut peak: Option<Decimal> = None;
    for &i in idxs {
        if mask.get(i) {
            let d = usage.rows[i].peak_demand.0;
            peak = Some(match peak {
                Some(p) if p >= d => p,
                _ => d,
            });
        }
    }
    let Some(m) = peak else { return };

    let tied: Vec<usize> = idxs
        .iter()
        .copied()
        .filter(|&i| mask.get(i) && usage.rows[i].peak_demand.0 == m)
        .collect();
    if tied.is_empty() {
        return;
    }

    let contribution = m * rate.0 * f_s;
    let share = Usd(contribution / Decimal::from(tied.len() as i64));
    for i in tied {
        cost[i] = share;
    }
}
