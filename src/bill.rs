//! BillAssembler (§4.5) and the `compute_bill` entry point (§6): wires
//! TimeGrid, GapFiller, ApplicabilityEvaluator, and the three allocators into
//! one pass, then aggregates interval-indexed cost series into monthly totals.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use crate::allocate::{self, CostSeries};
use crate::cancel::CancelToken;
use crate::domain::money::{round_half_even_2dp, Usd};
use crate::domain::errors::ValidationError;
use crate::domain::{CustomerProfile, Tariff, UsageInterval};
use crate::errors::BillingError;
use crate::gapfill::{self, GapReport, GapStrategy, MonthGaps};
use crate::timegrid::TimeGrid;

/// One billing month's worth of aggregated results (§4.5).
#[derive(Clone, Debug)]
pub struct BillResult {
    pub billing_month_key: (i32, u32),
    pub period_start_local_date: NaiveDate,
    pub period_end_local_date: NaiveDate,
    pub line_items: HashMap<String, Decimal>,
    pub total_usd: Usd,
    pub gaps: MonthGaps,
}

/// The full result of `compute_bill` (§6): one `BillResult` per billing
/// month covered, a grand total, the gap report, and random access into the
/// full interval × charge cost matrix for audit/debugging.
pub struct BillComputation {
    months: Vec<BillResult>,
    grand_total_usd: Usd,
    gap_report: GapReport,
    utc_index: HashMap<DateTime<Utc>, usize>,
    cost_by_charge: HashMap<String, CostSeries>,
}

impl BillComputation {
    pub fn months(&self) -> &[BillResult] {
        &self.months
    }

    pub fn grand_total_usd(&self) -> Usd {
        self.grand_total_usd
    }

    pub fn gap_report(&self) -> &GapReport {
        &self.gap_report
    }

    /// Looks up the cost a single charge contributed to a single interval.
    /// Returns `None` if either the interval or the charge id is unknown.
    pub fn cost_matrix(&self, interval_start_utc: DateTime<Utc>, charge_id: &str) -> Option<Decimal> {
        let idx = *self.utc_index.get(&interval_start_utc)?;
        self.cost_by_charge.get(charge_id).map(|series| series[idx].0)
    }
}

/// The core entry point (§6). Pure function of its arguments: no I/O, no
/// globals, single-threaded. `cancel_token` is checked between charges and
/// (within `DemandAllocator`) between scopes.
pub fn compute_bill(
    customer_profile: &CustomerProfile,
    tariff: &Tariff,
    holidays: &HashSet<NaiveDate>,
    usage_stream: Vec<UsageInterval>,
    request_period: (NaiveDate, NaiveDate),
    gap_strategy: GapStrategy,
    cancel_token: Option<&CancelToken>,
) -> Result<BillComputation, BillingError> {
    for usage in &usage_stream {
        let minutes = (usage.interval_end_utc - usage.interval_start_utc).num_minutes();
        if minutes != customer_profile.billing_interval_minutes as i64 {
            return Err(BillingError::InputValidation(ValidationError::IntervalCadenceMismatch {
                usage_minutes: minutes,
                customer_minutes: customer_profile.billing_interval_minutes,
            }));
        }
    }

    let grid = TimeGrid::build(
        request_period.0,
        request_period.1,
        customer_profile.timezone,
        customer_profile.billing_interval_minutes,
        customer_profile.billing_day,
        holidays,
    )?;

    let (filled, gap_report) = gapfill::fill(&grid, &usage_stream, gap_strategy)?;

    let mut cost_by_charge: HashMap<String, CostSeries> = HashMap::new();

    for charge in &tariff.energy_charges {
        if let Some(token) = cancel_token {
            token.check()?;
        }
        let cost = allocate::allocate_energy(&grid, charge, &filled);
        cost_by_charge.insert(charge.id.clone(), cost);
    }

    for charge in &tariff.demand_charges {
        if let Some(token) = cancel_token {
            token.check()?;
        }
        let cost = allocate::allocate_demand(&grid, charge, &filled, customer_profile.billing_day, cancel_token)?;
        cost_by_charge.insert(charge.id.clone(), cost);
    }

    for charge in &tariff.customer_charges {
        if let Some(token) = cancel_token {
            token.check()?;
        }
        let cost = allocate::allocate_customer(&grid, charge, customer_profile.billing_day);
        cost_by_charge.insert(charge.id.clone(), cost);
    }

    let months = assemble_months(&grid, &cost_by_charge, &gap_report);
    let grand_total_usd: Usd = months.iter().map(|m| m.total_usd).sum();

    let utc_index: HashMap<DateTime<Utc>, usize> = grid
        .intervals
        .iter()
        .enumerate()
        .map(|(i, interval)| (interval.utc_start, i))
        .collect();

    Ok(BillComputation { months, grand_total_usd, gap_report, utc_index, cost_by_charge })
}

fn assemble_months(
    grid: &TimeGrid,
    cost_by_charge: &HashMap<String, CostSeries>,
    gap_report: &GapReport,
) -> Vec<BillResult> {
    let mut month_indices: HashMap<(i32, u32), Vec<usize>> = HashMap::new();
    for (i, interval) in grid.intervals.iter().enumerate() {
        month_indices.entry(interval.billing_month_key).or_default().push(i);
    }

    let mut keys: Vec<(i32, u32)> = month_indices.keys().copied().collect();
    keys.sort();

    keys.into_iter()
        .map(|key| {
            let idxs = &month_indices[&key];
            let period_start_local_date =
                idxs.iter().map(|&i| grid.intervals[i].local_start.date()).min().unwrap();
            let period_end_local_date =
                idxs.iter().map(|&i| grid.intervals[i].local_start.date()).max().unwrap();

            let mut line_items = HashMap::new();
            for (charge_id, series) in cost_by_charge {
                let sum: Decimal = idxs.iter().map(|&i| series[i].0).sum();
                line_items.insert(charge_id.clone(), sum);
            }

            let unrounded_total: Decimal = line_items.values().copied().sum();
            let total_usd = round_half_even_2dp(Usd(unrounded_total));

            let gaps = gap_report.by_month.get(&key).copied().unwrap_or_default();

            BillResult {
                billing_month_key: key,
                period_start_local_date,
                period_end_local_date,
                line_items,
                total_usd,
                gaps,
            }
        })
        .collect()
}
