//! ChargeAllocator (§4.4): dispatches each tariff charge — tagged by family,
//! not by a shared trait object — to the allocation function for its kind.

pub mod customer;
pub mod demand;
pub mod energy;

use crate::cancel::CancelToken;
use crate::domain::money::Usd;
use crate::domain::{CustomerCharge, DemandCharge, EnergyCharge};
use crate::errors::BillingError;
use crate::gapfill::FilledUsage;
use crate::timegrid::TimeGrid;

/// One interval-indexed cost series, one per charge, aligned with the grid.
pub type CostSeries = Vec<Usd>;

pub fn allocate_energy(grid: &TimeGrid, charge: &EnergyCharge, usage: &FilledUsage) -> CostSeries {
    energy::allocate(grid, charge, usage)
}

pub fn allocate_demand(
    grid: &TimeGrid,
    charge: &DemandCharge,
    usage: &FilledUsage,
    billing_day: u32,
    cancel: Option<&CancelToken>,
) -> Result<CostSeries, BillingError> {
    demand::allocate(grid, charge, usage, billing_day, cancel)
}

pub fn allocate_customer(grid: &TimeGrid, charge: &CustomerCharge, billing_day: u32) -> CostSeries {
    customer::allocate(grid, charge, billing_day)
}
