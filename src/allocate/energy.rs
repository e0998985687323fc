//! EnergyAllocator: `cost[i] = mask[i] · energy[i] · rate` (§4.4.1). No
//! cross-interval coupling.

use crate::applicability::evaluate_rules;
use crate::domain::money::Usd;
use crate::domain::EnergyCharge;
use crate::gapfill::FilledUsage;
use crate::timegrid::TimeGrid;

pub fn allocate(grid: &TimeGrid, charge: &EnergyCharge, usage: &FilledUsage) -> Vec<Usd> {
    let mask = evaluate_rules(grid, &charge.rules);
    (0..grid.len())
        .map(|i| if mask.get(i) { usage.rows[i].energy * charge.rate_usd_per_kwh } else { Usd::ZERO })
        .collect()
}
