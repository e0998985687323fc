//! The tariff DTO and its ingest-time invariants (§3, §4.6).

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::domain::charges::{CustomerCharge, DemandCharge, EnergyCharge};
use crate::domain::errors::ValidationError;

/// `(utility, name, energy_charges[], demand_charges[], customer_charges[])`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tariff {
    pub utility: String,
    pub name: String,
    pub energy_charges: Vec<EnergyCharge>,
    pub demand_charges: Vec<DemandCharge>,
    pub customer_charges: Vec<CustomerCharge>,
}

impl Tariff {
    /// Validates the invariants in §3/§4.6: at least one charge total, and
    /// names unique within a tariff per family.
    pub fn new(
        utility: String,
        name: String,
        energy_charges: Vec<EnergyCharge>,
        demand_charges: Vec<DemandCharge>,
        customer_charges: Vec<CustomerCharge>,
    ) -> Result<Self, ValidationError> {
        if energy_charges.is_empty() && demand_charges.is_empty() && customer_charges.is_empty() {
            return Err(ValidationError::EmptyTariff(name));
        }

        check_unique(&name, "energy", energy_charges.iter().map(|c| &c.name))?;
        check_unique(&name, "demand", demand_charges.iter().map(|c| &c.name))?;
        check_unique(&name, "customer", customer_charges.iter().map(|c| &c.name))?;

        Ok(Tariff {
            utility,
            name,
            energy_charges,
            demand_charges,
            customer_charges,
        })
    }

    /// Total number of distinct charges in the tariff, across all families.
    pub fn charge_count(&self) -> usize {
        self.energy_charges.len() + self.demand_charges.len() + self.customer_charges.len()
    }
}

fn check_unique<'a>(
    tariff: &str,
    family: &'static str,
    names: impl Iterator<Item = &'a String>,
) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name.as_str()) {
            return Err(ValidationError::DuplicateChargeName {
                family,
                name: name.clone(),
                tariff: tariff.to_string(),
            });
        }
    }
    Ok(())
}
