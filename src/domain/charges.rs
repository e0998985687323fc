//! Charge DTOs (spec §3): energy, demand, and customer charges.

use serde::{Deserialize, Serialize};

use crate::domain::errors::ValidationError;
use crate::domain::money::Rate;
use crate::domain::rules::ApplicabilityRule;

/// Scope over which a demand charge finds its peak interval (§4.4.3).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeakType {
    Daily,
    Monthly,
}

impl PeakType {
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s {
            "daily" => Ok(PeakType::Daily),
            "monthly" => Ok(PeakType::Monthly),
            other => Err(ValidationError::InvalidPeakType(other.to_string())),
        }
    }
}

/// Cadence at which a flat customer charge recurs (§4.4.2).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChargeType {
    Daily,
    Monthly,
}

impl ChargeType {
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s {
            "daily" => Ok(ChargeType::Daily),
            "monthly" => Ok(ChargeType::Monthly),
            other => Err(ValidationError::InvalidChargeType(other.to_string())),
        }
    }
}

fn check_rate(name: &str, rate: Rate) -> Result<(), ValidationError> {
    if rate.0.is_sign_negative() && !rate.0.is_zero() {
        return Err(ValidationError::NegativeRate {
            name: name.to_string(),
            value: rate.0.to_string(),
        });
    }
    if rate.0.scale() > 5 {
        return Err(ValidationError::RatePrecisionExceeded {
            name: name.to_string(),
            value: rate.0.to_string(),
        });
    }
    Ok(())
}

/// `(id, name, rate_usd_per_kwh, rules[])`. Applies whenever any rule matches.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EnergyCharge {
    pub id: String,
    pub name: String,
    pub rate_usd_per_kwh: Rate,
    pub rules: Vec<ApplicabilityRule>,
}

impl EnergyCharge {
    pub fn new(
        id: String,
        name: String,
        rate_usd_per_kwh: Rate,
        rules: Vec<ApplicabilityRule>,
    ) -> Result<Self, ValidationError> {
        check_rate(&name, rate_usd_per_kwh)?;
        Ok(EnergyCharge { id, name, rate_usd_per_kwh, rules })
    }
}

/// `(id, name, rate_usd_per_kw, peak_type, rules[])`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DemandCharge {
    pub id: String,
    pub name: String,
    pub rate_usd_per_kw: Rate,
    pub peak_type: PeakType,
    pub rules: Vec<ApplicabilityRule>,
}

impl DemandCharge {
    pub fn new(
        id: String,
        name: String,
        rate_usd_per_kw: Rate,
        peak_type: PeakType,
        rules: Vec<ApplicabilityRule>,
    ) -> Result<Self, ValidationError> {
        check_rate(&name, rate_usd_per_kw)?;
        Ok(DemandCharge { id, name, rate_usd_per_kw, peak_type, rules })
    }
}

/// `(id, name, amount_usd, charge_type)`. Carries no applicability rules;
/// always active (§3).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CustomerCharge {
    pub id: String,
    pub name: String,
    pub amount_usd: crate::domain::money::Usd,
    pub charge_type: ChargeType,
}

impl CustomerCharge {
    pub fn new(
        id: String,
        name: String,
        amount_usd: crate::domain::money::Usd,
        charge_type: ChargeType,
    ) -> Result<Self, ValidationError> {
        if amount_usd.0.is_sign_negative() && !amount_usd.0.is_zero() {
            return Err(ValidationError::NegativeRate {
                name: name.clone(),
                value: amount_usd.0.to_string(),
            });
        }
        if amount_usd.0.scale() > 5 {
            return Err(ValidationError::RatePrecisionExceeded {
                name: name.clone(),
                value: amount_usd.0.to_string(),
            });
        }
        Ok(CustomerCharge { id, name, amount_usd, charge_type })
    }
}
