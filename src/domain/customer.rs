//! Customer profile, usage intervals, and holidays (§3).

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::domain::errors::ValidationError;
use crate::domain::money::{Kw, Kwh};

/// `(timezone, billing_interval_minutes, billing_day)`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub timezone: Tz,
    pub billing_interval_minutes: u32,
    pub billing_day: u32,
}

impl CustomerProfile {
    pub fn new(timezone: Tz, billing_interval_minutes: u32, billing_day: u32) -> Result<Self, ValidationError> {
        if billing_interval_minutes == 0
            || 60 % billing_interval_minutes != 0
            || 1440 % billing_interval_minutes != 0
        {
            return Err(ValidationError::InvalidBillingInterval(billing_interval_minutes));
        }
        if !(1..=31).contains(&billing_day) {
            return Err(ValidationError::InvalidBillingDay(billing_day));
        }
        Ok(CustomerProfile { timezone, billing_interval_minutes, billing_day })
    }
}

/// An atomic observation `(interval_start_utc, interval_end_utc, energy, peak_demand)`.
#[derive(Copy, Clone, Debug, Serialize, Deserialize)]
pub struct UsageInterval {
    pub interval_start_utc: DateTime<Utc>,
    pub interval_end_utc: DateTime<Utc>,
    pub energy: Kwh,
    pub peak_demand: Kw,
}

impl UsageInterval {
    pub fn new(
        interval_start_utc: DateTime<Utc>,
        interval_end_utc: DateTime<Utc>,
        energy: Kwh,
        peak_demand: Kw,
        step_minutes: u32,
    ) -> Result<Self, ValidationError> {
        let expected_end = interval_start_utc + chrono::Duration::minutes(step_minutes as i64);
        if interval_end_utc != expected_end {
            return Err(ValidationError::IntervalLengthMismatch {
                start: interval_start_utc.to_rfc3339(),
                end: interval_end_utc.to_rfc3339(),
            });
        }
        if energy.0.is_sign_negative() && !energy.0.is_zero() {
            return Err(ValidationError::NegativeEnergy(energy.0.to_string()));
        }
        if peak_demand.0.is_sign_negative() && !peak_demand.0.is_zero() {
            return Err(ValidationError::NegativeDemand(peak_demand.0.to_string()));
        }
        Ok(UsageInterval { interval_start_utc, interval_end_utc, energy, peak_demand })
    }
}

/// `(utility, date)` — a local civil date treated as a utility holiday.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Holiday {
    pub utility: String,
    pub date: NaiveDate,
}
