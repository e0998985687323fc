use thiserror::Error;

/// Errors raised while validating tariff, customer, or usage DTOs on ingest (§4.6, §7 `InputValidation`).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("applicability rule period [{start}, {end}) is invalid: end must be after start, or both must be 00:00 for an all-day rule")]
    InvalidPeriod { start: String, end: String },

    #[error("applicability rule month/day bounds must both be present or both absent")]
    MismatchedMonthDayBounds,

    #[error("rate for '{name}' must be non-negative, got {value}")]
    NegativeRate { name: String, value: String },

    #[error("rate for '{name}' has more than 5 decimal digits: {value}")]
    RatePrecisionExceeded { name: String, value: String },

    #[error("invalid peak_type '{0}', expected 'daily' or 'monthly'")]
    InvalidPeakType(String),

    #[error("invalid charge_type '{0}', expected 'daily' or 'monthly'")]
    InvalidChargeType(String),

    #[error("billing_interval_minutes {0} must divide both 60 and 1440 evenly")]
    InvalidBillingInterval(u32),

    #[error("usage cadence {usage_minutes} does not match customer billing_interval_minutes {customer_minutes}")]
    IntervalCadenceMismatch { usage_minutes: i64, customer_minutes: u32 },

    #[error("billing_day {0} is out of range [1, 31]")]
    InvalidBillingDay(u32),

    #[error("tariff '{0}' declares no charges")]
    EmptyTariff(String),

    #[error("duplicate {family} charge name '{name}' within tariff '{tariff}'")]
    DuplicateChargeName {
        family: &'static str,
        name: String,
        tariff: String,
    },

    #[error("duplicate applicability rule name '{0}'")]
    DuplicateRuleName(String),

    #[error("reference to unknown applicability rule '{0}'")]
    UnknownRuleReference(String),

    #[error("usage interval energy must be non-negative, got {0}")]
    NegativeEnergy(String),

    #[error("usage interval peak_demand must be non-negative, got {0}")]
    NegativeDemand(String),

    #[error("usage interval end must equal start + step, start={start}, end={end}")]
    IntervalLengthMismatch { start: String, end: String },

    #[error("duplicate usage interval for (customer, {0})")]
    DuplicateInterval(String),

    #[error("unrecognized unit '{0}'")]
    UnknownUnit(String),

    #[error("timestamp '{0}' has no UTC offset; naive timestamps are rejected")]
    NaiveTimestampRejected(String),
}
