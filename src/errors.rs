//! Crate-level error union (§7). Each component raises its own typed error;
//! this folds them together the way the teacher's top-level `errors.rs`
//! unions per-manager errors into a single `MyGridWorkerError`.

use thiserror::Error;

use crate::domain::errors::ValidationError;
use crate::timegrid::errors::TimeGridError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BillingError {
    /// Rejects tariff, customer, or usage data that violates §3 invariants.
    #[error("input validation failed: {0}")]
    InputValidation(#[from] ValidationError),

    #[error("time grid error: {0}")]
    TimeGrid(#[from] TimeGridError),

    /// Fatal to the computation, e.g. usage cadence != customer billing interval.
    #[error("inconsistent input: {0}")]
    Inconsistency(String),

    /// A gap present, no strategy repairs it. Fatal; caller receives the gap report.
    #[error("missing data: {0}")]
    MissingData(String),

    #[error("unknown time zone: {0}")]
    ZoneUnknown(String),

    /// Fatal, idempotent (§5 cancellation contract).
    #[error("computation cancelled")]
    Cancelled,

    /// Should be unreachable with fixed-precision decimal arithmetic.
    #[error("numeric overflow: {0}")]
    NumericOverflow(String),
}
