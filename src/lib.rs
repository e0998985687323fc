//! A deterministic billing core (§1): computes a customer's bill for a
//! request period as a pure function of a tariff, a customer profile,
//! holidays, and a usage series. No I/O, no globals, single-threaded per
//! computation (§5). The CLI boundary that feeds real files into this core
//! lives in `src/main.rs` and is not part of the library surface.

pub mod allocate;
pub mod applicability;
pub mod bill;
pub mod bitset;
pub mod cancel;
pub mod domain;
pub mod errors;
pub mod gapfill;
pub mod timegrid;

pub use bill::{compute_bill, BillComputation, BillResult};
pub use cancel::CancelToken;
pub use domain::{
    ApplicabilityRule, ChargeType, CustomerCharge, CustomerProfile, DayClass, DemandCharge, EnergyCharge, Holiday,
    Kw, Kwh, MonthDay, PeakType, Rate, Tariff, Usd, UsageInterval, ValidationError,
};
pub use errors::BillingError;
pub use gapfill::{FilledRow, FilledUsage, GapReport, GapStrategy, MonthGaps};
pub use timegrid::{Interval, TimeGrid};
