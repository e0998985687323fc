//! Typed DTOs for tariffs, customers, and usage, plus their ingest-time
//! invariants (spec §3, §4.6). These are immutable inputs to a computation.

pub mod charges;
pub mod customer;
pub mod errors;
pub mod money;
pub mod rules;
pub mod tariff;

pub use charges::{ChargeType, CustomerCharge, DemandCharge, EnergyCharge, PeakType};
pub use customer::{CustomerProfile, Holiday, UsageInterval};
pub use errors::ValidationError;
pub use money::{Kw, Kwh, Rate, Usd};
pub use rules::{ApplicabilityRule, DayClass, MonthDay};
pub use tariff::Tariff;
