use thiserror::Error;

/// Failures raised while building a `TimeGrid` (§4.1).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TimeGridError {
    #[error("unknown IANA time zone id: {0}")]
    TimeZoneUnknown(String),

    #[error("step of {0} minutes does not divide 24h evenly")]
    InvalidStep(u32),

    #[error("request period end {end} precedes start {start}")]
    InvertedPeriod { start: String, end: String },
}
