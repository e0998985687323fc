//! Usage CSV format (§6): `interval_start, interval_end, usage, usage_unit,
//! peak_demand, peak_demand_unit` (optional `temperature, temperature_unit`,
//! accepted but unused — temperature isn't part of the billing core). Units:
//! energy `kWh|Wh|MWh`, demand `kW|W|MW`. Timestamps are ISO-8601 and must
//! carry a UTC offset; naive timestamps are rejected.

use std::collections::HashSet;
use std::fs::File;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;

use billing_core::{Holiday, Kw, Kwh, UsageInterval, ValidationError};

#[derive(Debug, Deserialize)]
struct Row {
    interval_start: String,
    interval_end: String,
    usage: Decimal,
    usage_unit: String,
    peak_demand: Decimal,
    peak_demand_unit: String,
    #[serde(default)]
    #[allow(dead_code)]
    temperature: Option<Decimal>,
    #[serde(default)]
    #[allow(dead_code)]
    temperature_unit: Option<String>,
}

fn parse_offset_timestamp(s: &str) -> Result<DateTime<Utc>, ValidationError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ValidationError::NaiveTimestampRejected(s.to_string()))
}

fn energy_to_kwh(value: Decimal, unit: &str) -> Result<Kwh, ValidationError> {
    let kwh = match unit {
        "kWh" => value,
        "Wh" => value / Decimal::from(1000),
        "MWh" => value * Decimal::from(1000),
        other => return Err(ValidationError::UnknownUnit(other.to_string())),
    };
    Ok(Kwh(kwh))
}

fn demand_to_kw(value: Decimal, unit: &str) -> Result<Kw, ValidationError> {
    let kw = match unit {
        "kW" => value,
        "W" => value / Decimal::from(1000),
        "MW" => value * Decimal::from(1000),
        other => return Err(ValidationError::UnknownUnit(other.to_string())),
    };
    Ok(Kw(kw))
}

/// Parses usage records from a CSV file at `path`, converting units to
/// kWh/kW and rejecting naive timestamps (§6). Enforces the §3
/// `(customer, interval_start_utc)` uniqueness invariant (one customer per
/// file, so uniqueness is on `interval_start_utc` alone). Does not validate
/// interval cadence; `compute_bill` does that against the customer profile.
pub fn load_usage(path: &str) -> Result<Vec<UsageInterval>> {
    let file = File::open(path).with_context(|| format!("opening usage CSV '{path}'"))?;
    let mut reader = csv::Reader::from_reader(file);
    let mut out = Vec::new();
    let mut seen_starts: HashSet<DateTime<Utc>> = HashSet::new();

    for result in reader.deserialize() {
        let row: Row = result.context("malformed usage CSV row")?;
        let start = parse_offset_timestamp(&row.interval_start).map_err(|e| anyhow!(e))?;
        let end = parse_offset_timestamp(&row.interval_end).map_err(|e| anyhow!(e))?;
        if !seen_starts.insert(start) {
            return Err(anyhow!(ValidationError::DuplicateInterval(start.to_rfc3339())));
        }
        let energy = energy_to_kwh(row.usage, &row.usage_unit).map_err(|e| anyhow!(e))?;
        let demand = demand_to_kw(row.peak_demand, &row.peak_demand_unit).map_err(|e| anyhow!(e))?;
        let step_minutes = (end - start).num_minutes();
        let interval = UsageInterval::new(start, end, energy, demand, step_minutes as u32).map_err(|e| anyhow!(e))?;
        out.push(interval);
    }

    Ok(out)
}

/// Parses the `(utility, date)` holiday records from a CSV file at `path`
/// (§6 persisted-state shape) into `Holiday` DTOs. Callers narrow these to
/// the flat `set<local_date>` `compute_bill` expects via
/// [`holiday_dates_for`], since a computation is scoped to one utility.
pub fn load_holidays(path: &str) -> Result<Vec<Holiday>> {
    let file = File::open(path).with_context(|| format!("opening holidays CSV '{path}'"))?;
    let mut reader = csv::Reader::from_reader(file);
    let mut out = Vec::new();

    #[derive(Deserialize)]
    struct HolidayRow {
        utility: String,
        date: NaiveDate,
    }

    for result in reader.deserialize() {
        let row: HolidayRow = result.context("malformed holidays CSV row")?;
        out.push(Holiday { utility: row.utility, date: row.date });
    }

    Ok(out)
}

/// Narrows a utility's holiday records to the flat local-date set
/// `compute_bill` takes as its `holidays` argument (§6).
pub fn holiday_dates_for(holidays: &[Holiday], utility: &str) -> HashSet<NaiveDate> {
    holidays.iter().filter(|h| h.utility == utility).map(|h| h.date).collect()
}
