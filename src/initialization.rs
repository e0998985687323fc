use std::collections::HashSet;
use std::env;
use std::fs;
use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use chrono_tz::Tz;
use log::info;

use billing_core::{CustomerProfile, GapStrategy, Tariff};

use crate::config::{load_config, Config};
use crate::ingest::{tariff_yaml, usage_csv};
use crate::logging::setup_logger;

/// Everything `main` needs to call `compute_bill`, assembled from the
/// config file and the files it points at.
pub struct Loaded {
    pub customer_profile: CustomerProfile,
    pub tariff: Tariff,
    pub holidays: HashSet<NaiveDate>,
    pub usage: Vec<billing_core::UsageInterval>,
    pub request_period: (NaiveDate, NaiveDate),
    pub gap_strategy: GapStrategy,
}

/// Loads configuration, sets up logging, and ingests the tariff/usage/holiday
/// files named in the config.
pub fn init() -> Result<(Config, Loaded)> {
    let args: Vec<String> = env::args().collect();
    let config_path = args
        .iter()
        .find(|p| p.starts_with("--config="))
        .context("config file argument should be present")?;
    let config_path = config_path.split_once('=').context("config file argument should be correct")?.1;

    let config = load_config(config_path)?;

    let _ = setup_logger(&config.general.log_path, config.general.log_level, config.general.log_to_stdout)?;

    info!("starting billing_core version: {}", env!("CARGO_PKG_VERSION"));

    let tz = Tz::from_str(&config.input.customer_timezone)
        .map_err(|_| anyhow::anyhow!("unknown time zone '{}'", config.input.customer_timezone))?;
    let customer_profile = CustomerProfile::new(tz, config.input.billing_interval_minutes, config.input.billing_day)?;

    let tariff_yaml_src = fs::read_to_string(&config.input.tariff_yaml)
        .with_context(|| format!("reading tariff YAML '{}'", config.input.tariff_yaml))?;
    let mut tariffs = tariff_yaml::from_yaml(&tariff_yaml_src)?;
    let tariff = tariffs.pop().context("tariff YAML declares no tariffs")?;

    let holidays = match &config.input.holidays_csv {
        Some(path) => {
            let records = usage_csv::load_holidays(path)?;
            usage_csv::holiday_dates_for(&records, &tariff.utility)
        }
        None => HashSet::new(),
    };

    let usage = usage_csv::load_usage(&config.input.usage_csv)?;

    let gap_strategy = match config.gap_fill.strategy.as_str() {
        "extrapolate_last" => GapStrategy::ExtrapolateLast,
        "linear_interpolate" => GapStrategy::LinearInterpolate,
        other => anyhow::bail!("unknown gap fill strategy '{other}'"),
    };

    let loaded = Loaded {
        customer_profile,
        tariff,
        holidays,
        usage,
        request_period: (config.request.start_date, config.request.end_date),
        gap_strategy,
    };

    Ok((config, loaded))
}