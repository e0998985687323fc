use std::fs;

use anyhow::Result;
use chrono::NaiveDate;
use log::LevelFilter;
use serde::Deserialize;

#[derive(Deserialize)]
pub struct General {
    pub log_path: String,
    pub log_level: LevelFilter,
    pub log_to_stdout: bool,
}

#[derive(Deserialize)]
pub struct Input {
    pub tariff_yaml: String,
    pub usage_csv: String,
    pub holidays_csv: Option<String>,
    pub customer_timezone: String,
    pub billing_interval_minutes: u32,
    pub billing_day: u32,
}

#[derive(Deserialize)]
pub struct RequestPeriod {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

#[derive(Deserialize)]
pub struct GapFill {
    pub strategy: String,
}

#[derive(Deserialize)]
pub struct Config {
    pub general: General,
    pub input: Input,
    pub request: RequestPeriod,
    pub gap_fill: GapFill,
}

/// Loads the CLI configuration file.
///
/// # Arguments
///
/// * 'config_path' - path to the configuration file
pub fn load_config(config_path: &str) -> Result<Config> {
    let toml_str = fs::read_to_string(config_path)?;
    let config: Config = toml::from_str(&toml_str)?;
    Ok(config)
}