use std::process::ExitCode;

use anyhow::Result;
use log::{error, info};

use billing_core::{compute_bill, BillingError};

mod config;
mod ingest;
mod initialization;
mod logging;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::from(0),
        Err(e) => {
            error!("run failed: {e}");
            exit_code_for(&e)
        }
    }
}

fn run() -> Result<()> {
    let (_config, loaded) = initialization::init()?;

    let computation = compute_bill(
        &loaded.customer_profile,
        &loaded.tariff,
        &loaded.holidays,
        loaded.usage,
        loaded.request_period,
        loaded.gap_strategy,
        None,
    )?;

    for month in computation.months() {
        info!(
            "{}-{:02}: total ${}",
            month.billing_month_key.0, month.billing_month_key.1, month.total_usd.0
        );
    }
    info!("grand total: ${}", computation.grand_total_usd().0);

    Ok(())
}

/// Maps a run failure onto the §6 CLI exit codes.
fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<BillingError>() {
        Some(
            BillingError::InputValidation(_)
            | BillingError::TimeGrid(_)
            | BillingError::ZoneUnknown(_)
            | BillingError::Inconsistency(_),
        ) => ExitCode::from(2),
        Some(BillingError::MissingData(_)) => ExitCode::from(3),
        Some(BillingError::Cancelled) => ExitCode::from(130),
        Some(BillingError::NumericOverflow(_)) => ExitCode::from(4),
        // Config/ingest failures (bad tariff YAML, bad CSV) are validation errors too.
        None => ExitCode::from(2),
    }
}


