//! End-to-end seed scenarios (§8) exercising `compute_bill` the way a real
//! caller would: build DTOs, call the entry point once, check the result.

use std::collections::HashSet;

use chrono::{Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::America::Los_Angeles;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use billing_core::{
    compute_bill, ApplicabilityRule, ChargeType, CustomerCharge, CustomerProfile, DemandCharge, EnergyCharge,
    GapStrategy, Kw, Kwh, MonthDay, PeakType, Rate, Tariff, TimeGrid, Usd, UsageInterval,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn all_hours_rule() -> ApplicabilityRule {
    ApplicabilityRule::new(time(0, 0), time(0, 0), None, None, true, true, true).unwrap()
}

#[test]
fn s1_flat_tariff_full_month() {
    let customer = CustomerProfile::new(chrono_tz::UTC, 60, 31).unwrap();
    let energy = EnergyCharge::new("e".into(), "flat".into(), Rate(dec!(0.10)), vec![all_hours_rule()]).unwrap();
    let base = CustomerCharge::new("c".into(), "base".into(), Usd(dec!(10)), ChargeType::Monthly).unwrap();
    let tariff = Tariff::new("acme".into(), "flat".into(), vec![energy], vec![], vec![base]).unwrap();

    let mut usage = Vec::new();
    let mut t = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    for _ in 0..744 {
        let end = t + Duration::hours(1);
        usage.push(UsageInterval::new(t, end, Kwh(dec!(1)), Kw(dec!(4)), 60).unwrap());
        t = end;
    }

    let computation = compute_bill(
        &customer,
        &tariff,
        &HashSet::new(),
        usage,
        (date(2024, 1, 1), date(2024, 1, 31)),
        GapStrategy::ExtrapolateLast,
        None,
    )
    .unwrap();

    assert_eq!(computation.months().len(), 1);
    let month = &computation.months()[0];
    assert_eq!(month.line_items["e"], dec!(74.40));
    assert_eq!(month.line_items["c"], dec!(10.00));
    assert_eq!(month.total_usd.0, dec!(84.40));
}

#[test]
fn s2_peak_off_peak_split() {
    let customer = CustomerProfile::new(chrono_tz::UTC, 60, 31).unwrap();
    let peak_rule = ApplicabilityRule::new(time(16, 0), time(21, 0), None, None, true, true, true).unwrap();
    let peak = EnergyCharge::new("peak".into(), "peak".into(), Rate(dec!(0.20)), vec![peak_rule]).unwrap();

    let offpeak_morning = ApplicabilityRule::new(time(0, 0), time(16, 0), None, None, true, true, true).unwrap();
    let offpeak_night =
        ApplicabilityRule::new(time(21, 0), NaiveTime::from_hms_opt(23, 59, 59).unwrap(), None, None, true, true, true)
            .unwrap();
    let offpeak = EnergyCharge::new(
        "offpeak".into(),
        "offpeak".into(),
        Rate(dec!(0.05)),
        vec![offpeak_morning, offpeak_night],
    )
    .unwrap();

    let tariff = Tariff::new("acme".into(), "tou".into(), vec![peak, offpeak], vec![], vec![]).unwrap();

    let mut usage = Vec::new();
    let mut t = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    for _ in 0..744 {
        let end = t + Duration::hours(1);
        usage.push(UsageInterval::new(t, end, Kwh(dec!(1)), Kw(dec!(4)), 60).unwrap());
        t = end;
    }

    let computation = compute_bill(
        &customer,
        &tariff,
        &HashSet::new(),
        usage,
        (date(2024, 1, 1), date(2024, 1, 31)),
        GapStrategy::ExtrapolateLast,
        None,
    )
    .unwrap();

    let month = &computation.months()[0];
    assert_eq!(month.line_items["peak"], dec!(31.00));
    assert_eq!(month.line_items["offpeak"], dec!(29.45));
    assert_eq!(month.total_usd.0, dec!(60.45));
}

#[test]
fn s3_monthly_demand_with_tie() {
    let customer = CustomerProfile::new(chrono_tz::UTC, 60, 31).unwrap();
    let demand = DemandCharge::new("d".into(), "demand".into(), Rate(dec!(25)), PeakType::Monthly, vec![all_hours_rule()])
        .unwrap();
    let tariff = Tariff::new("acme".into(), "demand".into(), vec![], vec![demand], vec![]).unwrap();

    let mut usage = Vec::new();
    let mut t = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    for _ in 0..744 {
        let end = t + Duration::hours(1);
        usage.push(UsageInterval::new(t, end, Kwh(dec!(0)), Kw(dec!(10)), 60).unwrap());
        t = end;
    }

    let computation = compute_bill(
        &customer,
        &tariff,
        &HashSet::new(),
        usage,
        (date(2024, 1, 1), date(2024, 1, 31)),
        GapStrategy::ExtrapolateLast,
        None,
    )
    .unwrap();

    let month = &computation.months()[0];
    assert_eq!(month.line_items["d"], dec!(250.00));

    let some_start = Utc.with_ymd_and_hms(2024, 1, 15, 6, 0, 0).unwrap();
    let per_interval = computation.cost_matrix(some_start, "d").unwrap();
    assert_eq!(per_interval, dec!(250) / Decimal::from(744));
}

#[test]
fn s4_daily_demand_partial_request() {
    let customer = CustomerProfile::new(chrono_tz::UTC, 60, 31).unwrap();
    let demand = DemandCharge::new("d".into(), "demand".into(), Rate(dec!(5)), PeakType::Daily, vec![all_hours_rule()])
        .unwrap();
    let tariff = Tariff::new("acme".into(), "demand".into(), vec![], vec![demand], vec![]).unwrap();

    let mut usage = Vec::new();
    let mut t = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
    for h in 0..24 {
        let end = t + Duration::hours(1);
        let kw = if h == 14 { dec!(12) } else { dec!(8) };
        usage.push(UsageInterval::new(t, end, Kwh(dec!(0)), Kw(kw), 60).unwrap());
        t = end;
    }

    let computation = compute_bill(
        &customer,
        &tariff,
        &HashSet::new(),
        usage,
        (date(2024, 1, 15), date(2024, 1, 15)),
        GapStrategy::ExtrapolateLast,
        None,
    )
    .unwrap();

    let month = &computation.months()[0];
    assert_eq!(month.line_items["d"], dec!(60.00));

    let peak_start = Utc.with_ymd_and_hms(2024, 1, 15, 14, 0, 0).unwrap();
    assert_eq!(computation.cost_matrix(peak_start, "d").unwrap(), dec!(60.00));
}

#[test]
fn s5_dst_spring_forward_no_duplication() {
    let customer = CustomerProfile::new(Los_Angeles, 5, 31).unwrap();
    let grid = TimeGrid::build(date(2024, 3, 10), date(2024, 3, 10), Los_Angeles, 5, 31, &HashSet::new()).unwrap();
    assert_eq!(grid.len(), 288 - 12);

    let peak_rule = ApplicabilityRule::new(time(16, 0), time(21, 0), None, None, true, true, true).unwrap();
    let energy = EnergyCharge::new("e".into(), "peak".into(), Rate(dec!(1)), vec![peak_rule]).unwrap();
    let tariff = Tariff::new("acme".into(), "dst".into(), vec![energy], vec![], vec![]).unwrap();

    let usage: Vec<UsageInterval> = grid
        .intervals
        .iter()
        .map(|iv| UsageInterval::new(iv.utc_start, iv.utc_end, Kwh(dec!(1)), Kw(dec!(0)), 5).unwrap())
        .collect();

    let computation = compute_bill(
        &customer,
        &tariff,
        &HashSet::new(),
        usage,
        (date(2024, 3, 10), date(2024, 3, 10)),
        GapStrategy::ExtrapolateLast,
        None,
    )
    .unwrap();

    let month = &computation.months()[0];
    assert_eq!(month.line_items["e"], dec!(60.00));
}

#[test]
fn s6_wrap_year_window() {
    let wrap_rule = ApplicabilityRule::new(
        time(0, 0),
        time(0, 0),
        Some(MonthDay::new(10, 1)),
        Some(MonthDay::new(5, 31)),
        true,
        true,
        true,
    )
    .unwrap();

    for (start, expect_nonzero) in [(date(2024, 7, 14), false), (date(2024, 3, 14), true), (date(2024, 11, 14), true)] {
        let customer = CustomerProfile::new(chrono_tz::UTC, 60, 31).unwrap();
        let energy = EnergyCharge::new("e".into(), "winter".into(), Rate(dec!(1)), vec![wrap_rule.clone()]).unwrap();
        let tariff = Tariff::new("acme".into(), "wrap".into(), vec![energy], vec![], vec![]).unwrap();

        let end_date = start + Duration::days(2);
        let mut usage = Vec::new();
        let mut t = Utc
            .with_ymd_and_hms(start.year(), start.month(), start.day(), 0, 0, 0)
            .unwrap();
        for _ in 0..(3 * 24) {
            let end = t + Duration::hours(1);
            usage.push(UsageInterval::new(t, end, Kwh(dec!(1)), Kw(dec!(0)), 60).unwrap());
            t = end;
        }

        let computation =
            compute_bill(&customer, &tariff, &HashSet::new(), usage, (start, end_date), GapStrategy::ExtrapolateLast, None)
                .unwrap();

        let total: Decimal = computation.months().iter().flat_map(|m| m.line_items.values().copied()).sum();
        if expect_nonzero {
            assert!(total > Decimal::ZERO, "expected nonzero total for window starting {start}");
        } else {
            assert_eq!(total, Decimal::ZERO, "expected zero total for window starting {start}");
        }
    }
}
