//! ApplicabilityEvaluator: computes, for each interval, a boolean mask per
//! rule, and the OR-composed mask for a charge's full rule set (§4.3).

use chrono::Datelike;

use crate::bitset::Bitset;
use crate::domain::rules::MonthDay;
use crate::domain::ApplicabilityRule;
use crate::timegrid::{Interval, TimeGrid};

/// Evaluates a single rule against every interval in the grid.
pub fn evaluate_rule(grid: &TimeGrid, rule: &ApplicabilityRule) -> Bitset {
    let mut mask = Bitset::zeros(grid.len());
    for (i, interval) in grid.intervals.iter().enumerate() {
        mask.set(i, rule_matches(rule, interval));
    }
    mask
}

/// Evaluates every rule in `rules` and OR-composes the results — a charge
/// with multiple rules applies whenever *any* rule matches (§3, §4.3).
pub fn evaluate_rules(grid: &TimeGrid, rules: &[ApplicabilityRule]) -> Bitset {
    let mut mask = Bitset::zeros(grid.len());
    for rule in rules {
        mask.union_with(&evaluate_rule(grid, rule));
    }
    mask
}

fn rule_matches(rule: &ApplicabilityRule, interval: &Interval) -> bool {
    time_of_day_matches(rule, interval) && month_day_matches(rule, interval) && day_class_matches(rule, interval)
}

fn time_of_day_matches(rule: &ApplicabilityRule, interval: &Interval) -> bool {
    if rule.is_all_day() {
        return true;
    }
    let t = interval.local_start.time();
    t >= rule.period_start_time_local && t < rule.period_end_time_local
}

fn month_day_matches(rule: &ApplicabilityRule, interval: &Interval) -> bool {
    match (rule.applies_start_md, rule.applies_end_md) {
        (Some(start), Some(end)) => {
            let date = interval.local_start.date();
            MonthDay::new(date.month(), date.day()).within(start, end)
        }
        _ => true,
    }
}

fn day_class_matches(rule: &ApplicabilityRule, interval: &Interval) -> bool {
    rule.day_class_matches(interval.day_class)
}
