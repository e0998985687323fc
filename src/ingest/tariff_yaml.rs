//! Tariff YAML format (§6): `applicability_rules` (optional, named, listed so
//! duplicate names can be rejected explicitly — a YAML mapping would let
//! `serde_yaml` silently keep the last duplicate key) and `tariffs` (list).
//! A charge either references a named rule or inlines its own. Times are
//! `HH:MM` local; dates are `YYYY-MM-DD` with the year ignored; booleans
//! default to `true`. Import is atomic per tariff: any error aborts before
//! any `Tariff::new` call, so nothing partially mutates.

use std::collections::HashMap;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{Datelike, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use billing_core::{ApplicabilityRule, ChargeType, CustomerCharge, DemandCharge, EnergyCharge, MonthDay, PeakType, Rate, Tariff, Usd};

fn default_true() -> bool {
    true
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct RawRule {
    #[serde(default)]
    period_start: Option<String>,
    #[serde(default)]
    period_end: Option<String>,
    #[serde(default)]
    applies_start: Option<String>,
    #[serde(default)]
    applies_end: Option<String>,
    #[serde(default = "default_true")]
    weekdays: bool,
    #[serde(default = "default_true")]
    weekends: bool,
    #[serde(default = "default_true")]
    holidays: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct NamedRule {
    name: String,
    #[serde(flatten)]
    rule: RawRule,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum RuleRef {
    Named(String),
    Inline(RawRule),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct RawEnergyCharge {
    id: String,
    name: String,
    rate_usd_per_kwh: Decimal,
    #[serde(default)]
    rules: Vec<RuleRef>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct RawDemandCharge {
    id: String,
    name: String,
    rate_usd_per_kw: Decimal,
    peak_type: String,
    #[serde(default)]
    rules: Vec<RuleRef>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct RawCustomerCharge {
    id: String,
    name: String,
    amount_usd: Decimal,
    charge_type: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct RawTariff {
    utility: String,
    name: String,
    #[serde(default)]
    energy_charges: Vec<RawEnergyCharge>,
    #[serde(default)]
    demand_charges: Vec<RawDemandCharge>,
    #[serde(default)]
    customer_charges: Vec<RawCustomerCharge>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct RawDoc {
    #[serde(default)]
    applicability_rules: Vec<NamedRule>,
    tariffs: Vec<RawTariff>,
}

fn parse_time(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M").with_context(|| format!("invalid HH:MM time '{s}'"))
}

fn parse_month_day(s: &str) -> Result<MonthDay> {
    // Year is ignored (§6); the caller always supplies one so `%Y-%m-%d`
    // parses, but it never flows into the resulting `MonthDay`.
    let date = chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("invalid YYYY-MM-DD date '{s}'"))?;
    Ok(MonthDay::new(date.month(), date.day()))
}

fn build_rule(raw: &RawRule) -> Result<ApplicabilityRule> {
    let midnight = NaiveTime::from_hms_opt(0, 0, 0).unwrap();
    let start = match &raw.period_start {
        Some(s) => parse_time(s)?,
        None => midnight,
    };
    let end = match &raw.period_end {
        Some(s) => parse_time(s)?,
        None => midnight,
    };
    let (start_md, end_md) = match (&raw.applies_start, &raw.applies_end) {
        (Some(s), Some(e)) => (Some(parse_month_day(s)?), Some(parse_month_day(e)?)),
        (None, None) => (None, None),
        _ => bail!("applies_start and applies_end must both be present or both absent"),
    };
    ApplicabilityRule::new(start, end, start_md, end_md, raw.weekdays, raw.weekends, raw.holidays)
        .map_err(|e| anyhow!(e))
}

fn resolve_rules(rules: &[RuleRef], named: &HashMap<String, ApplicabilityRule>) -> Result<Vec<ApplicabilityRule>> {
    rules
        .iter()
        .map(|r| match r {
            RuleRef::Named(name) => named.get(name).cloned().ok_or_else(|| anyhow!("reference to unknown applicability rule '{name}'")),
            RuleRef::Inline(raw) => build_rule(raw),
        })
        .collect()
}

/// Parses the §6 tariff YAML format into validated `Tariff` DTOs, keyed by
/// `(utility, name)` order as they appear in the document.
pub fn from_yaml(yaml: &str) -> Result<Vec<Tariff>> {
    let doc: RawDoc = serde_yaml::from_str(yaml).context("malformed tariff YAML")?;

    let mut named_rules: HashMap<String, ApplicabilityRule> = HashMap::new();
    for entry in &doc.applicability_rules {
        let rule = build_rule(&entry.rule)?;
        if named_rules.insert(entry.name.clone(), rule).is_some() {
            bail!("duplicate applicability rule name '{}'", entry.name);
        }
    }

    doc.tariffs
        .iter()
        .map(|raw| {
            let energy_charges = raw
                .energy_charges
                .iter()
                .map(|c| {
                    let rules = resolve_rules(&c.rules, &named_rules)?;
                    EnergyCharge::new(c.id.clone(), c.name.clone(), Rate(c.rate_usd_per_kwh), rules).map_err(|e| anyhow!(e))
                })
                .collect::<Result<Vec<_>>>()?;

            let demand_charges = raw
                .demand_charges
                .iter()
                .map(|c| {
                    let rules = resolve_rules(&c.rules, &named_rules)?;
                    let peak_type = PeakType::parse(&c.peak_type).map_err(|e| anyhow!(e))?;
                    DemandCharge::new(c.id.clone(), c.name.clone(), Rate(c.rate_usd_per_kw), peak_type, rules)
                        .map_err(|e| anyhow!(e))
                })
                .collect::<Result<Vec<_>>>()?;

            let customer_charges = raw
                .customer_charges
                .iter()
                .map(|c| {
                    let charge_type = ChargeType::parse(&c.charge_type).map_err(|e| anyhow!(e))?;
                    CustomerCharge::new(c.id.clone(), c.name.clone(), Usd(c.amount_usd), charge_type).map_err(|e| anyhow!(e))
                })
                .collect::<Result<Vec<_>>>()?;

            Tariff::new(raw.utility.clone(), raw.name.clone(), energy_charges, demand_charges, customer_charges)
                .map_err(|e| anyhow!(e))
        })
        .collect()
}

/// Exports tariffs back to the §6 YAML shape (testable property 10:
/// export/re-import round-trips to an equivalent tariff). Rules are always
/// inlined on export; the named-rule table is a convenience for hand-written
/// input, not something the round-trip needs to reconstruct.
pub fn to_yaml(tariffs: &[Tariff]) -> Result<String> {
    let raw_tariffs = tariffs
        .iter()
        .map(|t| RawTariff {
            utility: t.utility.clone(),
            name: t.name.clone(),
            energy_charges: t
                .energy_charges
                .iter()
                .map(|c| RawEnergyCharge {
                    id: c.id.clone(),
                    name: c.name.clone(),
                    rate_usd_per_kwh: c.rate_usd_per_kwh.0,
                    rules: c.rules.iter().map(rule_to_raw_ref).collect(),
                })
                .collect(),
            demand_charges: t
                .demand_charges
                .iter()
                .map(|c| RawDemandCharge {
                    id: c.id.clone(),
                    name: c.name.clone(),
                    rate_usd_per_kw: c.rate_usd_per_kw.0,
                    peak_type: match c.peak_type {
                        PeakType::Daily => "daily".to_string(),
                        PeakType::Monthly => "monthly".to_string(),
                    },
                    rules: c.rules.iter().map(rule_to_raw_ref).collect(),
                })
                .collect(),
            customer_charges: t
                .customer_charges
                .iter()
                .map(|c| RawCustomerCharge {
                    id: c.id.clone(),
                    name: c.name.clone(),
                    amount_usd: c.amount_usd.0,
                    charge_type: match c.charge_type {
                        ChargeType::Daily => "daily".to_string(),
                        ChargeType::Monthly => "monthly".to_string(),
                    },
                })
                .collect(),
        })
        .collect();

    let doc = RawDoc { applicability_rules: Vec::new(), tariffs: raw_tariffs };
    serde_yaml::to_string(&doc).context("failed to serialize tariff YAML")
}

fn rule_to_raw_ref(rule: &ApplicabilityRule) -> RuleRef {
    RuleRef::Inline(RawRule {
        period_start: Some(rule.period_start_time_local.format("%H:%M").to_string()),
        period_end: Some(rule.period_end_time_local.format("%H:%M").to_string()),
        applies_start: rule.applies_start_md.map(|md| format!("2000-{:02}-{:02}", md.month, md.day)),
        applies_end: rule.applies_end_md.map(|md| format!("2000-{:02}-{:02}", md.month, md.day)),
        weekdays: rule.applies_weekdays,
        weekends: rule.applies_weekends,
        holidays: rule.applies_holidays,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
applicability_rules:
  - name: peak
    period_start: "16:00"
    period_end: "21:00"
    weekends: false
    holidays: false
tariffs:
  - utility: acme
    name: residential
    energy_charges:
      - id: e1
        name: peak_energy
        rate_usd_per_kwh: 0.25
        rules:
          - peak
      - id: e2
        name: flat_energy
        rate_usd_per_kwh: 0.10
        rules: []
    demand_charges: []
    customer_charges:
      - id: c1
        name: base
        amount_usd: 10.00
        charge_type: monthly
"#;

    #[test]
    fn parses_named_rule_reference() {
        let tariffs = from_yaml(SAMPLE).unwrap();
        assert_eq!(tariffs.len(), 1);
        let t = &tariffs[0];
        assert_eq!(t.energy_charges.len(), 2);
        assert_eq!(t.energy_charges[0].rules.len(), 1);
        assert!(!t.energy_charges[0].rules[0].applies_weekends);
    }

    #[test]
    fn unknown_rule_reference_is_rejected() {
        let bad = SAMPLE.replace("          - peak", "          - nonexistent");
        assert!(from_yaml(&bad).is_err());
    }

    #[test]
    fn round_trip_preserves_rates_and_flags() {
        let tariffs = from_yaml(SAMPLE).unwrap();
        let yaml = to_yaml(&tariffs).unwrap();
        let reimported = from_yaml(&yaml).unwrap();
        assert_eq!(reimported.len(), tariffs.len());
        assert_eq!(reimported[0].energy_charges[0].rate_usd_per_kwh, tariffs[0].energy_charges[0].rate_usd_per_kwh);
        assert_eq!(
            reimported[0].energy_charges[0].rules[0].applies_weekends,
            tariffs[0].energy_charges[0].rules[0].applies_weekends
        );
    }
}
