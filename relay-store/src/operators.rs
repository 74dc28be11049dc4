//! Builds per-operator (AROI group) aggregates from contact-hash grouping
//! (spec §3.1 Operator, §4.G "AROI eligibility").

use crate::types::{BandwidthSeries, Operator, Relay, RoleAggregate};
use std::collections::HashMap;

/// Groups relays by `contact_md5`. Relays with an empty contact string are
/// excluded from operator aggregates (spec §4.G) but remain addressable via
/// category buckets.
pub fn build_operators(relays: &[Relay]) -> HashMap<String, Operator> {
    let mut operators: HashMap<String, Operator> = HashMap::new();

    for relay in relays {
        if relay.contact.as_deref().unwrap_or("").trim().is_empty() {
            continue;
        }
        let operator = operators.entry(relay.contact_md5.clone()).or_insert_with(|| Operator {
            contact_md5: relay.contact_md5.clone(),
            aroi_domain: relay.aroi_domain.clone(),
            fingerprints: Vec::new(),
            bandwidth: 0,
            consensus_weight: 0,
            guard: RoleAggregate::default(),
            middle: RoleAggregate::default(),
            exit: RoleAggregate::default(),
            unique_as: Default::default(),
            unique_countries: Default::default(),
            unique_platforms: Default::default(),
            unique_families: Default::default(),
            first_seen: None,
            mean_uptime_6_months: None,
            mean_uptime_5_years: None,
            outlier_high_count: 0,
            outlier_low_count: 0,
            bandwidth_history: BandwidthSeries::default(),
        });

        operator.fingerprints.push(relay.fingerprint.clone());
        operator.bandwidth += relay.observed_bandwidth;
        operator.consensus_weight += relay.consensus_weight;

        let role = if relay.is_guard() {
            &mut operator.guard
        } else if relay.is_exit() {
            &mut operator.exit
        } else {
            &mut operator.middle
        };
        role.relay_count += 1;
        role.bandwidth += relay.observed_bandwidth;
        role.consensus_weight += relay.consensus_weight;

        if let Some(asn) = &relay.as_number {
            operator.unique_as.insert(asn.clone());
        }
        if let Some(country) = &relay.country {
            operator.unique_countries.insert(country.clone());
        }
        if let Some(platform) = &relay.platform {
            operator.unique_platforms.insert(platform.clone());
        }
        operator.unique_families.extend(relay.effective_family.iter().cloned());

        if let Some(first_seen) = &relay.first_seen {
            operator.first_seen = Some(match &operator.first_seen {
                Some(existing) if existing.as_str() <= first_seen.as_str() => existing.clone(),
                _ => first_seen.clone(),
            });
        }

        if relay.uptime.periods.get("6_months").and_then(|p| p.average).is_some() {
            if relay.uptime.periods["6_months"].outlier_high {
                operator.outlier_high_count += 1;
            }
            if relay.uptime.periods["6_months"].outlier_low {
                operator.outlier_low_count += 1;
            }
        }
    }

    for operator in operators.values_mut() {
        operator.mean_uptime_6_months = plain_mean(relays, &operator.fingerprints, "6_months");
        operator.mean_uptime_5_years = plain_mean(relays, &operator.fingerprints, "5_years");
        operator.bandwidth_history = BandwidthSeries {
            write_history: day_aligned_mean_history(relays, &operator.fingerprints, |r| {
                &r.bandwidth_history.write_history
            }),
            read_history: day_aligned_mean_history(relays, &operator.fingerprints, |r| {
                &r.bandwidth_history.read_history
            }),
        };
    }

    operators
}

/// Unweighted arithmetic mean across member relays' per-period uptime
/// averages (spec §4.G category 12: "no bandwidth weighting").
fn plain_mean(relays: &[Relay], fingerprints: &[String], period: &str) -> Option<f64> {
    let samples: Vec<f64> = fingerprints
        .iter()
        .filter_map(|fp| relays.iter().find(|r| &r.fingerprint == fp))
        .filter_map(|r| r.uptime.periods.get(period).and_then(|p| p.average))
        .collect();
    if samples.is_empty() {
        None
    } else {
        Some(samples.iter().sum::<f64>() / samples.len() as f64)
    }
}

/// Day-aligned mean across member relays, period by period (spec §4.F
/// "Bandwidth per-day total for operator aggregates"): at each day index,
/// the mean of whichever member relays have data there; a day with no data
/// from any member is skipped (`None`) rather than treated as zero.
fn day_aligned_mean_history<'a, F>(
    relays: &'a [Relay],
    fingerprints: &[String],
    history: F,
) -> HashMap<String, Vec<Option<f64>>>
where
    F: Fn(&'a Relay) -> &'a HashMap<String, Vec<Option<f64>>>,
{
    let members: Vec<&Relay> = fingerprints
        .iter()
        .filter_map(|fp| relays.iter().find(|r| &r.fingerprint == fp))
        .collect();

    let period_names: std::collections::BTreeSet<String> =
        members.iter().flat_map(|r| history(r).keys().cloned()).collect();

    period_names
        .into_iter()
        .map(|period| {
            let series: Vec<&Vec<Option<f64>>> =
                members.iter().filter_map(|r| history(r).get(&period)).collect();
            let days = series.iter().map(|s| s.len()).max().unwrap_or(0);
            let means = (0..days)
                .map(|day| {
                    let samples: Vec<f64> =
                        series.iter().filter_map(|s| s.get(day).copied().flatten()).collect();
                    if samples.is_empty() {
                        None
                    } else {
                        Some(samples.iter().sum::<f64>() / samples.len() as f64)
                    }
                })
                .collect();
            (period, means)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Measured, PeriodSeries, UptimeSeries};
    use std::collections::BTreeSet;

    fn relay(fingerprint: &str, contact: Option<&str>, uptime_6m: Option<f64>) -> Relay {
        let mut periods = std::collections::HashMap::new();
        if let Some(avg) = uptime_6m {
            periods.insert("6_months".to_string(), PeriodSeries { average: Some(avg), ..Default::default() });
        }
        Relay {
            fingerprint: fingerprint.to_string(),
            nickname: "r".into(),
            running: true,
            flags: vec![],
            or_addresses: vec![],
            observed_bandwidth: 1000,
            measured: Measured::Unknown,
            consensus_weight: 10,
            consensus_weight_fraction: 0.0,
            as_number: Some("AS1".into()),
            as_name: None,
            country: Some("de".into()),
            country_name: None,
            platform: None,
            version: None,
            contact: contact.map(|s| s.to_string()),
            first_seen: Some("2020-01-01".into()),
            last_seen: None,
            last_restarted: None,
            contact_md5: contact.map(|s| s.to_string()).unwrap_or_default(),
            aroi_domain: "none".into(),
            obs_bandwidth_with_unit: String::new(),
            ip_address: None,
            nickname_truncated: String::new(),
            flags_lower: vec![],
            effective_family: BTreeSet::new(),
            uptime: UptimeSeries { periods, by_flag: Default::default() },
            bandwidth_history: Default::default(),
        }
    }

    #[test]
    fn anonymous_relays_excluded_from_operators() {
        let relays = vec![relay("AAAA", None, None)];
        let operators = build_operators(&relays);
        assert!(operators.is_empty());
    }

    #[test]
    fn aggregates_sum_member_relays() {
        let relays = vec![
            relay("AAAA", Some("abc"), Some(90.0)),
            relay("BBBB", Some("abc"), Some(100.0)),
        ];
        let operators = build_operators(&relays);
        let op = operators.get("abc").unwrap();
        assert_eq!(op.total_relays(), 2);
        assert_eq!(op.bandwidth, 2000);
        assert_eq!(op.mean_uptime_6_months, Some(95.0));
    }

    #[test]
    fn bandwidth_history_is_day_aligned_mean_of_members() {
        let mut a = relay("AAAA", Some("abc"), None);
        a.bandwidth_history.write_history.insert(
            "6_months".to_string(),
            vec![Some(100.0), Some(200.0), None],
        );
        let mut b = relay("BBBB", Some("abc"), None);
        b.bandwidth_history.write_history.insert(
            "6_months".to_string(),
            vec![Some(300.0), None, None],
        );
        let operators = build_operators(&[a, b]);
        let op = operators.get("abc").unwrap();
        let history = &op.bandwidth_history.write_history["6_months"];
        assert_eq!(history, &vec![Some(200.0), Some(200.0), None]);
    }
}
