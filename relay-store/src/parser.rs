//! Parses the onionoo `details` body into [`Relay`] records and builds the
//! store (spec §4.E).

use crate::aroi::parse_aroi;
use crate::bandwidth::format_bytes_per_second;
use crate::errors::RelayStoreError;
use crate::types::{
    BandwidthUnit, CategoryBuckets, Measured, NetworkTotals, Relay, RelayStore, UptimeSeries,
};
use md5::{Digest, Md5};
use serde::Deserialize;
use std::collections::BTreeSet;

#[derive(Debug, Deserialize)]
struct DetailsDocument {
    #[allow(dead_code)]
    version: Option<String>,
    relays: Vec<RawRelay>,
}

#[derive(Debug, Deserialize)]
struct RawRelay {
    fingerprint: String,
    #[serde(default)]
    nickname: String,
    #[serde(default)]
    running: bool,
    #[serde(default)]
    flags: Vec<String>,
    #[serde(default)]
    or_addresses: Vec<String>,
    #[serde(default)]
    observed_bandwidth: u64,
    #[serde(default)]
    measured: Option<bool>,
    #[serde(default)]
    consensus_weight: u64,
    #[serde(default)]
    consensus_weight_fraction: f64,
    #[serde(default, rename = "as")]
    as_number: Option<String>,
    #[serde(default)]
    as_name: Option<String>,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    country_name: Option<String>,
    #[serde(default)]
    platform: Option<String>,
    #[serde(default)]
    version: Option<String>,
    #[serde(default)]
    contact: Option<String>,
    #[serde(default)]
    first_seen: Option<String>,
    #[serde(default)]
    last_seen: Option<String>,
    #[serde(default)]
    last_restarted: Option<String>,
    #[serde(default)]
    effective_family: Vec<String>,
}

/// Parses `details_body` and builds a fully populated [`RelayStore`]
/// (spec §4.E steps 1-6). An empty relay list is valid output; a missing or
/// unparsable body is [`RelayStoreError::NoDetailsAvailable`] /
/// [`RelayStoreError::MalformedDetails`].
pub fn build_relay_store(
    details_body: &[u8],
    bandwidth_unit: BandwidthUnit,
) -> Result<RelayStore, RelayStoreError> {
    if details_body.is_empty() {
        return Err(RelayStoreError::NoDetailsAvailable);
    }
    let document: DetailsDocument =
        serde_json::from_slice(details_body).map_err(RelayStoreError::MalformedDetails)?;

    let mut relays = Vec::with_capacity(document.relays.len());
    for raw in document.relays {
        match build_relay(raw, bandwidth_unit) {
            Some(relay) => relays.push(relay),
            None => continue,
        }
    }

    relays.sort_by(|a, b| a.fingerprint.cmp(&b.fingerprint));

    let buckets = build_buckets(&relays);
    let totals = build_totals(&relays, &buckets);

    Ok(RelayStore {
        relays,
        buckets,
        totals,
        operators: std::collections::HashMap::new(),
        bandwidth_unit,
    })
}

fn build_relay(raw: RawRelay, unit: BandwidthUnit) -> Option<Relay> {
    if raw.fingerprint.len() != 40 || !raw.fingerprint.chars().all(|c| c.is_ascii_hexdigit()) {
        tracing::warn!(fingerprint = %raw.fingerprint, "skipping relay with invalid fingerprint");
        return None;
    }
    let fingerprint = raw.fingerprint.to_uppercase();

    let contact_md5 = match &raw.contact {
        Some(contact) => hex::encode(Md5::digest(contact.as_bytes())),
        None => hex::encode(Md5::digest(b"")),
    };
    let aroi_domain = parse_aroi(raw.contact.as_deref());
    let obs_bandwidth_with_unit = format_bytes_per_second(raw.observed_bandwidth, unit);
    let ip_address = raw
        .or_addresses
        .first()
        .and_then(|addr| addr.rsplit_once(':'))
        .map(|(host, _port)| host.trim_start_matches('[').trim_end_matches(']').to_string());
    let nickname_truncated = truncate(&raw.nickname, 20);
    let flags_lower = raw.flags.iter().map(|f| f.to_lowercase()).collect();
    let measured = match raw.measured {
        Some(true) => Measured::True,
        Some(false) => Measured::False,
        None => Measured::Unknown,
    };

    let mut effective_family: BTreeSet<String> = raw.effective_family.into_iter().collect();
    if effective_family.len() > 1 {
        effective_family.insert(fingerprint.clone());
    }

    Some(Relay {
        fingerprint,
        nickname: raw.nickname,
        running: raw.running,
        flags: raw.flags,
        or_addresses: raw.or_addresses,
        observed_bandwidth: raw.observed_bandwidth,
        measured,
        consensus_weight: raw.consensus_weight,
        consensus_weight_fraction: raw.consensus_weight_fraction,
        as_number: raw.as_number,
        as_name: raw.as_name,
        country: raw.country,
        country_name: raw.country_name,
        platform: raw.platform,
        version: raw.version,
        contact: raw.contact,
        first_seen: raw.first_seen,
        last_seen: raw.last_seen,
        last_restarted: raw.last_restarted,
        contact_md5,
        aroi_domain,
        obs_bandwidth_with_unit,
        ip_address,
        nickname_truncated,
        flags_lower,
        effective_family,
        uptime: UptimeSeries::default(),
        bandwidth_history: Default::default(),
    })
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        s.chars().take(max).collect()
    }
}

fn build_buckets(relays: &[Relay]) -> CategoryBuckets {
    let mut buckets = CategoryBuckets::default();
    for (idx, relay) in relays.iter().enumerate() {
        if let Some(as_number) = &relay.as_number {
            buckets.by_as.entry(as_number.clone()).or_default().push(idx);
        }
        buckets
            .by_contact
            .entry(relay.contact_md5.clone())
            .or_default()
            .push(idx);
        if let Some(country) = &relay.country {
            buckets.by_country.entry(country.clone()).or_default().push(idx);
        }
        for fp in &relay.effective_family {
            buckets.by_family.entry(fp.clone()).or_default().push(idx);
        }
        for flag in &relay.flags_lower {
            buckets.by_flag.entry(flag.clone()).or_default().push(idx);
        }
        if let Some(platform) = &relay.platform {
            buckets.by_platform.entry(platform.clone()).or_default().push(idx);
        }
        if let Some(first_seen) = &relay.first_seen {
            let day = first_seen.split(' ').next().unwrap_or(first_seen).to_string();
            buckets.by_first_seen.entry(day).or_default().push(idx);
        }
    }
    buckets
}

fn build_totals(relays: &[Relay], buckets: &CategoryBuckets) -> NetworkTotals {
    let total_bandwidth = relays.iter().map(|r| r.observed_bandwidth).sum();
    let guard_consensus_weight = relays
        .iter()
        .filter(|r| r.is_guard())
        .map(|r| r.consensus_weight)
        .sum();
    let exit_consensus_weight = relays
        .iter()
        .filter(|r| r.is_exit())
        .map(|r| r.consensus_weight)
        .sum();
    let total_consensus_weight: u64 = relays.iter().map(|r| r.consensus_weight).sum();
    let middle_consensus_weight = total_consensus_weight
        .saturating_sub(guard_consensus_weight)
        .saturating_sub(exit_consensus_weight);

    let family_centralization = if relays.is_empty() {
        0.0
    } else {
        let largest_family = buckets.by_family.values().map(|v| v.len()).max().unwrap_or(0);
        largest_family as f64 / relays.len() as f64
    };

    NetworkTotals {
        total_relays: relays.len() as u64,
        total_bandwidth,
        guard_consensus_weight,
        middle_consensus_weight,
        exit_consensus_weight,
        family_centralization,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_body() -> &'static str {
        r#"{
            "version": "9.0",
            "relays": [
                {
                    "fingerprint": "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA",
                    "nickname": "alpha",
                    "running": true,
                    "flags": ["Guard", "Valid", "Running"],
                    "or_addresses": ["1.2.3.4:9001"],
                    "observed_bandwidth": 1500000,
                    "measured": true,
                    "consensus_weight": 100,
                    "consensus_weight_fraction": 0.5,
                    "as": "AS1",
                    "country": "de",
                    "contact": "url:https://relays.example.net"
                },
                {
                    "fingerprint": "BBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBB",
                    "nickname": "beta",
                    "running": true,
                    "flags": ["Exit", "Valid"],
                    "or_addresses": ["5.6.7.8:9001"],
                    "observed_bandwidth": 500000,
                    "consensus_weight": 50,
                    "consensus_weight_fraction": 0.2,
                    "as": "AS2",
                    "country": "fr"
                }
            ]
        }"#
    }

    #[test]
    fn builds_store_with_derived_fields() {
        let store = build_relay_store(sample_body().as_bytes(), BandwidthUnit::Bits).unwrap();
        assert_eq!(store.relays.len(), 2);
        let alpha = store.relays.iter().find(|r| r.nickname == "alpha").unwrap();
        assert_eq!(alpha.aroi_domain, "relays.example.net");
        assert_eq!(alpha.ip_address.as_deref(), Some("1.2.3.4"));
        assert_eq!(alpha.obs_bandwidth_with_unit, "12.00 Mbit/s");
        assert_eq!(alpha.measured, Measured::True);
    }

    #[test]
    fn totals_sum_relay_bandwidth() {
        let store = build_relay_store(sample_body().as_bytes(), BandwidthUnit::Bits).unwrap();
        assert_eq!(store.totals.total_bandwidth, 2_000_000);
        assert_eq!(store.totals.total_relays, 2);
    }

    #[test]
    fn invalid_fingerprint_is_skipped_not_fatal() {
        let body = r#"{"version":"9.0","relays":[{"fingerprint":"short","nickname":"bad"}]}"#;
        let store = build_relay_store(body.as_bytes(), BandwidthUnit::Bits).unwrap();
        assert_eq!(store.relays.len(), 0);
    }

    #[test]
    fn empty_body_is_no_details_available() {
        let err = build_relay_store(b"", BandwidthUnit::Bits).unwrap_err();
        assert!(matches!(err, RelayStoreError::NoDetailsAvailable));
    }

    #[test]
    fn empty_relay_list_is_valid() {
        let store = build_relay_store(br#"{"version":"9.0","relays":[]}"#, BandwidthUnit::Bits).unwrap();
        assert_eq!(store.relays.len(), 0);
        assert_eq!(store.totals.total_relays, 0);
    }
}
