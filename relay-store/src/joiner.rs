//! Merges onionoo uptime/bandwidth time-series into relay records by
//! fingerprint and flags 2-sigma outliers (spec §4.F; flag-level outlier
//! detection per SPEC_FULL.md §2, grounded in `flag_reliability_utils.py`).

use crate::types::{BandwidthSeries, PeriodSeries, Relay, UptimeSeries};
use serde::Deserialize;
use std::collections::HashMap;

const PERIODS: &[&str] = &["1_month", "6_months", "1_year", "5_years"];
const MIN_SAMPLES_FOR_OUTLIER_STATS: usize = 3;

/// Above this average, a period is classified `high-performance` regardless
/// of where it falls relative to the network mean (SPEC_FULL.md §2(a)),
/// grounded in `flag_reliability_utils.py::_determine_color_class`, which
/// checks `operator_avg > 99.0` before ever consulting network stats.
const HIGH_PERFORMANCE_THRESHOLD: f64 = 99.0;

/// Classifies one average against the network `(mean, stdev)` (`None` when
/// fewer than [`MIN_SAMPLES_FOR_OUTLIER_STATS`] samples exist), applying the
/// high-performance short-circuit before the 2-sigma comparison. The
/// high-performance check runs even with no network stats available, since
/// it's a direct threshold on the relay's own average, not a network
/// statistic.
fn classify(series: &mut PeriodSeries, network_stats: Option<(f64, f64)>) {
    let Some(avg) = series.average else { return };
    if avg > HIGH_PERFORMANCE_THRESHOLD {
        series.high_performance = true;
        series.outlier_high = false;
        series.outlier_low = false;
        return;
    }
    series.high_performance = false;
    let Some((mean, stdev)) = network_stats else { return };
    series.outlier_high = avg >= mean + 2.0 * stdev;
    series.outlier_low = avg <= mean - 2.0 * stdev;
}

#[derive(Debug, Deserialize)]
struct RawSeries {
    factor: f64,
    values: Vec<Option<i64>>,
}

#[derive(Debug, Deserialize)]
struct UptimeDocument {
    relays: Vec<UptimeRelay>,
}

#[derive(Debug, Deserialize)]
struct UptimeRelay {
    fingerprint: String,
    #[serde(default)]
    uptime: HashMap<String, RawSeries>,
    #[serde(default)]
    flags: HashMap<String, HashMap<String, RawSeries>>,
}

#[derive(Debug, Deserialize)]
struct BandwidthDocument {
    relays: Vec<BandwidthRelay>,
}

#[derive(Debug, Deserialize)]
struct BandwidthRelay {
    fingerprint: String,
    #[serde(default)]
    write_history: HashMap<String, RawSeries>,
    #[serde(default)]
    read_history: HashMap<String, RawSeries>,
}

/// `values[i] * factor * 100`, treated as a percentage. Missing or
/// entirely-null periods yield `None` (spec §4.F).
fn period_average_percent(series: &RawSeries) -> Option<f64> {
    let samples: Vec<f64> = series
        .values
        .iter()
        .filter_map(|v| v.map(|x| x as f64 * series.factor * 100.0))
        .collect();
    if samples.is_empty() {
        None
    } else {
        Some(samples.iter().sum::<f64>() / samples.len() as f64)
    }
}

fn period_history_bytes(series: &RawSeries) -> Vec<Option<f64>> {
    series
        .values
        .iter()
        .map(|v| v.map(|x| x as f64 * series.factor))
        .collect()
}

/// Joins the uptime body into each relay's [`UptimeSeries`] (without
/// computing outliers yet — that is a network-wide pass done afterward by
/// [`flag_uptime_outliers`]).
pub fn join_uptime(relays: &mut [Relay], uptime_body: Option<&[u8]>) {
    let Some(body) = uptime_body else { return };
    let document: UptimeDocument = match serde_json::from_slice(body) {
        Ok(doc) => doc,
        Err(e) => {
            tracing::warn!(error = %e, "uptime body failed to parse; skipping join");
            return;
        }
    };

    let mut by_fingerprint: HashMap<String, UptimeRelay> = document
        .relays
        .into_iter()
        .map(|r| (r.fingerprint.to_uppercase(), r))
        .collect();

    for relay in relays.iter_mut() {
        let Some(raw) = by_fingerprint.remove(&relay.fingerprint) else { continue };
        let mut periods = HashMap::new();
        for (name, series) in &raw.uptime {
            periods.insert(
                name.clone(),
                PeriodSeries { average: period_average_percent(series), ..Default::default() },
            );
        }
        let mut by_flag = HashMap::new();
        for (flag, flag_periods) in &raw.flags {
            let mut inner = HashMap::new();
            for (name, series) in flag_periods {
                inner.insert(
                    name.clone(),
                    PeriodSeries { average: period_average_percent(series), ..Default::default() },
                );
            }
            by_flag.insert(flag.clone(), inner);
        }
        relay.uptime = UptimeSeries { periods, by_flag };
    }
}

pub fn join_bandwidth(relays: &mut [Relay], bandwidth_body: Option<&[u8]>) {
    let Some(body) = bandwidth_body else { return };
    let document: BandwidthDocument = match serde_json::from_slice(body) {
        Ok(doc) => doc,
        Err(e) => {
            tracing::warn!(error = %e, "bandwidth body failed to parse; skipping join");
            return;
        }
    };

    let mut by_fingerprint: HashMap<String, BandwidthRelay> = document
        .relays
        .into_iter()
        .map(|r| (r.fingerprint.to_uppercase(), r))
        .collect();

    for relay in relays.iter_mut() {
        let Some(raw) = by_fingerprint.remove(&relay.fingerprint) else { continue };
        let write_history = raw
            .write_history
            .iter()
            .map(|(name, series)| (name.clone(), period_history_bytes(series)))
            .collect();
        let read_history = raw
            .read_history
            .iter()
            .map(|(name, series)| (name.clone(), period_history_bytes(series)))
            .collect();
        relay.bandwidth_history = BandwidthSeries { write_history, read_history };
    }
}

fn mean_stdev(samples: &[f64]) -> Option<(f64, f64)> {
    if samples.len() < MIN_SAMPLES_FOR_OUTLIER_STATS {
        return None;
    }
    let mean = samples.iter().sum::<f64>() / samples.len() as f64;
    let variance = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / samples.len() as f64;
    Some((mean, variance.sqrt()))
}

/// Network-wide 2-sigma outlier classification per period (spec §4.F).
pub fn flag_period_outliers(relays: &mut [Relay]) {
    for period in PERIODS {
        let samples: Vec<f64> = relays
            .iter()
            .filter_map(|r| r.uptime.periods.get(*period).and_then(|p| p.average))
            .collect();
        let network_stats = mean_stdev(&samples);
        for relay in relays.iter_mut() {
            if let Some(p) = relay.uptime.periods.get_mut(*period) {
                classify(p, network_stats);
            }
        }
    }
}

/// Per-flag, per-period 2-sigma outlier classification (SPEC_FULL.md §2
/// supplement, grounded in `flag_reliability_utils.py`'s
/// `FlagReliabilityAnalyzer`).
pub fn flag_uptime_outliers_by_flag(relays: &mut [Relay]) {
    let flag_names: Vec<String> = relays
        .iter()
        .flat_map(|r| r.uptime.by_flag.keys().cloned())
        .collect::<std::collections::BTreeSet<_>>()
        .into_iter()
        .collect();

    for flag in &flag_names {
        for period in PERIODS {
            let samples: Vec<f64> = relays
                .iter()
                .filter_map(|r| r.uptime.by_flag.get(flag))
                .filter_map(|periods| periods.get(*period))
                .filter_map(|p| p.average)
                .collect();
            let network_stats = mean_stdev(&samples);
            for relay in relays.iter_mut() {
                if let Some(periods) = relay.uptime.by_flag.get_mut(flag) {
                    if let Some(p) = periods.get_mut(*period) {
                        classify(p, network_stats);
                    }
                }
            }
        }
    }
}
