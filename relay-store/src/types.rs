//! Core entities of the relay store (spec §3.1-3.2).

use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};

pub const KNOWN_FLAGS: &[&str] = &[
    "Authority", "BadExit", "Exit", "Fast", "Guard", "HSDir", "Running", "Stable", "StaleDesc",
    "V2Dir", "Valid",
];

/// Canonical ordering used when a relay's flags are rendered (spec §4.H):
/// `Authority` first, then the rest of [`KNOWN_FLAGS`] in order, then any
/// unrecognized flag sorted alphabetically.
pub fn sort_flags(flags: &[String]) -> Vec<String> {
    let known_rank = |flag: &str| -> Option<usize> {
        if flag == "Authority" {
            return Some(0);
        }
        KNOWN_FLAGS
            .iter()
            .position(|f| *f == flag)
            .map(|idx| idx + 1)
    };

    let mut known: Vec<&String> = flags.iter().filter(|f| known_rank(f).is_some()).collect();
    let mut unknown: Vec<&String> = flags.iter().filter(|f| known_rank(f).is_none()).collect();

    known.sort_by_key(|f| known_rank(f).unwrap());
    unknown.sort();

    known.into_iter().chain(unknown).cloned().collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Measured {
    True,
    False,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BandwidthUnit {
    Bits,
    Bytes,
}

/// A single normalized period within an uptime or bandwidth time-series
/// (spec §3.2): `values[i] * factor [* 100]`.
#[derive(Debug, Clone, Default)]
pub struct PeriodSeries {
    pub average: Option<f64>,
    pub outlier_high: bool,
    pub outlier_low: bool,
    /// Set when `average` clears the 99% "high-performance" line, which
    /// takes precedence over the 2-sigma outlier comparison regardless of
    /// how `average` sits relative to the network mean (SPEC_FULL.md §2(a),
    /// grounded on `flag_reliability_utils.py::_determine_color_class`).
    pub high_performance: bool,
}

#[derive(Debug, Clone, Default)]
pub struct UptimeSeries {
    pub periods: HashMap<String, PeriodSeries>,
    /// Per-flag uptime series, supplementing §4.F with the flag-level
    /// outlier detection described in SPEC_FULL.md §2.
    pub by_flag: HashMap<String, HashMap<String, PeriodSeries>>,
}

#[derive(Debug, Clone, Default)]
pub struct BandwidthSeries {
    pub write_history: HashMap<String, Vec<Option<f64>>>,
    pub read_history: HashMap<String, Vec<Option<f64>>>,
}

#[derive(Debug, Clone)]
pub struct Relay {
    pub fingerprint: String,
    pub nickname: String,
    pub running: bool,
    pub flags: Vec<String>,
    pub or_addresses: Vec<String>,
    pub observed_bandwidth: u64,
    pub measured: Measured,
    pub consensus_weight: u64,
    pub consensus_weight_fraction: f64,
    pub as_number: Option<String>,
    pub as_name: Option<String>,
    pub country: Option<String>,
    pub country_name: Option<String>,
    pub platform: Option<String>,
    pub version: Option<String>,
    pub contact: Option<String>,
    pub first_seen: Option<String>,
    pub last_seen: Option<String>,
    pub last_restarted: Option<String>,

    // Derived fields, attached by the builder (spec §4.E step 2).
    pub contact_md5: String,
    pub aroi_domain: String,
    pub obs_bandwidth_with_unit: String,
    pub ip_address: Option<String>,
    pub nickname_truncated: String,
    pub flags_lower: Vec<String>,

    // Family closure (spec §4.E step 5).
    pub effective_family: BTreeSet<String>,

    // Joined series (spec §4.F).
    pub uptime: UptimeSeries,
    pub bandwidth_history: BandwidthSeries,
}

impl Relay {
    pub fn is_exit(&self) -> bool {
        self.flags.iter().any(|f| f == "Exit")
    }

    pub fn is_guard(&self) -> bool {
        self.flags.iter().any(|f| f == "Guard")
    }

    pub fn is_authority(&self) -> bool {
        self.flags.iter().any(|f| f == "Authority")
    }
}

#[derive(Debug, Clone, Default)]
pub struct RoleAggregate {
    pub relay_count: u64,
    pub bandwidth: u64,
    pub consensus_weight: u64,
}

/// Derived aggregation keyed by contact-hash (spec §3.1 Operator).
#[derive(Debug, Clone)]
pub struct Operator {
    pub contact_md5: String,
    pub aroi_domain: String,
    pub fingerprints: Vec<String>,
    pub bandwidth: u64,
    pub consensus_weight: u64,
    pub guard: RoleAggregate,
    pub middle: RoleAggregate,
    pub exit: RoleAggregate,
    pub unique_as: BTreeSet<String>,
    pub unique_countries: BTreeSet<String>,
    pub unique_platforms: BTreeSet<String>,
    pub unique_families: BTreeSet<String>,
    pub first_seen: Option<String>,
    pub mean_uptime_6_months: Option<f64>,
    pub mean_uptime_5_years: Option<f64>,
    pub outlier_high_count: u64,
    pub outlier_low_count: u64,
    /// Per-period, day-aligned mean of member relays' `bandwidth_history`
    /// (spec §4.F): `bandwidth_history[period][day]` is the mean of every
    /// member relay that has data for that day, or `None` if none do.
    pub bandwidth_history: BandwidthSeries,
}

impl Operator {
    pub fn total_relays(&self) -> u64 {
        self.fingerprints.len() as u64
    }
}

#[derive(Debug, Clone, Default)]
pub struct NetworkTotals {
    pub total_relays: u64,
    pub total_bandwidth: u64,
    pub guard_consensus_weight: u64,
    pub middle_consensus_weight: u64,
    pub exit_consensus_weight: u64,
    /// Fraction of relays belonging to the single largest family; a crude
    /// family-centralization signal (spec §3.1).
    pub family_centralization: f64,
}

/// Category-key to value to relay-index mapping (spec §3.1 CategoryBucket).
#[derive(Debug, Clone, Default)]
pub struct CategoryBuckets {
    pub by_as: HashMap<String, Vec<usize>>,
    pub by_contact: HashMap<String, Vec<usize>>,
    pub by_country: HashMap<String, Vec<usize>>,
    pub by_family: HashMap<String, Vec<usize>>,
    pub by_flag: HashMap<String, Vec<usize>>,
    pub by_platform: HashMap<String, Vec<usize>>,
    pub by_first_seen: HashMap<String, Vec<usize>>,
}

#[derive(Debug)]
pub struct RelayStore {
    pub relays: Vec<Relay>,
    pub buckets: CategoryBuckets,
    pub totals: NetworkTotals,
    pub operators: HashMap<String, Operator>,
    pub bandwidth_unit: BandwidthUnit,
}

impl RelayStore {
    pub fn find_index(&self, fingerprint: &str) -> Option<usize> {
        self.relays.iter().position(|r| r.fingerprint == fingerprint)
    }

    pub fn authorities(&self) -> impl Iterator<Item = &Relay> {
        self.relays.iter().filter(|r| r.is_authority())
    }
}
