//! Country-level helpers: EU membership and the rare-country set, computed
//! once per run (spec §4.G "Rare-country rule", testable property 10).

use relay_store::RelayStore;
use std::collections::{HashMap, HashSet};

pub const RARE_COUNTRY_THRESHOLD: u64 = 5;

const EU_COUNTRIES: &[&str] = &[
    "at", "be", "bg", "hr", "cy", "cz", "dk", "ee", "fi", "fr", "de", "gr", "hu", "ie", "it", "lv",
    "lt", "lu", "mt", "nl", "pl", "pt", "ro", "sk", "si", "es", "se",
];

pub fn is_eu(country: &str) -> bool {
    EU_COUNTRIES.contains(&country.to_lowercase().as_str())
}

/// Per-country relay counts, computed once (spec §4.G: "compute the
/// rare-country set once per run, not per operator").
pub fn country_counts(store: &RelayStore) -> HashMap<String, u64> {
    let mut counts = HashMap::new();
    for relay in &store.relays {
        if let Some(country) = &relay.country {
            *counts.entry(country.clone()).or_insert(0) += 1;
        }
    }
    counts
}

pub fn rare_countries(counts: &HashMap<String, u64>) -> HashSet<String> {
    counts
        .iter()
        .filter(|&(_, &count)| count < RARE_COUNTRY_THRESHOLD)
        .map(|(country, _)| country.clone())
        .collect()
}

/// Rarity weight for a country: the deficit below the threshold. A country
/// with a single relay is weighted higher than one sitting just under the
/// threshold.
pub fn rarity_score(counts: &HashMap<String, u64>, country: &str) -> f64 {
    let count = counts.get(country).copied().unwrap_or(0);
    if count >= RARE_COUNTRY_THRESHOLD {
        0.0
    } else {
        (RARE_COUNTRY_THRESHOLD - count) as f64
    }
}
