//! Scoring, eligibility, tie-breaking, and pagination for the twelve
//! leaderboard categories (spec §4.G).

use crate::categories::{Category, CategoryMeta};
use crate::date::{days_since_epoch, now_days_since_epoch};
use crate::geography::{country_counts, is_eu, rarity_score};
use relay_store::{Operator, Relay, RelayStore};
use std::collections::HashMap;

const UPTIME_ELIGIBILITY_MIN_RELAYS: u64 = 25;
const PAGE_SIZE: usize = 10;
const MAX_RANK: usize = 25;

#[derive(Debug, Clone)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub contact_md5: String,
    pub aroi_domain: String,
    pub total_relays: u64,
    pub score: f64,
    pub display_score: String,
}

pub struct RankedCategory {
    pub meta: CategoryMeta,
    /// Pagination slices: ranks 1-10, 11-20, 21-25. Empty slices are
    /// omitted (spec §4.G "Top-N").
    pub pages: Vec<Vec<LeaderboardEntry>>,
}

fn relay_by_fingerprint<'a>(store: &'a RelayStore, fingerprint: &str) -> Option<&'a Relay> {
    store.relays.iter().find(|r| r.fingerprint == fingerprint)
}

/// Raw (score, display) pair for one operator in one category. `None` means
/// the operator is ineligible for this category.
fn score_operator(
    category: Category,
    operator: &Operator,
    store: &RelayStore,
    counts: &HashMap<String, u64>,
    now_days: i64,
) -> Option<(f64, String)> {
    match category {
        Category::Bandwidth => Some((operator.bandwidth as f64, format!("{} B/s", operator.bandwidth))),
        Category::ConsensusWeight => {
            Some((operator.consensus_weight as f64, operator.consensus_weight.to_string()))
        }
        Category::ExitAuthority => {
            let score = operator.exit.consensus_weight as f64;
            Some((score, operator.exit.consensus_weight.to_string()))
        }
        Category::GuardAuthority => {
            let score = operator.guard.consensus_weight as f64;
            Some((score, operator.guard.consensus_weight.to_string()))
        }
        Category::ExitOperators => {
            let score = operator.exit.relay_count as f64;
            Some((score, operator.exit.relay_count.to_string()))
        }
        Category::GuardOperators => {
            let score = operator.guard.relay_count as f64;
            Some((score, operator.guard.relay_count.to_string()))
        }
        Category::MostDiverse => {
            let score = (operator.unique_as.len()
                + operator.unique_countries.len()
                + operator.unique_platforms.len()
                + operator.unique_families.len()) as f64;
            Some((score, format!("{score:.0}")))
        }
        Category::PlatformDiversity => {
            let score = operator.unique_platforms.len() as f64;
            Some((score, format!("{score:.0}")))
        }
        Category::NonEuLeaders => {
            let bandwidth: u64 = operator
                .fingerprints
                .iter()
                .filter_map(|fp| relay_by_fingerprint(store, fp))
                .filter(|r| r.country.as_deref().is_some_and(|c| !is_eu(c)))
                .map(|r| r.observed_bandwidth)
                .sum();
            if bandwidth == 0 {
                None
            } else {
                Some((bandwidth as f64, format!("{bandwidth} B/s")))
            }
        }
        Category::FrontierBuilders => {
            let score: f64 = operator
                .fingerprints
                .iter()
                .filter_map(|fp| relay_by_fingerprint(store, fp))
                .filter_map(|r| r.country.as_deref())
                .map(|c| rarity_score(counts, c))
                .sum();
            if score <= 0.0 {
                None
            } else {
                Some((score, format!("{score:.1}")))
            }
        }
        Category::NetworkVeterans => {
            let max_age_days = operator
                .fingerprints
                .iter()
                .filter_map(|fp| relay_by_fingerprint(store, fp))
                .filter_map(|r| r.first_seen.as_deref())
                .filter_map(days_since_epoch)
                .map(|d| now_days - d)
                .max()?;
            let score = max_age_days as f64 * operator.total_relays() as f64;
            Some((score, format!("{score:.0}")))
        }
        Category::ReliabilityMasters => {
            if operator.total_relays() <= UPTIME_ELIGIBILITY_MIN_RELAYS {
                return None;
            }
            let avg = operator.mean_uptime_6_months?;
            Some((avg, format!("{avg:.1}")))
        }
        Category::LegacyTitans => {
            if operator.total_relays() <= UPTIME_ELIGIBILITY_MIN_RELAYS {
                return None;
            }
            let avg = operator.mean_uptime_5_years?;
            Some((avg, format!("{avg:.1}")))
        }
    }
}

pub fn rank_category(category: Category, store: &RelayStore) -> RankedCategory {
    let counts = country_counts(store);
    let now_days = now_days_since_epoch();

    let mut scored: Vec<LeaderboardEntry> = store
        .operators
        .values()
        .filter_map(|operator| {
            score_operator(category, operator, store, &counts, now_days).map(|(score, display)| {
                LeaderboardEntry {
                    rank: 0,
                    contact_md5: operator.contact_md5.clone(),
                    aroi_domain: operator.aroi_domain.clone(),
                    total_relays: operator.total_relays(),
                    score,
                    display_score: display,
                }
            })
        })
        .collect();

    // Tie-break: primary metric desc, then total_relays desc, then
    // contact-hash asc (spec §4.G "Tie-breaks").
    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.total_relays.cmp(&a.total_relays))
            .then_with(|| a.contact_md5.cmp(&b.contact_md5))
    });

    scored.truncate(MAX_RANK);
    for (idx, entry) in scored.iter_mut().enumerate() {
        entry.rank = idx + 1;
    }

    let pages = scored
        .chunks(PAGE_SIZE)
        .map(|chunk| chunk.to_vec())
        .filter(|chunk| !chunk.is_empty())
        .collect();

    RankedCategory { meta: category.meta(), pages }
}

pub fn rank_all(store: &RelayStore) -> Vec<RankedCategory> {
    crate::categories::ALL_CATEGORIES
        .iter()
        .map(|&category| rank_category(category, store))
        .collect()
}
