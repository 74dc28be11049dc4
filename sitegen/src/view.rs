//! The Renderer Interface (spec §4.I): an immutable, pre-formatted view
//! the template layer reads. No arithmetic or HTML escaping happens past
//! this boundary.

use relay_store::{NetworkTotals, Relay, RelayStore};
use std::collections::HashMap;

pub struct SiteView<'a> {
    pub relays: &'a [Relay],
    pub categories: CategoryView<'a>,
    pub network_totals: &'a NetworkTotals,
    pub aroi_leaderboards: &'a [leaderboard::RankedCategory],
    pub authority_diagnostics: &'a consensus::AuthorityMonitorSummary,
    diagnostics_by_fingerprint: HashMap<String, consensus::RelayDiagnostics>,
}

pub struct CategoryView<'a> {
    pub by_as: &'a HashMap<String, Vec<usize>>,
    pub by_contact: &'a HashMap<String, Vec<usize>>,
    pub by_country: &'a HashMap<String, Vec<usize>>,
    pub by_family: &'a HashMap<String, Vec<usize>>,
    pub by_flag: &'a HashMap<String, Vec<usize>>,
    pub by_platform: &'a HashMap<String, Vec<usize>>,
    pub by_first_seen: &'a HashMap<String, Vec<usize>>,
}

impl<'a> SiteView<'a> {
    pub fn new(
        store: &'a RelayStore,
        leaderboards: &'a [leaderboard::RankedCategory],
        authority_diagnostics: &'a consensus::AuthorityMonitorSummary,
        diagnostics_by_fingerprint: HashMap<String, consensus::RelayDiagnostics>,
    ) -> Self {
        SiteView {
            relays: &store.relays,
            categories: CategoryView {
                by_as: &store.buckets.by_as,
                by_contact: &store.buckets.by_contact,
                by_country: &store.buckets.by_country,
                by_family: &store.buckets.by_family,
                by_flag: &store.buckets.by_flag,
                by_platform: &store.buckets.by_platform,
                by_first_seen: &store.buckets.by_first_seen,
            },
            network_totals: &store.totals,
            aroi_leaderboards: leaderboards,
            authority_diagnostics,
            diagnostics_by_fingerprint,
        }
    }

    pub fn relay_diagnostics(&self, fingerprint: &str) -> Option<&consensus::RelayDiagnostics> {
        self.diagnostics_by_fingerprint.get(fingerprint)
    }
}
