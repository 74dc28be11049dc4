//! Process wiring: fetch -> store -> {joiner, leaderboard, consensus} ->
//! renderer -> files (spec §2 "Data flow").

use crate::cli::Cli;
use crate::errors::SitegenError;
use crate::view::SiteView;
use crate::writer::write_site;
use fetcher::{default_apis, ApiUrls, Coordinator};
use shared::cache::CacheStore;
use shared::metrics::Metrics;
use shared::progress::{ProgressSink, Silent, Stdout};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum RunOutcome {
    #[error(transparent)]
    Internal(#[from] SitegenError),
}

/// Returns `Ok(())` both on success and on "no data available" (spec §6.1
/// exit-code semantics fold both into a clean exit).
pub async fn run(cli: Cli) -> Result<(), RunOutcome> {
    let progress: Box<dyn ProgressSink> = if cli.progress { Box::new(Stdout) } else { Box::new(Silent) };

    let data_dir = cli.out.join(".cache");
    let cache = Arc::new(CacheStore::new(&data_dir));

    let diagnostics_enabled = crate::cli::collector_diagnostics_enabled();
    let urls = ApiUrls {
        details: cli.onionoo_details_url.clone(),
        uptime: cli.onionoo_uptime_url.clone(),
        bandwidth: cli.onionoo_bandwidth_url.clone(),
        collector_consensus: diagnostics_enabled
            .then(|| crate::cli::DEFAULT_COLLECTOR_CONSENSUS_URL.to_string()),
        consensus_health: None,
    };
    let apis = default_apis(&urls);
    let coordinator = Coordinator::new(&apis, cache.clone(), progress.as_ref());
    let results = coordinator.run().await;

    let metrics = Metrics::new_noop();
    for result in results.values() {
        let outcome = if result.body.is_none() {
            "timeout"
        } else if result.fresh {
            "success"
        } else {
            "stale"
        };
        metrics.incr(&format!("fetch.{outcome}"), &[("api", result.api)]);
    }

    let details_body = results
        .get(fetcher::config::ONIONOO_DETAILS)
        .and_then(|r| r.body.clone());
    let Some(details_body) = details_body else {
        progress.line("no data available; exiting cleanly");
        return Ok(());
    };

    let uptime_body = results.get(fetcher::config::ONIONOO_UPTIME).and_then(|r| r.body.clone());
    let bandwidth_body = results.get(fetcher::config::ONIONOO_BANDWIDTH).and_then(|r| r.body.clone());

    let unit: relay_store::BandwidthUnit = cli.display_bandwidth_units.into();
    let store = match relay_store::build_store(
        &details_body,
        uptime_body.as_deref(),
        bandwidth_body.as_deref(),
        unit,
    ) {
        Ok(store) => store,
        Err(relay_store::RelayStoreError::NoDetailsAvailable) => {
            progress.line("no data available; exiting cleanly");
            return Ok(());
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to build relay store");
            progress.line("no data available; exiting cleanly");
            return Ok(());
        }
    };

    progress.line("ranking leaderboards");
    let leaderboards = leaderboard::rank_all(&store);

    progress.line("computing consensus diagnostics");
    let votes: Vec<consensus::AuthorityVote> = results
        .get(fetcher::config::COLLECTOR_CONSENSUS)
        .and_then(|r| r.body.as_deref())
        .map(consensus::parse_votes)
        .unwrap_or_default();
    let authorities: Vec<(String, String)> = store
        .authorities()
        .map(|r| (r.nickname.clone(), r.ip_address.clone().unwrap_or_default()))
        .collect();
    let authority_diagnostics = consensus::monitor_authorities(&authorities, &consensus::NullProbe);

    let now_days = leaderboard::date::now_days_since_epoch();
    let mut diagnostics_by_fingerprint = HashMap::new();
    for relay in &store.relays {
        if let Ok(diag) = consensus::build_relay_diagnostics(relay, &votes, now_days) {
            diagnostics_by_fingerprint.insert(relay.fingerprint.clone(), diag);
        }
    }

    let view = SiteView::new(&store, &leaderboards, &authority_diagnostics, diagnostics_by_fingerprint);

    progress.line(&format!("writing site to {}", cli.out.display()));
    write_site(&cli.out, &view)?;

    progress.line("done");
    Ok(())
}
