//! Builds the per-relay diagnostics struct exposed at the renderer
//! boundary (spec §4.I `relay_diagnostics`).

use crate::eligibility::{
    check_fast_eligibility, check_guard_eligibility, check_hsdir_eligibility,
    check_stable_eligibility,
};
use crate::fingerprint::validate_fingerprint;
use crate::majority::{consensus_status, ConsensusStatus};
use crate::thresholds::{format_time_as_days, format_wfu_as_percent};
use crate::votes::AuthorityVote;
use relay_store::Relay;

#[derive(Debug, Clone)]
pub struct AuthorityVoteSummary {
    pub authority_nickname: String,
    pub voted_for_relay: bool,
}

#[derive(Debug, Clone, Default)]
pub struct FlagEligibilitySummary {
    pub guard_eligible: bool,
    pub fast_eligible: bool,
    pub hsdir_eligible: bool,
}

#[derive(Debug, Clone)]
pub struct RelayDiagnostics {
    pub fingerprint: String,
    pub consensus_status: ConsensusStatus,
    pub authority_votes: Vec<AuthorityVoteSummary>,
    pub flag_summary: FlagEligibilitySummary,
    pub reachability_summary: String,
    pub bandwidth_summary: String,
    pub issues: Vec<String>,
    pub advice: Vec<String>,
    pub thresholds_table: Vec<(String, String)>,
}

/// Approximates WFU as the relay's most recent 1-month uptime fraction and
/// TK as time since `first_seen`; onionoo's `details` body carries neither
/// figure directly (open question, recorded in DESIGN.md).
fn estimate_wfu(relay: &Relay) -> f64 {
    relay
        .uptime
        .periods
        .get("1_month")
        .and_then(|p| p.average)
        .map(|pct| pct / 100.0)
        .unwrap_or(0.0)
}

fn estimate_tk_seconds(relay: &Relay, now_days: i64) -> u64 {
    relay
        .first_seen
        .as_deref()
        .and_then(crate::date::days_since_epoch)
        .map(|first_seen_days| ((now_days - first_seen_days).max(0) as u64) * 86400)
        .unwrap_or(0)
}

pub fn build_relay_diagnostics(
    relay: &Relay,
    votes: &[AuthorityVote],
    now_days: i64,
) -> Result<RelayDiagnostics, crate::fingerprint::InvalidFingerprint> {
    validate_fingerprint(&relay.fingerprint)?;

    let authority_votes: Vec<AuthorityVoteSummary> = votes
        .iter()
        .map(|vote| AuthorityVoteSummary {
            authority_nickname: vote.authority_nickname.clone(),
            voted_for_relay: vote.voted_fingerprints.contains(&relay.fingerprint),
        })
        .collect();

    let vote_count = authority_votes.iter().filter(|v| v.voted_for_relay).count();
    let status = consensus_status(vote_count, votes.len());

    let wfu = estimate_wfu(relay);
    let tk = estimate_tk_seconds(relay, now_days);
    let bandwidth = relay.observed_bandwidth;

    // Flag eligibility is evaluated against the first authority's published
    // thresholds when available, else spec defaults (spec §4.H table).
    let thresholds = votes
        .first()
        .map(|v| v.thresholds.clone())
        .unwrap_or_else(|| crate::thresholds::FlagThresholds::from_raw(&std::collections::HashMap::new()));

    let guard = check_guard_eligibility(wfu, tk, bandwidth, &thresholds, None);
    let hsdir = check_hsdir_eligibility(wfu, tk, &thresholds);
    let fast = check_fast_eligibility(bandwidth, None);

    let mut issues = Vec::new();
    let mut advice = Vec::new();
    if !status.in_consensus {
        issues.push(format!(
            "only {}/{} authorities voted for this relay (majority requires {})",
            status.vote_count, status.total_authorities, status.majority_required
        ));
        advice.push("check reachability and clock skew on this relay".to_string());
    }
    if relay.is_guard() && !guard.eligible {
        issues.push("flagged Guard but does not meet published Guard thresholds".to_string());
    }

    let thresholds_table = vec![
        ("guard-wfu".to_string(), format_wfu_as_percent(Some(thresholds.guard_wfu), 1)),
        ("guard-tk".to_string(), format_time_as_days(Some(thresholds.guard_tk as f64), 1)),
        ("hsdir-wfu".to_string(), format_wfu_as_percent(Some(thresholds.hsdir_wfu), 1)),
        ("hsdir-tk".to_string(), format_time_as_days(Some(thresholds.hsdir_tk as f64), 1)),
    ];

    Ok(RelayDiagnostics {
        fingerprint: relay.fingerprint.clone(),
        consensus_status: status,
        authority_votes,
        flag_summary: FlagEligibilitySummary {
            guard_eligible: guard.eligible,
            fast_eligible: fast.eligible,
            hsdir_eligible: hsdir.eligible,
        },
        reachability_summary: if relay.running { "running".to_string() } else { "not running".to_string() },
        bandwidth_summary: relay.obs_bandwidth_with_unit.clone(),
        issues,
        advice,
        thresholds_table,
    })
}
