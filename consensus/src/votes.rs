//! Parses the `collector_consensus` archive (spec §4.C, §9 open question:
//! the exact upstream wire format is unpinned, so this module documents the
//! minimal schema this crate expects).

use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
struct VotesDocument {
    votes: Vec<RawVote>,
}

#[derive(Debug, Deserialize)]
struct RawVote {
    authority_nickname: String,
    #[serde(default)]
    directory_address: String,
    #[serde(default)]
    flag_thresholds: HashMap<String, String>,
    #[serde(default)]
    voted_fingerprints: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct AuthorityVote {
    pub authority_nickname: String,
    pub directory_address: String,
    pub thresholds: crate::thresholds::FlagThresholds,
    pub voted_fingerprints: std::collections::HashSet<String>,
}

pub fn parse_votes(body: &[u8]) -> Vec<AuthorityVote> {
    let document: VotesDocument = match serde_json::from_slice(body) {
        Ok(doc) => doc,
        Err(e) => {
            tracing::warn!(error = %e, "collector_consensus body failed to parse; diagnostics disabled");
            return Vec::new();
        }
    };

    document
        .votes
        .into_iter()
        .map(|raw| AuthorityVote {
            authority_nickname: raw.authority_nickname,
            directory_address: raw.directory_address,
            thresholds: crate::thresholds::FlagThresholds::from_raw(&raw.flag_thresholds),
            voted_fingerprints: raw
                .voted_fingerprints
                .into_iter()
                .map(|fp| fp.to_uppercase())
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_votes_with_thresholds() {
        let body = br#"{"votes":[{"authority_nickname":"moria1","directory_address":"1.2.3.4:80",
            "flag_thresholds":{"guard-wfu":"95%"},"voted_fingerprints":["aaaa"]}]}"#;
        let votes = parse_votes(body);
        assert_eq!(votes.len(), 1);
        assert_eq!(votes[0].thresholds.guard_wfu, 0.95);
        assert!(votes[0].voted_fingerprints.contains("AAAA"));
    }

    #[test]
    fn malformed_body_returns_empty() {
        assert!(parse_votes(b"not json").is_empty());
    }
}
