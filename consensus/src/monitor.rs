//! Authority liveness/latency monitor (spec §4.H "Authority monitor").
//!
//! Probing an authority's directory port is a real I/O concern outside the
//! core's scope (spec §1's external collaborators); [`AuthorityProbe`] is
//! the seam the core depends on, grounded in the multi-backend trait shape
//! of `BackupRouteProvider`.

const SLOW_LATENCY_MS: u64 = 1_000;

#[derive(Debug, Clone)]
pub struct ProbeResult {
    pub online: bool,
    pub latency_ms: Option<u64>,
    pub error: Option<String>,
}

pub trait AuthorityProbe {
    fn probe(&self, directory_address: &str) -> ProbeResult;
}

/// Used when no probing backend is configured; every authority reports
/// unknown/offline rather than silently appearing healthy.
pub struct NullProbe;

impl AuthorityProbe for NullProbe {
    fn probe(&self, _directory_address: &str) -> ProbeResult {
        ProbeResult { online: false, latency_ms: None, error: Some("probing disabled".to_string()) }
    }
}

#[derive(Debug, Clone)]
pub enum AlertSeverity {
    Critical,
    Warning,
}

#[derive(Debug, Clone)]
pub struct Alert {
    pub authority_nickname: String,
    pub severity: AlertSeverity,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct AuthorityMonitorSummary {
    pub total: usize,
    pub online: usize,
    pub offline: usize,
    pub average_latency_ms: Option<f64>,
    pub slow: Vec<String>,
    pub offline_authorities: Vec<String>,
    pub alerts: Vec<Alert>,
}

/// Probes every authority and builds the summary.
pub fn monitor_authorities(
    authorities: &[(String, String)],
    probe: &dyn AuthorityProbe,
) -> AuthorityMonitorSummary {
    let mut online = 0;
    let mut latencies = Vec::new();
    let mut slow = Vec::new();
    let mut offline_authorities = Vec::new();
    let mut alerts = Vec::new();

    for (nickname, directory_address) in authorities {
        let result = probe.probe(directory_address);
        if result.online {
            online += 1;
        } else {
            offline_authorities.push(nickname.clone());
            alerts.push(Alert {
                authority_nickname: nickname.clone(),
                severity: AlertSeverity::Critical,
                message: result.error.unwrap_or_else(|| "authority offline".to_string()),
            });
        }
        if let Some(latency) = result.latency_ms {
            latencies.push(latency);
            if latency > SLOW_LATENCY_MS {
                slow.push(nickname.clone());
                alerts.push(Alert {
                    authority_nickname: nickname.clone(),
                    severity: AlertSeverity::Warning,
                    message: format!("latency {latency}ms exceeds {SLOW_LATENCY_MS}ms"),
                });
            }
        }
    }

    let average_latency_ms = if latencies.is_empty() {
        None
    } else {
        Some(latencies.iter().sum::<u64>() as f64 / latencies.len() as f64)
    };

    AuthorityMonitorSummary {
        total: authorities.len(),
        online,
        offline: authorities.len() - online,
        average_latency_ms,
        slow,
        offline_authorities,
        alerts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct StaticProbe(HashMap<String, ProbeResult>);

    impl AuthorityProbe for StaticProbe {
        fn probe(&self, directory_address: &str) -> ProbeResult {
            self.0
                .get(directory_address)
                .cloned()
                .unwrap_or(ProbeResult { online: false, latency_ms: None, error: None })
        }
    }

    #[test]
    fn offline_authority_raises_critical_alert() {
        let probe = StaticProbe(HashMap::new());
        let summary = monitor_authorities(&[("moria1".to_string(), "1.2.3.4:80".to_string())], &probe);
        assert_eq!(summary.offline, 1);
        assert_eq!(summary.alerts.len(), 1);
        assert!(matches!(summary.alerts[0].severity, AlertSeverity::Critical));
    }

    #[test]
    fn slow_authority_raises_warning() {
        let mut map = HashMap::new();
        map.insert(
            "1.2.3.4:80".to_string(),
            ProbeResult { online: true, latency_ms: Some(1500), error: None },
        );
        let probe = StaticProbe(map);
        let summary = monitor_authorities(&[("moria1".to_string(), "1.2.3.4:80".to_string())], &probe);
        assert_eq!(summary.online, 1);
        assert_eq!(summary.slow, vec!["moria1".to_string()]);
        assert!(summary.alerts.iter().any(|a| matches!(a.severity, AlertSeverity::Warning)));
    }

    #[test]
    fn null_probe_reports_offline() {
        let summary = monitor_authorities(&[("moria1".to_string(), "x".to_string())], &NullProbe);
        assert_eq!(summary.offline, 1);
    }
}
