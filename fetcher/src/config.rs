use std::time::Duration;

/// Static configuration for one upstream API source (spec §4.C).
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub name: &'static str,
    pub display_name: &'static str,
    pub url: String,
    pub cache_max_age: Duration,
    pub timeout_fresh_cache: Duration,
    pub timeout_stale_cache: Duration,
    pub use_conditional_requests: bool,
    /// Field that must be present in the parsed JSON body for it to be
    /// considered valid (spec §4.C step 6, §6.3).
    pub count_field: &'static str,
}

pub const ONIONOO_DETAILS: &str = "onionoo_details";
pub const ONIONOO_UPTIME: &str = "onionoo_uptime";
pub const ONIONOO_BANDWIDTH: &str = "onionoo_bandwidth";
pub const COLLECTOR_CONSENSUS: &str = "collector_consensus";
pub const CONSENSUS_HEALTH: &str = "consensus_health";

/// Builds the fixed table of five sources, pointed at the given base URLs.
///
/// `collector_consensus` and `consensus_health` are optional archive/health
/// feeds whose wire format the spec leaves unpinned (§9 open questions); we
/// treat them as non-conditional, JSON-object responses keyed on `votes` and
/// `authorities` respectively rather than `relays`, and they are only polled
/// when §4.H diagnostics are enabled.
pub struct ApiUrls {
    pub details: String,
    pub uptime: String,
    pub bandwidth: String,
    pub collector_consensus: Option<String>,
    pub consensus_health: Option<String>,
}

pub fn default_apis(urls: &ApiUrls) -> Vec<ApiConfig> {
    let mut apis = vec![
        ApiConfig {
            name: ONIONOO_DETAILS,
            display_name: "Onionoo Details",
            url: urls.details.clone(),
            cache_max_age: Duration::from_secs(30 * 60),
            timeout_fresh_cache: Duration::from_secs(90),
            timeout_stale_cache: Duration::from_secs(250),
            use_conditional_requests: true,
            count_field: "relays",
        },
        ApiConfig {
            name: ONIONOO_UPTIME,
            display_name: "Onionoo Uptime",
            url: urls.uptime.clone(),
            cache_max_age: Duration::from_secs(30 * 60),
            timeout_fresh_cache: Duration::from_secs(90),
            timeout_stale_cache: Duration::from_secs(250),
            use_conditional_requests: true,
            count_field: "relays",
        },
        ApiConfig {
            name: ONIONOO_BANDWIDTH,
            display_name: "Onionoo Bandwidth",
            url: urls.bandwidth.clone(),
            cache_max_age: Duration::from_secs(30 * 60),
            timeout_fresh_cache: Duration::from_secs(90),
            timeout_stale_cache: Duration::from_secs(250),
            use_conditional_requests: true,
            count_field: "relays",
        },
    ];

    if let Some(url) = &urls.collector_consensus {
        apis.push(ApiConfig {
            name: COLLECTOR_CONSENSUS,
            display_name: "Collector Consensus Votes",
            url: url.clone(),
            cache_max_age: Duration::from_secs(60 * 60),
            timeout_fresh_cache: Duration::from_secs(60),
            timeout_stale_cache: Duration::from_secs(180),
            use_conditional_requests: false,
            count_field: "votes",
        });
    }

    if let Some(url) = &urls.consensus_health {
        apis.push(ApiConfig {
            name: CONSENSUS_HEALTH,
            display_name: "Consensus Health",
            url: url.clone(),
            cache_max_age: Duration::from_secs(15 * 60),
            timeout_fresh_cache: Duration::from_secs(30),
            timeout_stale_cache: Duration::from_secs(90),
            use_conditional_requests: false,
            count_field: "authorities",
        });
    }

    apis
}
