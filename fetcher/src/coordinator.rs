//! Fans out one worker per enabled API source and collects whatever comes
//! back, tolerant of arbitrary completion order (spec §4.D).

use crate::config::ApiConfig;
use crate::worker::{ApiWorker, WorkerResult};
use shared::cache::CacheStore;
use shared::progress::ProgressSink;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinSet;

pub struct Coordinator<'a> {
    apis: &'a [ApiConfig],
    client: reqwest::Client,
    cache: Arc<CacheStore>,
    progress: &'a dyn ProgressSink,
    cancelled: Arc<AtomicBool>,
}

impl<'a> Coordinator<'a> {
    pub fn new(apis: &'a [ApiConfig], cache: Arc<CacheStore>, progress: &'a dyn ProgressSink) -> Self {
        Coordinator {
            apis,
            client: reqwest::Client::new(),
            cache,
            progress,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A caller (e.g. a signal handler) can flip this to stop issuing new
    /// requests; in-flight requests still run to completion or timeout.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }

    pub async fn run(&self) -> HashMap<&'static str, WorkerResult> {
        let total = self.apis.len();
        self.progress.line(&format!("fetching {total} source(s)"));

        let mut set: JoinSet<WorkerResult> = JoinSet::new();
        for config in self.apis {
            if self.cancelled.load(Ordering::SeqCst) {
                break;
            }
            let config = config.clone();
            let client = self.client.clone();
            let cache = self.cache.clone();
            set.spawn(async move {
                let worker = ApiWorker::new(&config, &client, &cache);
                worker.fetch_with_cache_fallback().await
            });
        }

        let mut results = HashMap::new();
        let mut completed = 0usize;
        while let Some(joined) = set.join_next().await {
            completed += 1;
            match joined {
                Ok(result) => {
                    self.progress.line(&format!(
                        "[{completed}/{total}] {} {}",
                        result.api,
                        if result.fresh { "fresh" } else { "stale/cached" }
                    ));
                    results.insert(result.api, result);
                }
                Err(e) => {
                    tracing::error!(error = %e, "worker task panicked");
                }
            }
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use shared::progress::Silent;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(name: &'static str, url: String, count_field: &'static str) -> ApiConfig {
        ApiConfig {
            name,
            display_name: name,
            url,
            cache_max_age: Duration::from_secs(1800),
            timeout_fresh_cache: Duration::from_secs(2),
            timeout_stale_cache: Duration::from_secs(2),
            use_conditional_requests: false,
            count_field,
        }
    }

    #[tokio::test]
    async fn collects_one_result_per_source_regardless_of_completion_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/fast"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"relays":[1]}"#))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/slow"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"relays":[1,2]}"#)
                    .set_delay(Duration::from_millis(200)),
            )
            .mount(&server)
            .await;

        let apis = vec![
            config("fast_source", format!("{}/fast", server.uri()), "relays"),
            config("slow_source", format!("{}/slow", server.uri()), "relays"),
        ];
        let dir = tempfile::tempdir().unwrap();
        let cache = Arc::new(CacheStore::new(dir.path()));
        let coordinator = Coordinator::new(&apis, cache, &Silent);

        let results = coordinator.run().await;
        assert_eq!(results.len(), 2);
        assert_eq!(results["fast_source"].body.as_deref(), Some(&br#"{"relays":[1]}"#[..]));
        assert_eq!(results["slow_source"].body.as_deref(), Some(&br#"{"relays":[1,2]}"#[..]));
    }

    #[tokio::test]
    async fn cancel_handle_stops_issuing_new_requests() {
        let apis: Vec<ApiConfig> = vec![config("a", "http://example.invalid/a".to_string(), "relays")];
        let dir = tempfile::tempdir().unwrap();
        let cache = Arc::new(CacheStore::new(dir.path()));
        let coordinator = Coordinator::new(&apis, cache, &Silent);

        coordinator.cancel_handle().store(true, Ordering::SeqCst);
        let results = coordinator.run().await;
        assert!(results.is_empty());
    }
}
