//! API worker: one conditional fetch with cache fallback per source (spec §4.C).

use crate::config::ApiConfig;
use shared::cache::CacheStore;
use shared::http::{self, FetchError, FetchOutcome};

/// Outcome of one `fetch_with_cache_fallback` call. A worker never raises;
/// callers distinguish "usable data" (`body.is_some()`) from "fresh data"
/// (`fresh`) per spec §4.C failure semantics.
#[derive(Debug)]
pub struct WorkerResult {
    pub api: &'static str,
    pub body: Option<Vec<u8>>,
    pub fresh: bool,
}

pub struct ApiWorker<'a> {
    config: &'a ApiConfig,
    client: &'a reqwest::Client,
    cache: &'a CacheStore,
}

impl<'a> ApiWorker<'a> {
    pub fn new(config: &'a ApiConfig, client: &'a reqwest::Client, cache: &'a CacheStore) -> Self {
        ApiWorker { config, client, cache }
    }

    pub async fn fetch_with_cache_fallback(&self) -> WorkerResult {
        let api = self.config.name;
        let cached = self.cache.load_cache(api).await;

        let is_fresh_cache = cached
            .as_ref()
            .map(|entry| entry.age() <= self.config.cache_max_age)
            .unwrap_or(false);
        let timeout = if is_fresh_cache {
            self.config.timeout_fresh_cache
        } else {
            self.config.timeout_stale_cache
        };

        let if_modified_since = if self.config.use_conditional_requests {
            self.cache.read_timestamp(api).await
        } else {
            None
        };

        let outcome = http::fetch(
            self.client,
            &self.config.url,
            if_modified_since.as_deref(),
            timeout,
        )
        .await;

        match outcome {
            Ok(FetchOutcome::NotModified) => {
                let _ = self.cache.mark_ready(api).await;
                WorkerResult {
                    api,
                    body: cached.map(|c| c.body),
                    fresh: true,
                }
            }
            Ok(FetchOutcome::Fresh { body, last_modified }) => {
                match self.validate(&body) {
                    Ok(()) => {
                        let _ = self.cache.save_cache(api, &body).await;
                        if let Some(lm) = &last_modified {
                            let _ = self.cache.write_timestamp(api, lm).await;
                        }
                        let _ = self.cache.mark_ready(api).await;
                        WorkerResult { api, body: Some(body.to_vec()), fresh: true }
                    }
                    Err(reason) => self.fall_back_or_absent(api, cached, &reason).await,
                }
            }
            Err(FetchError::Timeout { elapsed, .. }) => {
                let reason = format!("timed out after {elapsed:?}");
                self.fall_back_or_absent(api, cached, &reason).await
            }
            Err(e) => self.fall_back_or_absent(api, cached, &e.to_string()).await,
        }
    }

    fn validate(&self, body: &[u8]) -> Result<(), String> {
        let value: serde_json::Value =
            serde_json::from_slice(body).map_err(|e| format!("invalid JSON: {e}"))?;
        if value.get(self.config.count_field).is_none() {
            return Err(format!("missing required field `{}`", self.config.count_field));
        }
        Ok(())
    }

    async fn fall_back_or_absent(
        &self,
        api: &'static str,
        cached: Option<shared::cache::CacheEntry>,
        reason: &str,
    ) -> WorkerResult {
        let _ = self.cache.mark_stale(api, reason).await;
        match cached {
            Some(entry) => {
                tracing::warn!(api, reason, "falling back to cached body");
                WorkerResult { api, body: Some(entry.body), fresh: false }
            }
            None => {
                tracing::warn!(api, reason, "no cached body available");
                WorkerResult { api, body: None, fresh: false }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(url: String) -> ApiConfig {
        ApiConfig {
            name: "onionoo_details",
            display_name: "Onionoo Details",
            url,
            cache_max_age: Duration::from_secs(1800),
            timeout_fresh_cache: Duration::from_secs(1),
            timeout_stale_cache: Duration::from_secs(1),
            use_conditional_requests: true,
            count_field: "relays",
        }
    }

    #[tokio::test]
    async fn fresh_success_saves_cache_and_marks_ready() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/details"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"relays":[1,2,3]}"#))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let cache = CacheStore::new(dir.path());
        let client = reqwest::Client::new();
        let cfg = config(format!("{}/details", server.uri()));
        let worker = ApiWorker::new(&cfg, &client, &cache);

        let result = worker.fetch_with_cache_fallback().await;
        assert!(result.fresh);
        assert_eq!(result.body.unwrap(), br#"{"relays":[1,2,3]}"#);
        assert_eq!(
            cache.get_worker_status("onionoo_details").await.unwrap().status,
            shared::cache::Status::Ready
        );
    }

    #[tokio::test]
    async fn timeout_falls_back_to_cache_and_marks_stale() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/details"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let cache = CacheStore::new(dir.path());
        cache.save_cache("onionoo_details", br#"{"relays":["cached"]}"#).await.unwrap();

        let client = reqwest::Client::new();
        let cfg = config(format!("{}/details", server.uri()));
        let worker = ApiWorker::new(&cfg, &client, &cache);

        let result = worker.fetch_with_cache_fallback().await;
        assert!(!result.fresh);
        assert_eq!(result.body.unwrap(), br#"{"relays":["cached"]}"#);
        assert_eq!(
            cache.get_worker_status("onionoo_details").await.unwrap().status,
            shared::cache::Status::Stale
        );
    }

    #[tokio::test]
    async fn timeout_without_cache_returns_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/details"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let cache = CacheStore::new(dir.path());
        let client = reqwest::Client::new();
        let cfg = config(format!("{}/details", server.uri()));
        let worker = ApiWorker::new(&cfg, &client, &cache);

        let result = worker.fetch_with_cache_fallback().await;
        assert!(!result.fresh);
        assert!(result.body.is_none());
    }

    #[tokio::test]
    async fn missing_count_field_is_treated_as_io_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/details"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"version":"1"}"#))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let cache = CacheStore::new(dir.path());
        let client = reqwest::Client::new();
        let cfg = config(format!("{}/details", server.uri()));
        let worker = ApiWorker::new(&cfg, &client, &cache);

        let result = worker.fetch_with_cache_fallback().await;
        assert!(!result.fresh);
        assert!(result.body.is_none());
        assert_eq!(
            cache.get_worker_status("onionoo_details").await.unwrap().status,
            shared::cache::Status::Stale
        );
    }

    #[tokio::test]
    async fn not_modified_returns_cached_body_and_stays_ready() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/details"))
            .respond_with(ResponseTemplate::new(304))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let cache = CacheStore::new(dir.path());
        cache.save_cache("onionoo_details", br#"{"relays":["cached"]}"#).await.unwrap();
        cache.write_timestamp("onionoo_details", "Mon, 01 Jan 2024 12:00:00 GMT").await.unwrap();

        let client = reqwest::Client::new();
        let cfg = config(format!("{}/details", server.uri()));
        let worker = ApiWorker::new(&cfg, &client, &cache);

        let result = worker.fetch_with_cache_fallback().await;
        assert!(result.fresh);
        assert_eq!(result.body.unwrap(), br#"{"relays":["cached"]}"#);
    }
}
