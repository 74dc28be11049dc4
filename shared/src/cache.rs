//! File-based cache/state store (spec §4.B, §6.4).
//!
//! One JSON blob plus a plain-text timestamp file per API, and a single
//! shared `state.json` recording worker status. All writes go through
//! [`write_atomic`]: write to a sibling temp file, then rename, so a process
//! killed mid-write never leaves a half-written file behind (spec §3.3,
//! testable property 8).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ready,
    Stale,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkerStatus {
    pub status: Status,
    pub error: Option<String>,
    pub timestamp: f64,
}

impl WorkerStatus {
    fn ready(now: f64) -> Self {
        WorkerStatus { status: Status::Ready, error: None, timestamp: now }
    }

    fn stale(error: Option<String>, now: f64) -> Self {
        WorkerStatus { status: Status::Stale, error, timestamp: now }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StateFile {
    #[serde(default)]
    workers: HashMap<String, WorkerStatus>,
    #[serde(default)]
    last_updated: f64,
}

/// A cached response body plus when it was saved, used to pick the worker's
/// timeout bucket (fresh vs. stale cache, spec §4.C step 2).
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub body: Vec<u8>,
    pub saved_at: SystemTime,
}

impl CacheEntry {
    pub fn age(&self) -> std::time::Duration {
        self.saved_at.elapsed().unwrap_or_default()
    }
}

pub struct CacheStore {
    cache_dir: PathBuf,
    state_path: PathBuf,
    state_lock: Mutex<()>,
}

fn now_unix() -> f64 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_secs_f64()
}

impl CacheStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref();
        CacheStore {
            cache_dir: data_dir.join("cache"),
            state_path: data_dir.join("state.json"),
            state_lock: Mutex::new(()),
        }
    }

    fn body_path(&self, api: &str) -> PathBuf {
        self.cache_dir.join(format!("{api}.json"))
    }

    fn timestamp_path(&self, api: &str) -> PathBuf {
        self.cache_dir.join(format!("{api}_timestamp.txt"))
    }

    /// Atomically persist `body` as the cache entry for `api`.
    pub async fn save_cache(&self, api: &str, body: &[u8]) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.cache_dir).await?;
        write_atomic(&self.body_path(api), body).await
    }

    /// Load the cached body for `api`. Missing or corrupt files return `None`
    /// and log a warning rather than propagating an error (spec §4.B).
    pub async fn load_cache(&self, api: &str) -> Option<CacheEntry> {
        let path = self.body_path(api);
        let metadata = match tokio::fs::metadata(&path).await {
            Ok(m) => m,
            Err(_) => return None,
        };
        let saved_at = metadata.modified().unwrap_or_else(|_| SystemTime::now());

        match tokio::fs::read(&path).await {
            Ok(body) => {
                if serde_json::from_slice::<serde_json::Value>(&body).is_err() {
                    tracing::warn!(api, "cache file failed to parse as JSON, treating as absent");
                    return None;
                }
                Some(CacheEntry { body, saved_at })
            }
            Err(e) => {
                tracing::warn!(api, error = %e, "failed to read cache file");
                None
            }
        }
    }

    pub async fn read_timestamp(&self, api: &str) -> Option<String> {
        tokio::fs::read_to_string(self.timestamp_path(api)).await.ok().map(|s| s.trim().to_string())
    }

    pub async fn write_timestamp(&self, api: &str, value: &str) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.cache_dir).await?;
        write_atomic(&self.timestamp_path(api), value.as_bytes()).await
    }

    async fn load_state(&self) -> StateFile {
        match tokio::fs::read(&self.state_path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "state.json failed to parse, treating as empty");
                StateFile::default()
            }),
            Err(_) => StateFile::default(),
        }
    }

    async fn save_state(&self, state: &StateFile) -> std::io::Result<()> {
        if let Some(parent) = self.state_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(state).expect("StateFile always serializes");
        write_atomic(&self.state_path, &bytes).await
    }

    /// All writers to `state.json` share this lock: it is one file shared by
    /// every API worker (spec §4.B concurrency note).
    pub async fn mark_ready(&self, api: &str) -> std::io::Result<()> {
        let _guard = self.state_lock.lock().await;
        let mut state = self.load_state().await;
        state.workers.insert(api.to_string(), WorkerStatus::ready(now_unix()));
        state.last_updated = now_unix();
        self.save_state(&state).await
    }

    pub async fn mark_stale(&self, api: &str, error: impl Into<String>) -> std::io::Result<()> {
        let _guard = self.state_lock.lock().await;
        let mut state = self.load_state().await;
        state.workers.insert(api.to_string(), WorkerStatus::stale(Some(error.into()), now_unix()));
        state.last_updated = now_unix();
        self.save_state(&state).await
    }

    pub async fn get_worker_status(&self, api: &str) -> Option<WorkerStatus> {
        self.load_state().await.workers.get(api).cloned()
    }

    pub async fn get_all_worker_status(&self) -> HashMap<String, WorkerStatus> {
        self.load_state().await.workers
    }
}

async fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("tmp");
    let tmp_path = dir.join(format!(".{file_name}.{}.tmp", std::process::id()));

    tokio::fs::write(&tmp_path, contents).await?;
    tokio::fs::rename(&tmp_path, path).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_then_load_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());

        store.save_cache("onionoo_details", br#"{"relays":[]}"#).await.unwrap();
        let entry = store.load_cache("onionoo_details").await.unwrap();
        assert_eq!(entry.body, br#"{"relays":[]}"#);
    }

    #[tokio::test]
    async fn missing_cache_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());
        assert!(store.load_cache("onionoo_details").await.is_none());
    }

    #[tokio::test]
    async fn corrupt_cache_returns_none_and_leaves_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());

        tokio::fs::create_dir_all(dir.path().join("cache")).await.unwrap();
        tokio::fs::write(dir.path().join("cache/onionoo_details.json"), b"not json")
            .await
            .unwrap();

        assert!(store.load_cache("onionoo_details").await.is_none());
        // the corrupt file is left in place, per spec's corruption policy
        assert!(tokio::fs::metadata(dir.path().join("cache/onionoo_details.json")).await.is_ok());
    }

    #[tokio::test]
    async fn corrupt_state_file_treated_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("state.json"), b"{not valid").await.unwrap();
        let store = CacheStore::new(dir.path());

        assert!(store.get_worker_status("onionoo_details").await.is_none());
    }

    #[tokio::test]
    async fn mark_ready_then_stale_overwrites_status() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());

        store.mark_ready("onionoo_details").await.unwrap();
        assert_eq!(
            store.get_worker_status("onionoo_details").await.unwrap().status,
            Status::Ready
        );

        store.mark_stale("onionoo_details", "timeout").await.unwrap();
        let status = store.get_worker_status("onionoo_details").await.unwrap();
        assert_eq!(status.status, Status::Stale);
        assert_eq!(status.error.as_deref(), Some("timeout"));
    }

    #[tokio::test]
    async fn concurrent_writers_do_not_lose_updates() {
        let dir = tempfile::tempdir().unwrap();
        let store = std::sync::Arc::new(CacheStore::new(dir.path()));

        let mut handles = Vec::new();
        for i in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.mark_ready(&format!("api_{i}")).await.unwrap();
            }));
        }
        for h in handles {
            h.await.unwrap();
        }

        let all = store.get_all_worker_status().await;
        assert_eq!(all.len(), 8);
    }

    #[tokio::test]
    async fn timestamp_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = CacheStore::new(dir.path());

        assert!(store.read_timestamp("onionoo_details").await.is_none());
        store.write_timestamp("onionoo_details", "Mon, 01 Jan 2024 12:00:00 GMT").await.unwrap();
        assert_eq!(
            store.read_timestamp("onionoo_details").await.as_deref(),
            Some("Mon, 01 Jan 2024 12:00:00 GMT")
        );
    }
}
