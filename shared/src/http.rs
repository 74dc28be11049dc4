//! Total-timeout HTTP fetch (spec §4.A).
//!
//! A plain `reqwest` per-socket timeout only bounds how long a connection can
//! sit idle between bytes; a server that trickles one byte every few seconds
//! never trips it and can hold a caller open far past any reasonable
//! deadline. We wrap the whole send-and-drain in an outer `tokio::time::timeout`
//! instead, the way `send_to_upstream` wraps `client.request(...)` — except
//! here the wrapped future also drains the body, so a slow body is caught too.
//! Dropping the future on timeout drops the in-flight connection with it.

use reqwest::header::{HeaderValue, IF_MODIFIED_SINCE};
use std::time::{Duration, Instant};

#[derive(Debug)]
pub enum FetchOutcome {
    /// 200 OK with a fresh body and the upstream's Last-Modified, if any.
    Fresh { body: bytes::Bytes, last_modified: Option<String> },
    /// 304 Not Modified — caller should reuse its cached body.
    NotModified,
}

#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("timed out after {elapsed:?} (deadline {deadline:?})")]
    Timeout { elapsed: Duration, deadline: Duration },
    #[error("transport error: {0}")]
    Io(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(reqwest::StatusCode),
}

/// Issue one GET against `url`, optionally conditional on `if_modified_since`,
/// bounded by `deadline` wall-clock time regardless of how the body streams.
pub async fn fetch(
    client: &reqwest::Client,
    url: &str,
    if_modified_since: Option<&str>,
    deadline: Duration,
) -> Result<FetchOutcome, FetchError> {
    let started = Instant::now();

    let mut builder = client.get(url);
    if let Some(ims) = if_modified_since
        && let Ok(value) = HeaderValue::from_str(ims)
    {
        builder = builder.header(IF_MODIFIED_SINCE, value);
    }

    let attempt = async move {
        let response = builder.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_MODIFIED {
            return Ok(FetchOutcome::NotModified);
        }
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let last_modified = response
            .headers()
            .get(reqwest::header::LAST_MODIFIED)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        let body = response.bytes().await?;
        Ok(FetchOutcome::Fresh { body, last_modified })
    };

    match tokio::time::timeout(deadline, attempt).await {
        Ok(result) => result,
        Err(_) => Err(FetchError::Timeout { elapsed: started.elapsed(), deadline }),
    }
}
