use std::time::Duration;

/// Errors that cross the `shared` crate boundary.
///
/// Corresponds to spec §7's TransientNetworkError / ProtocolError kinds for
/// the fetch layer, and StateFileCorrupt / CacheFileCorrupt for the cache.
#[derive(thiserror::Error, Debug)]
pub enum SharedError {
    #[error("request to {url} timed out after {elapsed:?}")]
    Timeout { url: String, elapsed: Duration },

    #[error("request to {url} failed: {source}")]
    Io {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("I/O error writing {path}: {source}")]
    CacheWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
