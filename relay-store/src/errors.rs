use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayStoreError {
    #[error("details body is missing or empty; no data available")]
    NoDetailsAvailable,
    #[error("details body did not parse as JSON: {0}")]
    MalformedDetails(#[source] serde_json::Error),
}
