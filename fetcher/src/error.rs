use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetcherError {
    #[error("no data available from any source")]
    NoDataAvailable,
    #[error("cache directory {path} is not writable: {source}")]
    CacheDirUnwritable {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}
