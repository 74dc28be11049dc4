use thiserror::Error;

#[derive(Debug, Error)]
pub enum SitegenError {
    #[error("output directory {path} is not writable: {source}")]
    OutputDirUnwritable {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}
