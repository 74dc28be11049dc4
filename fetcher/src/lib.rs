pub mod config;
pub mod coordinator;
pub mod error;
pub mod worker;

pub use config::{default_apis, ApiConfig, ApiUrls};
pub use coordinator::Coordinator;
pub use error::FetcherError;
pub use worker::{ApiWorker, WorkerResult};
