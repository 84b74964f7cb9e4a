use thiserror::Error;

/// Failures surfaced by [`super::fetcher::DatasetFetcher::fetch`] and by the
/// typed-record parse that follows it.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The metadata endpoint could not be reached or answered with an error.
    #[error("catalog unavailable at {url}: {reason}")]
    CatalogUnavailable { url: String, reason: String },

    #[error("dataset '{dataset_id}' not found in catalog")]
    DatasetNotFound { dataset_id: String },

    /// One queryable resource failed to download or decode.
    #[error("resource '{resource_id}' could not be fetched: {reason}")]
    ResourceFetch { resource_id: String, reason: String },

    #[error("schema mismatch: {reason}")]
    SchemaMismatch { reason: String },
}

impl FetchError {
    pub fn schema(reason: impl Into<String>) -> Self {
        FetchError::SchemaMismatch {
            reason: reason.into(),
        }
    }
}

/// A request that never produced an HTTP status (DNS, connect, timeout, I/O).
#[derive(Debug, Error)]
#[error("{url}: {message}")]
pub struct TransportError {
    pub url: String,
    pub message: String,
}
