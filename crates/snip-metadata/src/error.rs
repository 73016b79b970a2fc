use thiserror::Error;

/// Reasons a metadata fetch can fail.
///
/// These never leave the crate through [`MetadataFetcher`]; they are only
/// logged before falling back to placeholder metadata.
///
/// [`MetadataFetcher`]: snip_core::MetadataFetcher
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("http client could not be built: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("response body could not be read: {0}")]
    Body(#[source] reqwest::Error),
}
