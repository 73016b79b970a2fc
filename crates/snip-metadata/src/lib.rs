//! Best-effort title and favicon scraping for long URLs.

pub mod error;
pub mod fetcher;
pub mod parse;

pub use error::FetchError;
pub use fetcher::HttpMetadataFetcher;
