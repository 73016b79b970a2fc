use crate::long_url::LongUrl;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Title used when the page has no `<title>` element.
pub const NO_TITLE: &str = "No Title";
/// Title used when the page could not be fetched or parsed.
pub const FETCH_FAILED_TITLE: &str = "Error";
/// Longest title a mapping keeps, in characters. Matches the `title` column.
pub const MAX_TITLE_CHARS: usize = 255;

/// Display metadata scraped from the page behind a long URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebsiteMetadata {
    pub title: String,
    /// Absolute favicon URL, or `None` when the page does not declare one.
    pub favicon: Option<String>,
}

impl WebsiteMetadata {
    /// Placeholder returned when the fetch fails.
    pub fn unavailable() -> Self {
        Self {
            title: FETCH_FAILED_TITLE.to_string(),
            favicon: None,
        }
    }
}

/// Best-effort page metadata lookup.
///
/// Implementations never fail: any network or parse problem degrades to
/// [`WebsiteMetadata::unavailable`].
#[async_trait]
pub trait MetadataFetcher: Send + Sync + 'static {
    async fn fetch(&self, url: &LongUrl) -> WebsiteMetadata;
}
