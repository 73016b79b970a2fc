use crate::long_url::LongUrl;
use crate::repository::UrlMapping;
use crate::shortcode::ShortCode;
use async_trait::async_trait;

type Result<T> = std::result::Result<T, crate::error::ShortenerError>;

/// Parameters for creating a shortened URL.
#[derive(Debug, Clone)]
pub struct CreateParams {
    /// The URL to be shortened.
    pub long_url: LongUrl,
    /// Optional caller-chosen short code.
    pub custom_code: Option<ShortCode>,
}

#[async_trait]
pub trait Shortener: Send + Sync + 'static {
    /// Creates a mapping and returns the stored record.
    async fn create(&self, params: CreateParams) -> Result<UrlMapping>;

    /// Looks up a mapping by its exact short code.
    /// Returns `None` if the code does not exist.
    async fn read(&self, code: &ShortCode) -> Result<Option<UrlMapping>>;

    /// Points an existing short code at a new long URL.
    /// Returns `None` if the code does not exist.
    async fn update(&self, code: &ShortCode, long_url: LongUrl) -> Result<Option<UrlMapping>>;

    /// Deletes a mapping by its short code.
    /// Returns `true` if the record existed and was removed.
    async fn delete(&self, code: &ShortCode) -> Result<bool>;

    /// Returns every mapping.
    async fn list(&self) -> Result<Vec<UrlMapping>>;
}
