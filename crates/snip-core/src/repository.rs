use crate::error::StorageError;
use crate::long_url::LongUrl;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// A stored mapping from a short code to a long URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlMapping {
    /// The unique short code.
    pub short_code: ShortCode,
    /// The URL the short code resolves to.
    pub long_url: LongUrl,
    /// Best-effort page title captured at creation.
    pub title: Option<String>,
    /// Absolute favicon URL captured at creation, if one was found.
    pub favicon: Option<String>,
    /// When the mapping was created. Never changes afterwards.
    pub created_at: Timestamp,
}

/// A read-only view of a repository.
#[async_trait]
pub trait ReadRepository: Send + Sync + 'static {
    /// Retrieves the mapping for a given short code.
    /// Returns `None` if the code does not exist.
    async fn get(&self, code: &ShortCode) -> Result<Option<UrlMapping>>;

    /// Checks whether a short code already exists in the repository.
    async fn exists(&self, code: &ShortCode) -> Result<bool>;

    /// Returns every mapping in storage-native order.
    async fn list(&self) -> Result<Vec<UrlMapping>>;
}

#[async_trait]
pub trait Repository: ReadRepository {
    /// Inserts a new mapping. Returns `Err(Conflict)` if the code already exists.
    ///
    /// Backends must enforce this atomically so two concurrent inserts of the
    /// same code cannot both succeed.
    async fn insert(&self, mapping: UrlMapping) -> Result<()>;

    /// Replaces the long URL of an existing mapping, leaving every other
    /// field untouched. Returns the updated mapping, or `None` if the code
    /// does not exist.
    async fn update_long_url(
        &self,
        code: &ShortCode,
        long_url: &LongUrl,
    ) -> Result<Option<UrlMapping>>;

    /// Permanently removes the mapping for a given short code.
    /// Returns `true` if the record existed and was removed.
    async fn delete(&self, code: &ShortCode) -> Result<bool>;
}
