use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use snip_core::{LongUrl, ShortCode, UrlMapping};

#[derive(Debug, Deserialize)]
pub struct CreateUrlRequest {
    pub long_url: LongUrl,
    #[serde(default)]
    pub custom_code: Option<ShortCode>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUrlRequest {
    pub long_url: LongUrl,
}

/// Body of create, update and list responses.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct UrlResponse {
    pub long_url: String,
    pub short_code: String,
}

impl From<UrlMapping> for UrlResponse {
    fn from(mapping: UrlMapping) -> Self {
        Self {
            long_url: mapping.long_url.into(),
            short_code: mapping.short_code.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UrlDetailsResponse {
    pub long_url: String,
    pub short_code: String,
    pub title: Option<String>,
    pub favicon: Option<String>,
    pub created_at: Timestamp,
}

impl From<UrlMapping> for UrlDetailsResponse {
    fn from(mapping: UrlMapping) -> Self {
        Self {
            long_url: mapping.long_url.into(),
            short_code: mapping.short_code.into(),
            title: mapping.title,
            favicon: mapping.favicon,
            created_at: mapping.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
