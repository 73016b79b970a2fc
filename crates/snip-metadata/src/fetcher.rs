use crate::error::FetchError;
use crate::parse::parse_metadata;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Response;
use snip_core::metadata::NO_TITLE;
use snip_core::{LongUrl, MetadataFetcher, WebsiteMetadata};
use std::time::Duration;
use tracing::{debug, warn};

/// Most of a body that is read looking for `<title>` and `<link>`.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Fetches a page with a single GET and scrapes its title and favicon.
///
/// No retries are made. Redirects follow the client's default policy.
/// Without an explicit timeout a hanging site only stalls the request that
/// asked for it. Non-HTML responses are not read at all, and HTML bodies
/// are cut off after [`MAX_BODY_BYTES`].
#[derive(Debug, Clone)]
pub struct HttpMetadataFetcher {
    client: reqwest::Client,
}

impl HttpMetadataFetcher {
    /// Creates a fetcher using the client's default timeouts.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(None)
    }

    /// Creates a fetcher whose requests give up after `timeout`.
    pub fn with_timeout(timeout: Option<Duration>) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(FetchError::Client)?;
        Ok(Self::from_client(client))
    }

    /// Wraps an already configured client.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn try_fetch(&self, url: &LongUrl) -> Result<WebsiteMetadata, FetchError> {
        let response = self
            .client
            .get(url.as_url().clone())
            .send()
            .await
            .map_err(FetchError::Request)?;

        // Relative favicons resolve against where we ended up, not where we started.
        let page_url = response.url().clone();

        if !is_html(&response) {
            debug!(url = %page_url, "response is not html, skipping body");
            return Ok(WebsiteMetadata {
                title: NO_TITLE.to_string(),
                favicon: None,
            });
        }

        let body = read_capped(response, MAX_BODY_BYTES).await?;
        Ok(parse_metadata(&body, &page_url))
    }
}

/// A missing content type is given the benefit of the doubt.
fn is_html(response: &Response) -> bool {
    let Some(content_type) = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
    else {
        return true;
    };
    let mime = content_type.split(';').next().unwrap_or_default().trim();
    mime.eq_ignore_ascii_case("text/html") || mime.eq_ignore_ascii_case("application/xhtml+xml")
}

async fn read_capped(mut response: Response, limit: usize) -> Result<String, FetchError> {
    let mut body = Vec::new();
    while let Some(chunk) = response.chunk().await.map_err(FetchError::Body)? {
        let room = limit - body.len();
        body.extend_from_slice(&chunk[..chunk.len().min(room)]);
        if body.len() == limit {
            break;
        }
    }
    Ok(String::from_utf8_lossy(&body).into_owned())
}

#[async_trait]
impl MetadataFetcher for HttpMetadataFetcher {
    async fn fetch(&self, url: &LongUrl) -> WebsiteMetadata {
        match self.try_fetch(url).await {
            Ok(metadata) => {
                debug!(url = %url, title = %metadata.title, "fetched website metadata");
                metadata
            }
            Err(err) => {
                warn!(url = %url, error = %err, "website metadata unavailable");
                WebsiteMetadata::unavailable()
            }
        }
    }
}
