use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use url::Url;

/// An absolute `http`/`https` URL that a short code may point at.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LongUrl(Url);

impl LongUrl {
    /// Parses and validates a long URL.
    ///
    /// The URL must be absolute, use the `http` or `https` scheme, and carry
    /// a host.
    pub fn parse(input: &str) -> std::result::Result<Self, CoreError> {
        let url = Url::parse(input.trim())
            .map_err(|e| CoreError::InvalidUrl(format!("'{}': {e}", input)))?;
        Self::try_from(url)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn as_url(&self) -> &Url {
        &self.0
    }
}

impl TryFrom<Url> for LongUrl {
    type Error = CoreError;

    fn try_from(url: Url) -> std::result::Result<Self, Self::Error> {
        match url.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(CoreError::InvalidUrl(format!(
                    "scheme must be http or https, got '{}'",
                    scheme
                )))
            }
        }

        if url.host_str().is_none_or(str::is_empty) {
            return Err(CoreError::InvalidUrl(format!("missing host: '{}'", url)));
        }

        Ok(Self(url))
    }
}

impl TryFrom<String> for LongUrl {
    type Error = CoreError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl FromStr for LongUrl {
    type Err = CoreError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<LongUrl> for String {
    fn from(value: LongUrl) -> Self {
        value.0.into()
    }
}

impl Display for LongUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0.as_str())
    }
}
