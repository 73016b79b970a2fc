//! Core types and traits for the snip URL shortener.
//!
//! This crate holds the persistence model, the repository contract, and the
//! service/fetcher traits shared by the storage backends, the mapping
//! service, and the HTTP gateway.

pub mod error;
pub mod long_url;
pub mod metadata;
pub mod repository;
pub mod shortcode;
pub mod shortener;

pub use error::{CoreError, ShortenerError, StorageError};
pub use long_url::LongUrl;
pub use metadata::{MetadataFetcher, WebsiteMetadata};
pub use repository::{ReadRepository, Repository, UrlMapping};
pub use shortcode::ShortCode;
pub use shortener::{CreateParams, Shortener};
