//! URL mapping service implementation.
//!
//! This crate ties a [`Repository`](snip_core::Repository), a
//! [`Generator`](snip_generator::Generator) and a
//! [`MetadataFetcher`](snip_core::MetadataFetcher) together behind the
//! [`Shortener`](snip_core::Shortener) trait. Core types are re-exported
//! from `snip_core`.

pub mod service;

pub use service::{MappingService, ServiceSettings, DEFAULT_MAX_ATTEMPTS};
pub use snip_core::{CreateParams, Shortener, ShortenerError};
