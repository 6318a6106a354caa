//! Folio Source Library
//!
//! Every way of getting raw records goes through [`ContentSource`]: static JSON files,
//! JSON over HTTP, the page/block content API, a fallback chain over several sources,
//! and a TTL cache in front of any of them.

pub mod api;
pub mod cache;
pub mod error;
pub mod fallback;
pub mod http;
pub mod json;

use std::sync::Arc;

use async_trait::async_trait;
use folio_core::RawRecord;

pub use api::ContentApi;
pub use cache::{CachedSource, DEFAULT_TTL};
pub use error::{Result, SourceError};
pub use fallback::FallbackSource;
pub use http::HttpJsonSource;
pub use json::JsonFileSource;

/// A provider of raw records, one list per named collection.
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Human-readable source name, used in logs.
    fn name(&self) -> &str;

    /// Fetch every raw record of a collection.
    async fn fetch(&self, collection: &str) -> Result<Vec<RawRecord>>;
}

#[async_trait]
impl<S: ContentSource + ?Sized> ContentSource for Arc<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn fetch(&self, collection: &str) -> Result<Vec<RawRecord>> {
        (**self).fetch(collection).await
    }
}

#[async_trait]
impl<S: ContentSource + ?Sized> ContentSource for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn fetch(&self, collection: &str) -> Result<Vec<RawRecord>> {
        (**self).fetch(collection).await
    }
}
