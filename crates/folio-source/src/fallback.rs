//! Ordered fallback over several sources.

use async_trait::async_trait;
use folio_core::RawRecord;
use tracing::{debug, warn};

use crate::{ContentSource, Result, SourceError};

/// Tries each source in order and returns the first success.
///
/// A source that succeeds with zero records still counts as a success.
#[derive(Default)]
pub struct FallbackSource {
    sources: Vec<Box<dyn ContentSource>>,
}

impl FallbackSource {
    /// Empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a source to the chain.
    #[must_use]
    pub fn with(mut self, source: impl ContentSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Append a boxed source to the chain.
    pub fn push(&mut self, source: Box<dyn ContentSource>) {
        self.sources.push(source);
    }

    /// Number of sources in the chain.
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// Whether the chain has no sources.
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

#[async_trait]
impl ContentSource for FallbackSource {
    fn name(&self) -> &str {
        "fallback"
    }

    async fn fetch(&self, collection: &str) -> Result<Vec<RawRecord>> {
        let mut last_error = None;

        for source in &self.sources {
            match source.fetch(collection).await {
                Ok(records) => {
                    debug!(collection, source = source.name(), count = records.len(), "source succeeded");
                    return Ok(records);
                }
                Err(e) => {
                    warn!(collection, source = source.name(), error = %e, "source failed, trying next");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| SourceError::Unavailable(collection.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use super::*;

    struct Fixed {
        name: &'static str,
        records: Option<usize>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl ContentSource for Fixed {
        fn name(&self) -> &str {
            self.name
        }

        async fn fetch(&self, collection: &str) -> Result<Vec<RawRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.records {
                Some(n) => Ok((0..n)
                    .map(|i| RawRecord {
                        id: format!("{}-{i}", self.name),
                        ..RawRecord::default()
                    })
                    .collect()),
                None => Err(SourceError::NotConfigured(collection.to_string())),
            }
        }
    }

    fn fixed(name: &'static str, records: Option<usize>) -> (Fixed, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Fixed {
                name,
                records,
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }

    #[tokio::test]
    async fn test_first_success_wins() {
        let (json, json_calls) = fixed("json", Some(2));
        let (api, api_calls) = fixed("api", Some(5));
        let chain = FallbackSource::new().with(json).with(api);

        let records = chain.fetch("projects").await.unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(json_calls.load(Ordering::SeqCst), 1);
        assert_eq!(api_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_falls_through_failures() {
        let (json, _) = fixed("json", None);
        let (api, api_calls) = fixed("api", Some(1));
        let chain = FallbackSource::new().with(json).with(api);

        let records = chain.fetch("projects").await.unwrap();
        assert_eq!(records[0].id, "api-0");
        assert_eq!(api_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_success_stops_the_chain() {
        let (json, _) = fixed("json", Some(0));
        let (api, api_calls) = fixed("api", Some(3));
        let chain = FallbackSource::new().with(json).with(api);

        assert!(chain.fetch("projects").await.unwrap().is_empty());
        assert_eq!(api_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_all_failing_returns_last_error() {
        let (json, _) = fixed("json", None);
        let chain = FallbackSource::new().with(json);
        assert!(matches!(
            chain.fetch("projects").await,
            Err(SourceError::NotConfigured(_))
        ));

        let empty = FallbackSource::new();
        assert!(empty.is_empty());
        assert!(matches!(
            empty.fetch("projects").await,
            Err(SourceError::Unavailable(_))
        ));
    }
}
