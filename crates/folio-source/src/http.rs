//! Collection files served over HTTP.

use std::{collections::BTreeMap, time::Duration};

use async_trait::async_trait;
use folio_core::{RawRecord, config::SourceConfig};
use reqwest::Client;
use tracing::debug;

use crate::{ContentSource, Result, SourceError, json::parse_records};

const HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build the HTTP client shared by the HTTP-backed sources.
pub(crate) fn build_client() -> Result<Client> {
    Ok(Client::builder()
        .connect_timeout(HTTP_CONNECT_TIMEOUT)
        .timeout(HTTP_REQUEST_TIMEOUT)
        .build()?)
}

/// Fetches `<base_url>/<collection>.json`.
#[derive(Debug, Clone)]
pub struct HttpJsonSource {
    client: Client,
    base_url: String,
    files: BTreeMap<String, String>,
}

impl HttpJsonSource {
    /// Source fetching collection files under `base_url`.
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            files: BTreeMap::new(),
        })
    }

    /// Source from configuration; `None` when no base URL is configured.
    pub fn from_config(config: &SourceConfig) -> Result<Option<Self>> {
        let Some(base_url) = config.base_url.as_deref() else {
            return Ok(None);
        };
        let mut source = Self::new(base_url)?;
        source.files = config.collections.clone();
        Ok(Some(source))
    }

    /// URL for a collection.
    pub fn url_for(&self, collection: &str) -> String {
        match self.files.get(collection) {
            Some(file) => format!("{}/{}", self.base_url, file.trim_start_matches('/')),
            None => format!("{}/{collection}.json", self.base_url),
        }
    }
}

#[async_trait]
impl ContentSource for HttpJsonSource {
    fn name(&self) -> &str {
        "http-json"
    }

    async fn fetch(&self, collection: &str) -> Result<Vec<RawRecord>> {
        let url = self.url_for(collection);
        debug!(collection, url = %url, "fetching collection");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let text = response.text().await?;
        parse_records(collection, &text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_for() {
        let source = HttpJsonSource::new("https://example.com/data/").unwrap();
        assert_eq!(
            source.url_for("projects"),
            "https://example.com/data/projects.json"
        );
    }

    #[test]
    fn test_from_config_without_base_url() {
        let config = SourceConfig::default();
        assert!(HttpJsonSource::from_config(&config).unwrap().is_none());
    }

    #[test]
    fn test_from_config_uses_file_overrides() {
        let mut config = SourceConfig::default();
        config.base_url = Some("https://cdn.example.com".to_string());
        config
            .collections
            .insert("grid".to_string(), "/grid-elements.json".to_string());

        let source = HttpJsonSource::from_config(&config).unwrap().unwrap();
        assert_eq!(
            source.url_for("grid"),
            "https://cdn.example.com/grid-elements.json"
        );
    }
}
