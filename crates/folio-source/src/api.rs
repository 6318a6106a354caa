//! Client for the page/block content API.
//!
//! Collections map to databases. A fetch queries the database page by page
//! (`POST /databases/{id}/query`, following `next_cursor`) and optionally pulls each
//! page's block tree (`GET /blocks/{id}/children`) into the record's content.

use std::{collections::BTreeMap, fmt, future::Future, pin::Pin};

use async_trait::async_trait;
use folio_core::{RawRecord, config::SourceConfig};
use reqwest::{Client, RequestBuilder};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::{debug, info, warn};

use crate::{ContentSource, Result, SourceError, http::build_client};

/// Largest page size the API accepts.
pub const PAGE_SIZE: u32 = 100;

/// Nesting depth followed when pulling block children.
pub const MAX_BLOCK_DEPTH: usize = 3;

/// One page of a paginated list response.
#[derive(Debug, Default, Deserialize)]
struct ListPage {
    #[serde(default)]
    results: Vec<Value>,
    #[serde(default)]
    has_more: bool,
    #[serde(default)]
    next_cursor: Option<String>,
}

impl ListPage {
    /// Cursor for the next request, if there is one.
    fn cursor(self) -> (Vec<Value>, Option<String>) {
        let next = if self.has_more { self.next_cursor } else { None };
        (self.results, next)
    }
}

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Content API client.
#[derive(Clone)]
pub struct ContentApi {
    client: Client,
    api_base: String,
    api_version: String,
    token: String,
    databases: BTreeMap<String, String>,
    include_content: bool,
}

impl fmt::Debug for ContentApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContentApi")
            .field("api_base", &self.api_base)
            .field("api_version", &self.api_version)
            .field("databases", &self.databases)
            .field("include_content", &self.include_content)
            .finish_non_exhaustive()
    }
}

impl ContentApi {
    /// Client for `api_base` with an explicit token.
    pub fn new(api_base: &str, api_version: &str, token: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            api_base: api_base.trim_end_matches('/').to_string(),
            api_version: api_version.to_string(),
            token: token.into(),
            databases: BTreeMap::new(),
            include_content: false,
        })
    }

    /// Client from configuration, reading the token from the configured variable.
    pub fn from_config(config: &SourceConfig) -> Result<Self> {
        let token = std::env::var(&config.token_env)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| SourceError::MissingToken(config.token_env.clone()))?;
        Self::from_config_with_token(config, token)
    }

    /// Client from configuration with an explicit token.
    pub fn from_config_with_token(config: &SourceConfig, token: impl Into<String>) -> Result<Self> {
        let api = Self::new(&config.api_base, &config.api_version, token)?;
        Ok(api.with_databases(config.databases.clone()))
    }

    /// Set the collection to database id map.
    #[must_use]
    pub fn with_databases(mut self, databases: BTreeMap<String, String>) -> Self {
        self.databases = databases;
        self
    }

    /// Also fetch each page's blocks into the record content.
    #[must_use]
    pub fn with_page_content(mut self, include: bool) -> Self {
        self.include_content = include;
        self
    }

    /// Database id for a collection.
    pub fn database_for(&self, collection: &str) -> Option<&str> {
        self.databases.get(collection).map(String::as_str)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path.trim_start_matches('/'))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .bearer_auth(&self.token)
            .header("Notion-Version", &self.api_version)
    }

    async fn send(&self, request: RequestBuilder, url: String) -> Result<ListPage> {
        let response = self.authorize(request).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Status {
                url,
                status: status.as_u16(),
            });
        }
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| SourceError::json(url, e))
    }

    /// Every page of a database, following cursors.
    pub async fn query_database(&self, database_id: &str) -> Result<Vec<Value>> {
        let url = self.url(&format!("databases/{database_id}/query"));
        let mut pages = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut body = json!({ "page_size": PAGE_SIZE });
            if let Some(c) = &cursor {
                body["start_cursor"] = Value::String(c.clone());
            }

            let request = self.client.post(&url).json(&body);
            let (results, next) = self.send(request, url.clone()).await?.cursor();
            debug!(database_id, batch = results.len(), "database page fetched");
            pages.extend(results);

            match next {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        Ok(pages)
    }

    /// Direct children of a block (or page), following cursors.
    pub async fn block_children(&self, block_id: &str) -> Result<Vec<Value>> {
        let url = self.url(&format!("blocks/{block_id}/children"));
        let mut blocks = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut query = vec![("page_size", PAGE_SIZE.to_string())];
            if let Some(c) = &cursor {
                query.push(("start_cursor", c.clone()));
            }

            let request = self.client.get(&url).query(&query);
            let (results, next) = self.send(request, url.clone()).await?.cursor();
            blocks.extend(results);

            match next {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        Ok(blocks)
    }

    /// Block tree under `block_id`, nesting children under each block's `children`.
    pub fn block_tree<'a>(&'a self, block_id: &'a str, depth: usize) -> BoxFuture<'a, Result<Vec<Value>>> {
        Box::pin(async move {
            let mut blocks = self.block_children(block_id).await?;
            if depth == 0 {
                return Ok(blocks);
            }
            for block in &mut blocks {
                let has_children = block
                    .get("has_children")
                    .and_then(Value::as_bool)
                    .unwrap_or(false);
                let Some(id) = block.get("id").and_then(Value::as_str).map(str::to_string) else {
                    continue;
                };
                if has_children && let Value::Object(map) = block {
                    let children = self.block_tree(&id, depth - 1).await?;
                    map.insert("children".to_string(), Value::Array(children));
                }
            }
            Ok(blocks)
        })
    }
}

/// Attach fetched blocks as the record body.
fn with_content(mut record: RawRecord, blocks: Vec<Value>) -> RawRecord {
    record.content = Some(Value::Array(blocks));
    record
}

#[async_trait]
impl ContentSource for ContentApi {
    fn name(&self) -> &str {
        "content-api"
    }

    async fn fetch(&self, collection: &str) -> Result<Vec<RawRecord>> {
        let database_id = self
            .database_for(collection)
            .ok_or_else(|| SourceError::NotConfigured(collection.to_string()))?;

        let pages = self.query_database(database_id).await?;
        let mut records = Vec::with_capacity(pages.len());
        for page in &pages {
            let Some(record) = RawRecord::from_json(page) else {
                continue;
            };
            let record = if self.include_content && !record.id.is_empty() {
                match self.block_tree(&record.id, MAX_BLOCK_DEPTH).await {
                    Ok(blocks) => with_content(record, blocks),
                    Err(e) => {
                        warn!(collection, page_id = %record.id, error = %e, "page content unavailable, keeping the record without it");
                        record
                    }
                }
            } else {
                record
            };
            records.push(record);
        }

        info!(collection, database_id, count = records.len(), "collection fetched from content API");
        Ok(records)
    }
}

/// Flatten a page's properties into a plain JSON object of display values.
///
/// Mirrors the flat export format: titles and rich text become strings, selects
/// become their name, files become `[{name, url}]`.
pub fn flatten_properties(properties: &Map<String, Value>) -> Map<String, Value> {
    use folio_core::property::{PropertyValue, plain_text};

    properties
        .iter()
        .map(|(key, raw)| {
            let value = match PropertyValue::decode(raw) {
                PropertyValue::Title(f) | PropertyValue::RichText(f) => {
                    Value::String(plain_text(&f).trim().to_string())
                }
                PropertyValue::Text(s) => Value::String(s),
                PropertyValue::Select(name) => Value::String(name.unwrap_or_default()),
                PropertyValue::MultiSelect(names) => {
                    Value::Array(names.into_iter().map(Value::String).collect())
                }
                PropertyValue::Checkbox(b) => Value::Bool(b),
                PropertyValue::Number(n) => n.map(Value::from).unwrap_or(Value::Null),
                PropertyValue::Files(files) => Value::Array(
                    files
                        .iter()
                        .filter_map(|f| {
                            f.url().map(|url| json!({ "name": f.name.clone().unwrap_or_default(), "url": url }))
                        })
                        .collect(),
                ),
                PropertyValue::Url(url) => Value::String(url.unwrap_or_default()),
                PropertyValue::Date(date) => Value::String(date.unwrap_or_default()),
                PropertyValue::Bare(v) => v,
                PropertyValue::Unknown(_) => Value::Null,
            };
            (key.clone(), value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_page_cursor() {
        let page: ListPage = serde_json::from_value(json!({
            "results": [{"id": "a"}],
            "has_more": true,
            "next_cursor": "c1"
        }))
        .unwrap();
        let (results, next) = page.cursor();
        assert_eq!(results.len(), 1);
        assert_eq!(next.as_deref(), Some("c1"));

        let page: ListPage =
            serde_json::from_value(json!({"has_more": false, "next_cursor": "c2"})).unwrap();
        assert_eq!(page.cursor().1, None);
    }

    #[test]
    fn test_debug_redacts_token() {
        let api = ContentApi::new("https://api.example.com/v1/", "2022-06-28", "secret-token").unwrap();
        let debug = format!("{api:?}");
        assert!(!debug.contains("secret-token"));
        assert_eq!(api.url("/databases/x/query"), "https://api.example.com/v1/databases/x/query");
    }

    #[test]
    fn test_from_config_without_token_env() {
        let mut config = SourceConfig::default();
        config.token_env = "FOLIO_TEST_TOKEN_THAT_IS_NEVER_SET".to_string();
        let err = ContentApi::from_config(&config).unwrap_err();
        assert!(matches!(err, SourceError::MissingToken(name) if name == "FOLIO_TEST_TOKEN_THAT_IS_NEVER_SET"));
    }

    #[tokio::test]
    async fn test_fetch_unconfigured_collection() {
        let api = ContentApi::new("http://127.0.0.1:9", "2022-06-28", "t").unwrap();
        let err = api.fetch("projects").await.unwrap_err();
        assert!(matches!(err, SourceError::NotConfigured(c) if c == "projects"));
    }

    #[test]
    fn test_flatten_properties() {
        let props = json!({
            "Article Title": {"type": "title", "title": [{"plain_text": " Future city "}]},
            "Category": {"type": "select", "select": {"name": "technology"}},
            "Read Time": {"type": "number", "number": 8},
            "Tags": {"type": "multi_select", "multi_select": [{"name": "トレンド"}]},
            "Cover Image": {"type": "files", "files": [
                {"name": "c.png", "type": "external", "external": {"url": "https://img.example.com/c.png"}}
            ]},
            "CTA Link": {"type": "url", "url": null}
        });
        let flat = flatten_properties(props.as_object().unwrap());
        assert_eq!(flat["Article Title"], json!("Future city"));
        assert_eq!(flat["Category"], json!("technology"));
        assert_eq!(flat["Read Time"], json!(8.0));
        assert_eq!(flat["Tags"], json!(["トレンド"]));
        assert_eq!(
            flat["Cover Image"],
            json!([{"name": "c.png", "url": "https://img.example.com/c.png"}])
        );
        assert_eq!(flat["CTA Link"], json!(""));
    }
}
