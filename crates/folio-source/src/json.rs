//! Static JSON files, one flat array per collection.

use std::{collections::BTreeMap, path::PathBuf};

use async_trait::async_trait;
use folio_core::{RawRecord, config::SourceConfig};
use serde_json::Value;
use tracing::{debug, warn};

use crate::{ContentSource, Result, SourceError};

/// Parse a collection document. Anything other than an array yields no records.
pub fn parse_records(collection: &str, text: &str) -> Result<Vec<RawRecord>> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| SourceError::json(collection, e))?;

    if !value.is_array() {
        warn!(collection, "collection document is not an array, treating as empty");
        return Ok(Vec::new());
    }

    let records = RawRecord::from_results(&value);
    debug!(collection, count = records.len(), "parsed collection");
    Ok(records)
}

/// Reads `<data_dir>/<collection>.json`, or the file configured for the collection.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    dir: PathBuf,
    files: BTreeMap<String, String>,
}

impl JsonFileSource {
    /// Source reading `<dir>/<collection>.json`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            files: BTreeMap::new(),
        }
    }

    /// Source honouring the configured data directory and file overrides.
    pub fn from_config(config: &SourceConfig) -> Self {
        Self {
            dir: config.data_dir.clone(),
            files: config.collections.clone(),
        }
    }

    /// File path for a collection.
    pub fn path_for(&self, collection: &str) -> PathBuf {
        match self.files.get(collection) {
            Some(file) => self.dir.join(file),
            None => self.dir.join(format!("{collection}.json")),
        }
    }
}

#[async_trait]
impl ContentSource for JsonFileSource {
    fn name(&self) -> &str {
        "json-file"
    }

    async fn fetch(&self, collection: &str) -> Result<Vec<RawRecord>> {
        let path = self.path_for(collection);
        debug!(collection, path = %path.display(), "reading collection file");

        let text = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| SourceError::io(&path, e))?;
        parse_records(collection, &text)
    }
}
