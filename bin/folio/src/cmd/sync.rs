//! Sync command - pull a collection from the content API and export it

use std::path::{Path, PathBuf};

use color_eyre::eyre::{Result, WrapErr};
use folio_source::{ContentApi, ContentSource};

use super::export::{ExportStats, export_records, write_records};
use crate::collection::Collection;

/// Run the sync command.
///
/// Writes to `output`, or to the collection's file under the configured data
/// directory.
pub async fn run(
    config_path: &Path,
    collection: &str,
    output: Option<PathBuf>,
    include_unpublished: bool,
    page_content: bool,
) -> Result<()> {
    tracing::info!(?config_path, collection, include_unpublished, page_content, "Starting sync");

    let config = super::load_config(config_path)?;
    let api = ContentApi::from_config(&config.source)
        .wrap_err("Failed to set up the content API client")?
        .with_page_content(page_content);

    let path = output.unwrap_or_else(|| config.source.file_path(collection));
    let stats = sync_collection(&api, collection, &path, include_unpublished).await?;

    println!(
        "✓ Synced {}: {} of {} records written to {}",
        stats.collection,
        stats.written,
        stats.read,
        path.display()
    );
    Ok(())
}

/// Fetch `collection` from `source` and write it as flat JSON to `path`.
pub async fn sync_collection<S: ContentSource + ?Sized>(
    source: &S,
    collection: &str,
    path: &Path,
    include_unpublished: bool,
) -> Result<ExportStats> {
    let raws = source
        .fetch(collection)
        .await
        .wrap_err_with(|| format!("Failed to fetch {collection} from {}", source.name()))?;

    let flat = export_records(&raws, Collection::from_name(collection), include_unpublished);
    write_records(path, &flat)?;

    Ok(ExportStats {
        collection: collection.to_string(),
        read: raws.len(),
        written: flat.len(),
    })
}

#[cfg(test)]
mod tests {
    use folio_core::RawRecord;
    use folio_source::SourceError;
    use serde_json::{Value, json};

    use super::*;

    struct Fixed(Option<Vec<RawRecord>>);

    #[async_trait::async_trait]
    impl ContentSource for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn fetch(&self, collection: &str) -> folio_source::Result<Vec<RawRecord>> {
            self.0
                .clone()
                .ok_or_else(|| SourceError::NotConfigured(collection.to_string()))
        }
    }

    #[tokio::test]
    async fn test_sync_writes_published_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("projects.json");
        let source = Fixed(Some(RawRecord::from_results(&json!([
            {"id": "p-1", "title": "Shop", "published": true},
            {"id": "p-2", "title": "Hidden", "published": false}
        ]))));

        let stats = sync_collection(&source, "projects", &path, false).await.unwrap();
        assert_eq!((stats.read, stats.written), (2, 1));

        let written: Vec<Value> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written[0]["id"], "p1");
    }

    #[tokio::test]
    async fn test_sync_reports_source_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.json");

        let err = sync_collection(&Fixed(None), "note_articles", &path, false)
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("note_articles"));
        assert!(!path.exists());
    }
}
