//! Export command - raw content API results to flat JSON

use std::{
    fs,
    path::{Path, PathBuf},
    time::Instant,
};

use color_eyre::eyre::{Result, WrapErr, bail};
use folio_core::{Content, Normalizer, RawRecord, normalize::strip_hyphens};
use folio_render::render_content;
use folio_source::api::flatten_properties;
use rayon::prelude::*;
use serde_json::{Map, Value};

use crate::collection::Collection;

/// Counts for one exported file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportStats {
    pub collection: String,
    pub read: usize,
    pub written: usize,
}

/// Run the export command.
///
/// `input` is a single JSON file or a directory searched recursively for them.
/// Each file becomes `<output>/<stem>.json`.
pub fn run(input: &Path, output: &Path, include_unpublished: bool) -> Result<()> {
    let start = Instant::now();
    tracing::info!(?input, ?output, include_unpublished, "Starting export");

    let files = collect_inputs(input)?;
    if files.is_empty() {
        bail!("No JSON files found under {}", input.display());
    }
    fs::create_dir_all(output)
        .wrap_err_with(|| format!("Failed to create {}", output.display()))?;

    let results: Vec<Result<ExportStats>> = files
        .par_iter()
        .map(|path| export_file(path, output, include_unpublished))
        .collect();

    let mut failed = 0;
    for result in results {
        match result {
            Ok(stats) => println!(
                "  ✓ {}: {} of {} records",
                stats.collection, stats.written, stats.read
            ),
            Err(e) => {
                failed += 1;
                println!("  ✗ {e:#}");
            }
        }
    }

    if failed > 0 {
        bail!("Export failed for {failed} file(s)");
    }

    println!();
    println!(
        "✓ Exported {} file(s) in {:.2}s",
        files.len(),
        start.elapsed().as_secs_f64()
    );
    Ok(())
}

fn collect_inputs(input: &Path) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if !input.is_dir() {
        bail!("Input does not exist: {}", input.display());
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(input)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    Ok(files)
}

fn export_file(path: &Path, output: &Path, include_unpublished: bool) -> Result<ExportStats> {
    let collection = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();

    let text = fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
    let value: Value = serde_json::from_str(&text)
        .wrap_err_with(|| format!("Invalid JSON in {}", path.display()))?;
    let raws = RawRecord::from_results(&value);

    let kind = Collection::from_name(&collection);
    if kind.is_none() {
        tracing::warn!(collection, "unrecognized collection, exporting every record");
    }

    let flat = export_records(&raws, kind, include_unpublished);
    let stats = ExportStats {
        collection: collection.clone(),
        read: raws.len(),
        written: flat.len(),
    };
    write_records(&output.join(format!("{collection}.json")), &flat)?;

    tracing::debug!(?stats, "collection exported");
    Ok(stats)
}

/// Flatten records into the static JSON format, dropping unpublished ones
/// unless asked to keep them.
///
/// Page bodies are pre-rendered to markup under `content`.
pub fn export_records(
    raws: &[RawRecord],
    kind: Option<Collection>,
    include_unpublished: bool,
) -> Vec<Value> {
    let normalizer = Normalizer::new();
    raws.par_iter()
        .filter(|raw| {
            include_unpublished || kind.is_none_or(|k| k.is_published(&normalizer, raw))
        })
        .map(flatten_record)
        .collect()
}

/// One flat record: display values keyed by property name, plus `id` and `content`.
pub fn flatten_record(raw: &RawRecord) -> Value {
    let mut flat: Map<String, Value> = flatten_properties(&raw.properties);
    if !raw.id.is_empty() {
        flat.insert("id".to_string(), Value::String(strip_hyphens(&raw.id)));
    }
    if let Some(content) = raw.content.as_ref() {
        let html = render_content(&Content::decode(Some(content)));
        if !html.is_empty() {
            flat.insert("content".to_string(), Value::String(html));
        }
    }
    Value::Object(flat)
}

/// Write records as a pretty-printed JSON array.
pub fn write_records(path: &Path, records: &[Value]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(records)?;
    fs::write(path, json).wrap_err_with(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use folio_core::ArticleKind;
    use serde_json::json;

    use super::*;

    fn api_results() -> Value {
        json!({
            "results": [
                {
                    "id": "1234-abcd",
                    "properties": {
                        "Title": {"type": "title", "title": [{"plain_text": "Live"}]},
                        "Published": {"type": "checkbox", "checkbox": true},
                        "Category": {"type": "select", "select": {"name": "review"}}
                    },
                    "content": [
                        {"type": "paragraph", "paragraph": {"rich_text": [{"plain_text": "Body"}]}}
                    ]
                },
                {
                    "id": "5678",
                    "properties": {
                        "Title": {"type": "title", "title": [{"plain_text": "Draft"}]},
                        "Published": {"type": "checkbox", "checkbox": false}
                    }
                }
            ]
        })
    }

    #[test]
    fn test_export_drops_unpublished() {
        let raws = RawRecord::from_results(&api_results());
        let flat = export_records(&raws, Some(Collection::Articles(ArticleKind::Affiling)), false);

        assert_eq!(flat.len(), 1);
        assert_eq!(flat[0]["id"], "1234abcd");
        assert_eq!(flat[0]["Title"], "Live");
        assert_eq!(flat[0]["Category"], "review");
        assert_eq!(flat[0]["Published"], true);
        assert!(flat[0]["content"].as_str().unwrap().contains("Body"));
    }

    #[test]
    fn test_export_keeps_everything_when_asked_or_unknown() {
        let raws = RawRecord::from_results(&api_results());
        assert_eq!(
            export_records(&raws, Some(Collection::Articles(ArticleKind::Affiling)), true).len(),
            2
        );
        assert_eq!(export_records(&raws, None, false).len(), 2);
    }

    #[test]
    fn test_exported_records_normalize_again() {
        let raws = RawRecord::from_results(&api_results());
        let flat = Value::Array(export_records(
            &raws,
            Some(Collection::Articles(ArticleKind::Affiling)),
            false,
        ));
        let again = RawRecord::from_results(&flat);
        let article = Normalizer::new()
            .article(again.first(), ArticleKind::Affiling)
            .unwrap();
        assert_eq!(article.title, "Live");
        assert!(article.published);
    }

    #[test]
    fn test_run_writes_one_file_per_collection() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        fs::write(
            input.path().join("affiling_articles.json"),
            api_results().to_string(),
        )
        .unwrap();

        run(input.path(), output.path(), false).unwrap();

        let written = fs::read_to_string(output.path().join("affiling_articles.json")).unwrap();
        let records: Vec<Value> = serde_json::from_str(&written).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_run_rejects_empty_input() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        assert!(run(input.path(), output.path(), false).is_err());
    }
}
