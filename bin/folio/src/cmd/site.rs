//! Site command - preview CMS-managed page content

use std::path::{Path, PathBuf};

use color_eyre::eyre::{Result, WrapErr};
use folio_core::{Config, FixedContentType, GridElement, Normalize, Normalizer, SiteContentItem};
use folio_page::{
    ApplySummary, MemoryDocument, populate_site,
    site::{GRID_COLLECTION, SITE_CONTENT_COLLECTION},
};
use folio_render::{TemplateRegistry, group_grid_elements};
use folio_source::ContentSource;
use serde_json::{Map, Value, json};

use super::{content_source, load_config};

/// Run the site command.
///
/// Prints every targeted element after fixed content and grid sections have been
/// applied, as JSON keyed by selector.
pub async fn run(config_path: &Path, output: Option<&PathBuf>) -> Result<()> {
    tracing::info!(?config_path, "Previewing site content");

    let config = load_config(config_path)?;
    let source = content_source(&config.source)?;
    let (summary, doc) = preview_site(&source, &config).await;
    tracing::info!(applied = summary.applied, skipped = summary.skipped, "Site content applied");

    let json = serde_json::to_string_pretty(&document_json(&doc))
        .wrap_err("Failed to serialize site preview")?;
    match output {
        Some(path) => {
            std::fs::write(path, &json)
                .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
            println!("✓ Wrote site preview to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

/// Apply site content to a document holding every element it targets.
pub async fn preview_site<S: ContentSource + ?Sized>(
    source: &S,
    config: &Config,
) -> (ApplySummary, MemoryDocument) {
    let mut doc = MemoryDocument::new();
    let normalizer = Normalizer::new();

    if let Ok(raws) = source.fetch(SITE_CONTENT_COLLECTION).await {
        for item in SiteContentItem::normalize_all(&normalizer, &raws, ()) {
            let selector = item.element_selector.trim();
            if selector.is_empty() {
                continue;
            }
            let tag = match item.content_type {
                FixedContentType::Image => "img",
                _ => "div",
            };
            doc.insert(selector, tag);
        }
    }
    if let Ok(raws) = source.fetch(GRID_COLLECTION).await {
        let elements = GridElement::normalize_all(&normalizer, &raws, ());
        for group in group_grid_elements(&elements, &config.grid) {
            doc.insert(&group.target_selector(), "div");
        }
    }

    let summary = populate_site(source, &config.grid, &TemplateRegistry::new(), &mut doc).await;
    (summary, doc)
}

fn document_json(doc: &MemoryDocument) -> Value {
    let elements: Map<String, Value> = doc
        .elements()
        .map(|(selector, element)| {
            (
                selector.to_string(),
                json!({
                    "tag": element.tag,
                    "html": element.inner_html,
                    "attributes": element.attributes,
                }),
            )
        })
        .collect();
    Value::Object(elements)
}
