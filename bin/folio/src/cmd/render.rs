//! Render command - listing HTML for one collection

use std::path::{Path, PathBuf};

use color_eyre::eyre::{Result, WrapErr, bail, eyre};
use folio_core::{Article, Config, Normalize, Project, Record};
use folio_page::{ListingPage, LoadOutcome, MemoryDocument, PageController, PageEvent};
use folio_render::{RenderCard, SortOrder, TemplateTag};
use folio_source::ContentSource;
use tokio::sync::mpsc;

use super::{content_source, load_config};
use crate::collection::Collection;

/// Selector the listing is rendered into.
const LISTING_TARGET: &str = "#listing";

/// What to render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Category key; `None` shows every category.
    pub category: Option<String>,
    /// Search term.
    pub search: Option<String>,
    /// Number of pages to show (load-more clicks plus one).
    pub pages: usize,
}

/// Run the render command.
///
/// Writes the listing fragment to `output`, or to stdout.
pub async fn run(
    config_path: &Path,
    collection: &str,
    options: &RenderOptions,
    output: Option<&PathBuf>,
) -> Result<()> {
    tracing::info!(?config_path, collection, ?options, "Rendering listing");

    let config = load_config(config_path)?;
    let source = content_source(&config.source)?;
    let html = render_collection(source, &config, collection, options).await?;

    match output {
        Some(path) => {
            std::fs::write(path, &html)
                .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
            println!("✓ Wrote {} bytes to {}", html.len(), path.display());
        }
        None => println!("{html}"),
    }
    Ok(())
}

/// Render a listing collection through the page controller.
pub async fn render_collection<S: ContentSource>(
    source: S,
    config: &Config,
    collection: &str,
    options: &RenderOptions,
) -> Result<String> {
    let kind = Collection::from_name(collection)
        .ok_or_else(|| eyre!("Unknown collection: {collection}"))?;

    match kind {
        Collection::Articles(article_kind) => {
            let page = ListingPage::new(collection, LISTING_TARGET, TemplateTag::ArticleListing)
                .with_categories(kind.categories());
            let controller =
                PageController::<S, Article>::new(source, page, article_kind, config.listing.clone());
            drive(controller, options).await
        }
        Collection::Projects => {
            let page = ListingPage::new(collection, LISTING_TARGET, TemplateTag::ProjectCard)
                .with_sort(SortOrder::OrderAsc)
                .with_categories(kind.categories());
            let controller =
                PageController::<S, Project>::new(source, page, (), config.listing.clone());
            drive(controller, options).await
        }
        other => bail!("{collection} holds {other}, which is not a listing collection"),
    }
}

/// Page events equivalent to a user opening the page and applying `options`.
fn page_events(options: &RenderOptions) -> Vec<PageEvent> {
    let mut events = Vec::new();
    if let Some(category) = options.category.as_deref() {
        events.push(PageEvent::FilterSelected(category.to_string()));
    }
    if let Some(term) = options.search.as_deref() {
        events.push(PageEvent::SearchInput(term.to_string()));
    }
    events.extend((1..options.pages).map(|_| PageEvent::LoadMore));
    events
}

async fn drive<S, R>(mut controller: PageController<S, R>, options: &RenderOptions) -> Result<String>
where
    S: ContentSource,
    R: Normalize + Record + RenderCard,
{
    let mut doc = MemoryDocument::new().with_element(LISTING_TARGET, "div");

    let mut summary = match controller.reload(&mut doc).await {
        LoadOutcome::Rendered(summary) => Some(summary),
        _ => None,
    };

    let (tx, rx) = mpsc::channel(16);
    let events = page_events(options);
    tokio::spawn(async move {
        for event in events {
            if tx.send(event).await.is_err() {
                break;
            }
        }
    });
    if let Some(last) = controller.run(rx, &mut doc).await {
        summary = Some(last);
    }

    if let Some(summary) = summary {
        tracing::info!(
            shown = summary.shown,
            total = summary.total,
            has_more = summary.has_more,
            "Listing rendered"
        );
        if summary.source_failed {
            tracing::warn!("content source unavailable, rendered the empty state");
        }
    }

    Ok(doc.inner_html(LISTING_TARGET).unwrap_or_default().to_string())
}
