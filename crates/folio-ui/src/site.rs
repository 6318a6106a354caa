//! CMS-managed page content.

use std::sync::Arc;

use folio_core::config::GridConfig;
use folio_page::populate_site;
use folio_render::TemplateRegistry;
use folio_source::ContentSource;
use leptos::{prelude::*, task::spawn_local};
use tracing::debug;

use crate::target::DomTarget;

/// Fetches site content and grid elements once mounted and writes them into the
/// page's existing elements. Renders nothing itself.
#[component]
pub fn SiteContent<S>(
    source: Arc<S>,
    /// Grid sections; defaults to the built-in set.
    #[prop(optional)]
    grid: GridConfig,
    #[prop(default = TemplateRegistry::new())] templates: TemplateRegistry,
) -> impl IntoView
where
    S: ContentSource + 'static,
{
    Effect::new(move |_| {
        let source = Arc::clone(&source);
        let grid = grid.clone();
        let templates = templates.clone();
        spawn_local(async move {
            let mut target = DomTarget::current();
            let summary = populate_site(&*source, &grid, &templates, &mut target).await;
            debug!(applied = summary.applied, skipped = summary.skipped, "site content applied");
        });
    });
}
