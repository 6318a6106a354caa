//! CMS-managed page content: fixed elements and grid sections.

use folio_core::{
    FixedContentType, GridElement, Normalize, Normalizer, SiteContentItem, config::GridConfig,
};
use folio_render::{
    TemplateRegistry, group_grid_elements,
    html::{escape_html, safe_href},
};
use folio_source::ContentSource;
use tracing::{debug, warn};

use crate::dom::RenderTarget;

/// Collection holding fixed site content.
pub const SITE_CONTENT_COLLECTION: &str = "site_content";

/// Collection holding grid elements.
pub const GRID_COLLECTION: &str = "grid_elements";

/// Attributes whose values are URLs.
const URL_ATTRIBUTES: [&str; 4] = ["href", "src", "action", "formaction"];

/// Counts from applying page content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplySummary {
    pub applied: usize,
    pub skipped: usize,
}

impl ApplySummary {
    fn merge(self, other: Self) -> Self {
        Self {
            applied: self.applied + other.applied,
            skipped: self.skipped + other.skipped,
        }
    }
}

/// Write active fixed elements into their selectors, in `order`.
///
/// Items of grid sections are left to [`populate_grid_sections`].
pub fn apply_fixed_elements(
    items: &[SiteContentItem],
    grid: &GridConfig,
    target: &mut dyn RenderTarget,
) -> ApplySummary {
    let mut active: Vec<&SiteContentItem> = items
        .iter()
        .filter(|item| item.published && !grid.is_grid(&item.section_id))
        .collect();
    active.sort_by_key(|item| item.order);

    let mut summary = ApplySummary::default();
    for item in active {
        if apply_fixed_element(item, target) {
            summary.applied += 1;
        } else {
            summary.skipped += 1;
        }
    }
    summary
}

fn apply_fixed_element(item: &SiteContentItem, target: &mut dyn RenderTarget) -> bool {
    let selector = item.element_selector.trim();
    if selector.is_empty() {
        warn!(id = %item.id, "fixed element has no selector, skipping");
        return false;
    }
    let Some(tag) = target.tag_name(selector) else {
        warn!(id = %item.id, selector, "fixed element target not found, skipping");
        return false;
    };

    let result = match item.content_type {
        FixedContentType::Text => target.set_text(selector, &item.content),
        FixedContentType::Html => target.replace_inner_html(selector, &item.content),
        FixedContentType::Image => {
            let url = item
                .image_url
                .as_deref()
                .filter(|u| !u.is_empty())
                .unwrap_or(item.content.trim());
            if url.is_empty() {
                debug!(id = %item.id, "image element without a URL, skipping");
                return false;
            }
            if safe_href(url).is_none() {
                warn!(id = %item.id, "unsafe image URL, skipping");
                return false;
            }
            if tag == "img" {
                target.set_attribute(selector, "src", url)
            } else {
                let html = format!(r#"<img src="{}" alt="" loading="lazy">"#, escape_html(url));
                target.replace_inner_html(selector, &html)
            }
        }
        FixedContentType::Attribute => {
            let name = item.attribute_name.trim();
            if name.is_empty() || item.content.is_empty() {
                debug!(id = %item.id, "attribute element without name or value, skipping");
                return false;
            }
            if URL_ATTRIBUTES.iter().any(|a| name.eq_ignore_ascii_case(a))
                && safe_href(&item.content).is_none()
            {
                warn!(id = %item.id, attribute = name, "unsafe URL in attribute, skipping");
                return false;
            }
            target.set_attribute(selector, name, &item.content)
        }
    };

    match result {
        Ok(()) => true,
        Err(e) => {
            warn!(id = %item.id, error = %e, "failed to apply fixed element");
            false
        }
    }
}

/// Render each grid section's published elements into `#<section> <container>`.
pub fn populate_grid_sections(
    elements: &[GridElement],
    grid: &GridConfig,
    templates: &TemplateRegistry,
    target: &mut dyn RenderTarget,
) -> ApplySummary {
    let mut summary = ApplySummary::default();
    for group in group_grid_elements(elements, grid) {
        let selector = group.target_selector();
        let html = group.render(templates);
        match target.replace_inner_html(&selector, &html) {
            Ok(()) => {
                debug!(section = %group.section.id, count = group.elements.len(), "grid section rendered");
                summary.applied += 1;
            }
            Err(e) => {
                warn!(section = %group.section.id, error = %e, "grid container not found, skipping");
                summary.skipped += 1;
            }
        }
    }
    summary
}

/// Fetch site content and grid elements and apply both. Source failures are
/// logged and leave the page as it is.
pub async fn populate_site<S: ContentSource + ?Sized>(
    source: &S,
    grid: &GridConfig,
    templates: &TemplateRegistry,
    target: &mut dyn RenderTarget,
) -> ApplySummary {
    let normalizer = Normalizer::new();
    let mut summary = ApplySummary::default();

    match source.fetch(SITE_CONTENT_COLLECTION).await {
        Ok(raws) => {
            let items = SiteContentItem::normalize_all(&normalizer, &raws, ());
            summary = summary.merge(apply_fixed_elements(&items, grid, target));
        }
        Err(e) => warn!(error = %e, "site content unavailable"),
    }

    match source.fetch(GRID_COLLECTION).await {
        Ok(raws) => {
            let elements = GridElement::normalize_all(&normalizer, &raws, ());
            summary = summary.merge(populate_grid_sections(&elements, grid, templates, target));
        }
        Err(e) => warn!(error = %e, "grid elements unavailable"),
    }

    summary
}
