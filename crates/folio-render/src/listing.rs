//! Listing selection and rendering.
//!
//! Selection runs in a fixed order: published filter, category filter, search,
//! sort, then the page window.

use folio_core::{Record, WindowMode};
use tracing::debug;

use crate::{
    cards::{RenderCard, render_card},
    html::escape_html,
    template::{TemplateRegistry, TemplateTag},
};

/// Category filter value that disables category filtering.
pub const ALL_CATEGORIES: &str = "all";

/// Sort applied before windowing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    /// Newest first.
    #[default]
    DateDesc,
    /// `order` ascending; ties keep input order.
    OrderAsc,
}

/// What to select from a record list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingQuery {
    /// Category key, or [`ALL_CATEGORIES`].
    pub category: String,
    /// Search term; matched case-insensitively.
    pub search: String,
    pub sort: SortOrder,
    /// 1-based page.
    pub page: usize,
    pub per_page: usize,
    pub window: WindowMode,
}

impl Default for ListingQuery {
    fn default() -> Self {
        Self {
            category: ALL_CATEGORIES.to_string(),
            search: String::new(),
            sort: SortOrder::default(),
            page: 1,
            per_page: 6,
            window: WindowMode::default(),
        }
    }
}

impl ListingQuery {
    /// Set the category filter.
    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Set the search term.
    #[must_use]
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = term.into();
        self
    }

    /// Set the sort order.
    #[must_use]
    pub fn sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    /// Set the page and page size.
    #[must_use]
    pub fn page(mut self, page: usize, per_page: usize) -> Self {
        self.page = page;
        self.per_page = per_page;
        self
    }

    /// Set the window mode.
    #[must_use]
    pub fn window(mut self, window: WindowMode) -> Self {
        self.window = window;
        self
    }
}

/// Result of a selection.
#[derive(Debug)]
pub struct Selection<'a, R> {
    /// Records in the window, in display order.
    pub items: Vec<&'a R>,
    /// Number of records matching the filters.
    pub total: usize,
    pub total_pages: usize,
    /// Whether matches remain beyond the window.
    pub has_more: bool,
}

impl<R> Selection<'_, R> {
    /// Whether nothing is shown.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Whether a record matches a lowercased search term.
pub fn matches_search<R: Record + ?Sized>(record: &R, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    record.title().to_lowercase().contains(term)
        || record.excerpt().to_lowercase().contains(term)
        || record.tags().iter().any(|t| t.to_lowercase().contains(term))
}

/// Whether a record is in the category (`"all"` matches everything).
pub fn matches_category<R: Record + ?Sized>(record: &R, category: &str) -> bool {
    category.is_empty() || category == ALL_CATEGORIES || record.category_key() == category
}

/// Select the records to show for a query.
pub fn select<'a, R: Record>(records: &'a [R], query: &ListingQuery) -> Selection<'a, R> {
    let term = query.search.trim().to_lowercase();

    let mut matched: Vec<&R> = records
        .iter()
        .filter(|r| r.is_published())
        .filter(|r| matches_category(*r, &query.category))
        .filter(|r| matches_search(*r, &term))
        .collect();

    match query.sort {
        SortOrder::OrderAsc => matched.sort_by_key(|r| r.order()),
        SortOrder::DateDesc => matched.sort_by(|a, b| b.date().cmp(&a.date())),
    }

    let total = matched.len();
    let per_page = query.per_page.max(1);
    let page = query.page.max(1);

    let (items, total_pages, has_more) = match query.window {
        WindowMode::Paged => {
            let (window, total_pages) = paginate(&matched, page, per_page);
            (window.to_vec(), total_pages, page < total_pages)
        }
        WindowMode::LoadMore => {
            let end = page.saturating_mul(per_page).min(total);
            (matched[..end].to_vec(), total.div_ceil(per_page), end < total)
        }
    };

    debug!(
        total,
        shown = items.len(),
        category = %query.category,
        search = %term,
        "listing selected"
    );

    Selection {
        items,
        total,
        total_pages,
        has_more,
    }
}

/// Paginate a slice of items.
pub fn paginate<T>(items: &[T], page: usize, per_page: usize) -> (&[T], usize) {
    let per_page = per_page.max(1);
    let total_pages = items.len().div_ceil(per_page);
    let start = (page.max(1) - 1).saturating_mul(per_page);
    let end = start.saturating_add(per_page).min(items.len());

    if start >= items.len() {
        (&[], total_pages)
    } else {
        (&items[start..end], total_pages)
    }
}

/// Empty-state fragment.
pub fn empty_state(message: &str) -> String {
    format!(
        r#"<div class="empty-state"><p class="empty-message">{}</p></div>"#,
        escape_html(message)
    )
}

/// Render a selection with a template, or the empty state when nothing matched.
pub fn render_listing<R: RenderCard>(
    selection: &Selection<'_, R>,
    tag: TemplateTag,
    templates: &TemplateRegistry,
    empty_message: &str,
) -> String {
    if selection.is_empty() {
        return empty_state(empty_message);
    }
    selection
        .items
        .iter()
        .map(|record| render_card(*record, tag, templates))
        .collect::<Vec<_>>()
        .join("\n")
}
