//! Listing page state.

use folio_core::config::ListingConfig;
use folio_render::{
    ListingQuery, SortOrder,
    listing::ALL_CATEGORIES,
};

/// Filter, search term, page and in-flight bookkeeping for one listing.
///
/// Every change bumps `generation`; a fetch result is only applied when the
/// generation it started under is still current.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageState {
    filter: String,
    search: String,
    page: usize,
    loading: bool,
    generation: u64,
}

impl Default for PageState {
    fn default() -> Self {
        Self {
            filter: ALL_CATEGORIES.to_string(),
            search: String::new(),
            page: 1,
            loading: false,
            generation: 0,
        }
    }
}

impl PageState {
    /// Fresh state: all categories, no search, first page.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// Lowercased search term.
    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    fn bump(&mut self) {
        self.generation += 1;
    }

    /// Select a category. Returns `false` (and changes nothing) when it is already active.
    pub fn set_filter(&mut self, filter: &str) -> bool {
        let filter = filter.trim();
        let filter = if filter.is_empty() { ALL_CATEGORIES } else { filter };
        if self.filter == filter {
            return false;
        }
        self.filter = filter.to_string();
        self.page = 1;
        self.bump();
        true
    }

    /// Set the search term and go back to the first page.
    pub fn set_search(&mut self, term: &str) {
        self.search = term.trim().to_lowercase();
        self.page = 1;
        self.bump();
    }

    /// Show one more page.
    pub fn next_page(&mut self) {
        self.page += 1;
        self.bump();
    }

    /// Re-fetch without changing filters.
    pub fn refresh(&mut self) {
        self.bump();
    }

    /// Listing query for the current state.
    pub fn query(&self, listing: &ListingConfig, sort: SortOrder) -> ListingQuery {
        ListingQuery::default()
            .category(self.filter.clone())
            .search(self.search.clone())
            .sort(sort)
            .page(self.page, listing.per_page)
            .window(listing.window)
    }
}
