//! Listing page controller.
//!
//! Owns the page state and the current records, fetches through a
//! [`ContentSource`], and re-renders the whole listing container on every change.
//!
//! Fetching is split into [`PageController::begin_load`] and
//! [`PageController::complete_load`] so an event loop can dispatch the fetch itself;
//! [`PageController::reload`] does both around an awaited fetch.
//!
//! A state change made while a fetch is in flight re-renders the records already
//! loaded right away; the in-flight result is dropped when it lands and the fetch is
//! issued again for the new state.

use std::time::Duration;

use folio_core::{
    Normalize, Normalizer, RawRecord, Record, config::ListingConfig, dedupe_by_id,
};
use folio_render::{
    RenderCard, SortOrder, TemplateRegistry, TemplateTag,
    listing::{render_listing, select},
};
use folio_source::{ContentSource, SourceError};
use tokio::{sync::mpsc, time::Instant};
use tracing::{debug, info, warn};

use crate::{debounce::SearchDebouncer, dom::RenderTarget, state::PageState};

/// Where a listing comes from and where it goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingPage {
    /// Collection fetched from the source.
    pub collection: String,
    /// Selector of the container the cards replace.
    pub target: String,
    pub template: TemplateTag,
    pub sort: SortOrder,
    /// Category keys accepted from a URL fragment.
    pub categories: Vec<String>,
}

impl ListingPage {
    pub fn new(collection: &str, target: &str, template: TemplateTag) -> Self {
        Self {
            collection: collection.to_string(),
            target: target.to_string(),
            template,
            sort: SortOrder::DateDesc,
            categories: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    #[must_use]
    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }
}

/// User-driven page events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    /// A filter tab was selected.
    FilterSelected(String),
    /// A keystroke in the search box; settles after the debounce delay.
    SearchInput(String),
    /// The search box settled on a term (already debounced).
    SearchChanged(String),
    /// A tag badge was clicked; searches for the tag.
    TagClicked(String),
    /// The URL fragment changed (`#review`).
    HashChanged(String),
    LoadMore,
    Refresh,
}

/// Permission to run one fetch, stamped with the generation it started under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct LoadTicket {
    generation: u64,
}

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What a render produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderSummary {
    pub shown: usize,
    pub total: usize,
    pub has_more: bool,
    /// The source failed and the empty state was shown.
    pub source_failed: bool,
}

/// Result of a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The container was re-rendered.
    Rendered(RenderSummary),
    /// The result belonged to an older generation and was dropped.
    Discarded { reload_pending: bool },
    /// A load was already in flight.
    Skipped,
    /// The event did not change the state.
    Unchanged,
}

/// What [`PageController::dispatch`] decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    /// The event did not change the state.
    Unchanged,
    /// A fetch is in flight. The loaded records were re-rendered for the new state
    /// (when any were loaded) and the fetch is issued again once the in-flight one
    /// completes.
    Deferred { rendered: Option<RenderSummary> },
    /// Fetch now and hand the result to [`PageController::complete_load`].
    Start(LoadTicket),
}

/// Controller for one listing page.
pub struct PageController<S, R: Normalize> {
    source: S,
    page: ListingPage,
    options: R::Options,
    listing: ListingConfig,
    templates: TemplateRegistry,
    state: PageState,
    records: Vec<R>,
    /// Some fetch has completed, so `records` reflects the source.
    loaded: bool,
    reload_pending: bool,
    search: SearchDebouncer,
}

impl<S, R> PageController<S, R>
where
    S: ContentSource,
    R: Normalize + Record + RenderCard,
{
    pub fn new(source: S, page: ListingPage, options: R::Options, listing: ListingConfig) -> Self {
        let search = SearchDebouncer::new(Duration::from_millis(listing.debounce_ms));
        Self {
            source,
            page,
            options,
            listing,
            templates: TemplateRegistry::new(),
            state: PageState::new(),
            records: Vec::new(),
            loaded: false,
            reload_pending: false,
            search,
        }
    }

    /// Replace the template registry.
    #[must_use]
    pub fn with_templates(mut self, templates: TemplateRegistry) -> Self {
        self.templates = templates;
        self
    }

    pub fn state(&self) -> &PageState {
        &self.state
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn page(&self) -> &ListingPage {
        &self.page
    }

    /// Search input waiting to settle.
    pub fn pending_search(&self) -> Option<&str> {
        self.search.pending()
    }

    /// Whether a result was discarded since the last call; clears the flag.
    pub fn take_reload_pending(&mut self) -> bool {
        std::mem::take(&mut self.reload_pending)
    }

    /// Start a fetch unless one is in flight.
    pub fn begin_load(&mut self) -> Option<LoadTicket> {
        if self.state.is_loading() {
            debug!(collection = %self.page.collection, "load already in flight, skipping");
            return None;
        }
        self.state.set_loading(true);
        Some(LoadTicket {
            generation: self.state.generation(),
        })
    }

    /// Finish a fetch started with [`begin_load`](Self::begin_load).
    ///
    /// A source error renders the empty state; it is logged, never returned. A stale
    /// result is dropped, the loaded records are rendered under the current state and
    /// the reload flag is raised.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<Vec<RawRecord>, SourceError>,
        target: &mut dyn RenderTarget,
    ) -> LoadOutcome {
        self.state.set_loading(false);

        if ticket.generation != self.state.generation() {
            debug!(
                started = ticket.generation,
                current = self.state.generation(),
                "discarding stale load result"
            );
            self.reload_pending = true;
            if self.loaded {
                self.render(target);
            }
            return LoadOutcome::Discarded {
                reload_pending: true,
            };
        }

        let source_failed = match result {
            Ok(raws) => {
                let normalizer = Normalizer::new();
                self.records = dedupe_by_id(R::normalize_all(&normalizer, &raws, self.options));
                false
            }
            Err(e) => {
                warn!(collection = %self.page.collection, error = %e, "fetch failed, showing empty state");
                self.records.clear();
                true
            }
        };

        self.loaded = true;
        let mut summary = self.render(target);
        summary.source_failed = source_failed;
        LoadOutcome::Rendered(summary)
    }

    /// Fetch and render, fetching again while results come back stale.
    pub async fn reload(&mut self, target: &mut dyn RenderTarget) -> LoadOutcome {
        loop {
            let Some(ticket) = self.begin_load() else {
                return LoadOutcome::Skipped;
            };
            let result = self.source.fetch(&self.page.collection).await;
            let outcome = self.complete_load(ticket, result, target);
            if !(matches!(outcome, LoadOutcome::Discarded { .. }) && self.take_reload_pending()) {
                return outcome;
            }
        }
    }

    /// Render the current records into the target with one write.
    pub fn render(&self, target: &mut dyn RenderTarget) -> RenderSummary {
        let query = self.state.query(&self.listing, self.page.sort);
        let selection = select(&self.records, &query);
        let html = render_listing(
            &selection,
            self.page.template,
            &self.templates,
            &self.listing.empty_message,
        );

        if let Err(e) = target.replace_inner_html(&self.page.target, &html) {
            warn!(target = %self.page.target, error = %e, "listing container missing, skipping render");
        }

        info!(
            collection = %self.page.collection,
            shown = selection.items.len(),
            total = selection.total,
            generation = self.state.generation(),
            "listing rendered"
        );

        RenderSummary {
            shown: selection.items.len(),
            total: selection.total,
            has_more: selection.has_more,
            source_failed: false,
        }
    }

    /// Apply an event to the state. Returns whether a reload is needed.
    pub fn apply(&mut self, event: &PageEvent) -> bool {
        match event {
            PageEvent::FilterSelected(filter) => self.state.set_filter(filter),
            PageEvent::SearchInput(term) => {
                self.search.input(term.as_str(), Instant::now());
                false
            }
            PageEvent::SearchChanged(term) | PageEvent::TagClicked(term) => {
                self.state.set_search(term);
                true
            }
            PageEvent::HashChanged(hash) => {
                let key = hash.trim_start_matches('#');
                if self.page.categories.iter().any(|c| c == key) {
                    self.state.set_filter(key)
                } else {
                    false
                }
            }
            PageEvent::LoadMore => {
                self.state.next_page();
                true
            }
            PageEvent::Refresh => {
                self.state.refresh();
                true
            }
        }
    }

    /// Apply an event without awaiting anything.
    ///
    /// When a fetch is in flight the loaded records are re-rendered for the new state
    /// at once; otherwise the returned ticket starts the next fetch.
    pub fn dispatch(&mut self, event: &PageEvent, target: &mut dyn RenderTarget) -> Dispatch {
        if !self.apply(event) {
            return Dispatch::Unchanged;
        }
        if self.state.is_loading() {
            self.reload_pending = true;
            let rendered = self.loaded.then(|| self.render(target));
            return Dispatch::Deferred { rendered };
        }
        self.begin_load()
            .map_or(Dispatch::Deferred { rendered: None }, Dispatch::Start)
    }

    /// Apply an event and reload if it changed anything.
    pub async fn handle(&mut self, event: PageEvent, target: &mut dyn RenderTarget) -> LoadOutcome {
        match self.dispatch(&event, target) {
            Dispatch::Unchanged => LoadOutcome::Unchanged,
            Dispatch::Deferred { .. } => LoadOutcome::Skipped,
            Dispatch::Start(ticket) => {
                let result = self.source.fetch(&self.page.collection).await;
                match self.complete_load(ticket, result, target) {
                    LoadOutcome::Discarded { .. } if self.take_reload_pending() => {
                        self.reload(target).await
                    }
                    outcome => outcome,
                }
            }
        }
    }

    /// Drive the page from a channel of events until it closes.
    ///
    /// Search keystrokes settle after the configured debounce delay. A pending term is
    /// settled before any later event is applied, and when the channel closes. Returns
    /// the summary of the last render.
    pub async fn run(
        &mut self,
        mut events: mpsc::Receiver<PageEvent>,
        target: &mut dyn RenderTarget,
    ) -> Option<RenderSummary> {
        let mut last = None;
        loop {
            let next = match self.search.deadline() {
                Some(deadline) => tokio::select! {
                    event = events.recv() => Some(event),
                    () = tokio::time::sleep_until(deadline) => None,
                },
                None => Some(events.recv().await),
            };

            let event = match next {
                // Quiet period over.
                None => match self.search.poll(Instant::now()) {
                    Some(term) => PageEvent::SearchChanged(term),
                    None => continue,
                },
                Some(Some(PageEvent::SearchInput(term))) => {
                    self.search.input(term, Instant::now());
                    continue;
                }
                Some(Some(event)) => {
                    if let Some(term) = self.search.flush() {
                        let outcome = self.handle(PageEvent::SearchChanged(term), target).await;
                        record_summary(&mut last, outcome);
                    }
                    event
                }
                Some(None) => {
                    if let Some(term) = self.search.flush() {
                        let outcome = self.handle(PageEvent::SearchChanged(term), target).await;
                        record_summary(&mut last, outcome);
                    }
                    debug!(collection = %self.page.collection, "event channel closed");
                    return last;
                }
            };

            let outcome = self.handle(event, target).await;
            record_summary(&mut last, outcome);
        }
    }

    /// Select a category.
    pub async fn set_filter(&mut self, filter: &str, target: &mut dyn RenderTarget) -> LoadOutcome {
        self.handle(PageEvent::FilterSelected(filter.to_string()), target)
            .await
    }

    /// Search for a (settled) term.
    pub async fn set_search(&mut self, term: &str, target: &mut dyn RenderTarget) -> LoadOutcome {
        self.handle(PageEvent::SearchChanged(term.to_string()), target)
            .await
    }

    /// Show one more page.
    pub async fn load_more(&mut self, target: &mut dyn RenderTarget) -> LoadOutcome {
        self.handle(PageEvent::LoadMore, target).await
    }

    /// Re-fetch with the current filters.
    pub async fn refresh(&mut self, target: &mut dyn RenderTarget) -> LoadOutcome {
        self.handle(PageEvent::Refresh, target).await
    }
}

fn record_summary(last: &mut Option<RenderSummary>, outcome: LoadOutcome) {
    if let LoadOutcome::Rendered(summary) = outcome {
        *last = Some(summary);
    }
}
