//! Filterable article listing driven by the page controller.

use std::sync::Arc;

use folio_core::{
    Article, ArticleKind, Normalize, Normalizer, RawRecord, config::ListingConfig, dedupe_by_id,
};
use folio_page::{Dispatch, ListingPage, LoadOutcome, LoadTicket, PageController, PageEvent};
use folio_render::{TemplateRegistry, TemplateTag, listing::ALL_CATEGORIES};
use folio_source::ContentSource;
use leptos::{prelude::*, task::spawn_local};
use serde::{Deserialize, Serialize};
use wasm_bindgen::JsCast;

use crate::{search::SearchBox, target::SignalTarget};

/// Selector of the card grid.
pub const GRID_SELECTOR: &str = "#articles-grid";

/// One filter tab.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterTab {
    /// Category key, or `all`.
    pub key: String,
    /// Display label.
    pub label: String,
}

impl FilterTab {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
        }
    }

    /// "All" followed by each category of `kind`.
    pub fn for_kind(kind: ArticleKind) -> Vec<Self> {
        std::iter::once(Self::new(ALL_CATEGORIES, "すべて"))
            .chain(
                kind.categories()
                    .iter()
                    .map(|c| Self::new(c.key(), c.label())),
            )
            .collect()
    }
}

/// Parse an exported article collection and normalize it.
///
/// Unparseable text yields an empty list.
pub fn articles_from_json(text: &str, kind: ArticleKind) -> Vec<Article> {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(text) else {
        return Vec::new();
    };
    let raws = RawRecord::from_results(&value);
    dedupe_by_id(Article::normalize_all(&Normalizer::new(), &raws, kind))
}

/// Page controller of an article listing.
pub type ListingController<S> = PageController<Arc<S>, Article>;

/// Controller for the listing of one kind of article, rendering into [`GRID_SELECTOR`].
pub fn listing_controller<S: ContentSource>(
    source: Arc<S>,
    kind: ArticleKind,
    listing: ListingConfig,
    templates: TemplateRegistry,
) -> ListingController<S> {
    let page = ListingPage::new(kind.collection(), GRID_SELECTOR, TemplateTag::ArticleListing)
        .with_categories(kind.categories().iter().map(|c| c.key()));
    PageController::new(source, page, kind, listing).with_templates(templates)
}

/// Reactive handles shared by the listing's event handlers.
struct ListingHandles<S: ContentSource + 'static> {
    controller: StoredValue<ListingController<S>>,
    source: Arc<S>,
    collection: &'static str,
    html: RwSignal<String>,
    loading: RwSignal<bool>,
    has_more: RwSignal<bool>,
}

impl<S: ContentSource + 'static> Clone for ListingHandles<S> {
    fn clone(&self) -> Self {
        Self {
            controller: self.controller,
            source: Arc::clone(&self.source),
            collection: self.collection,
            html: self.html,
            loading: self.loading,
            has_more: self.has_more,
        }
    }
}

impl<S: ContentSource + 'static> ListingHandles<S> {
    fn target(&self) -> SignalTarget {
        SignalTarget::new(GRID_SELECTOR, self.html)
    }

    fn start(&self) {
        if let Some(Some(ticket)) = self.controller.try_update_value(|c| c.begin_load()) {
            self.fetch(ticket);
        }
    }

    fn dispatch(&self, event: PageEvent) {
        let mut target = self.target();
        match self
            .controller
            .try_update_value(|c| c.dispatch(&event, &mut target))
        {
            Some(Dispatch::Start(ticket)) => self.fetch(ticket),
            Some(Dispatch::Deferred {
                rendered: Some(summary),
            }) => self.has_more.set(summary.has_more),
            _ => {}
        }
    }

    /// Active filter according to the controller.
    fn filter(&self) -> Option<String> {
        self.controller
            .try_with_value(|c| c.state().filter().to_string())
    }

    fn fetch(&self, ticket: LoadTicket) {
        let handles = self.clone();
        self.loading.set(true);
        spawn_local(async move {
            let result = handles.source.fetch(handles.collection).await;
            let mut target = handles.target();
            let finished = handles.controller.try_update_value(|c| {
                let outcome = c.complete_load(ticket, result, &mut target);
                let next = if c.take_reload_pending() {
                    c.begin_load()
                } else {
                    None
                };
                (outcome, next)
            });
            // Unmounted while fetching.
            let Some((outcome, next)) = finished else {
                return;
            };
            if let LoadOutcome::Rendered(summary) = outcome {
                handles.has_more.set(summary.has_more);
            }
            match next {
                Some(ticket) => handles.fetch(ticket),
                None => handles.loading.set(false),
            }
        });
    }
}

/// URL fragment of the current page, if any.
fn current_hash() -> Option<String> {
    window()
        .location()
        .hash()
        .ok()
        .filter(|hash| hash.len() > 1)
}

/// Text of a clicked tag badge.
fn clicked_tag(ev: &web_sys::MouseEvent) -> Option<String> {
    let element = ev.target()?.dyn_into::<web_sys::Element>().ok()?;
    if !element.class_list().contains("article-tag") {
        return None;
    }
    element
        .text_content()
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

/// Category filter tabs. Clicking the active tab does nothing.
#[component]
pub fn FilterTabs(
    /// Tabs to show.
    tabs: Vec<FilterTab>,
    /// Active category key.
    active: RwSignal<String>,
) -> impl IntoView {
    view! {
      <div class="filter-tabs" role="tablist">
        <For
          each=move || tabs.clone()
          key=|tab| tab.key.clone()
          children=move |tab| {
            let key = tab.key.clone();
            let is_active = {
              let key = key.clone();
              move || active.get() == key
            };
            let on_click = move |_: web_sys::MouseEvent| {
              if active.get_untracked() != key {
                active.set(key.clone());
              }
            };
            view! {
              <button
                class="filter-tab"
                class:active=is_active.clone()
                role="tab"
                aria-selected=move || is_active().to_string()
                on:click=on_click
              >
                {tab.label}
              </button>
            }
          }
        />
      </div>
    }
}

/// "Load more" button, hidden once everything is shown.
#[component]
pub fn LoadMoreButton(
    /// Whether more matches remain.
    #[prop(into)]
    visible: Signal<bool>,
    /// Invoked on click.
    on_load: Callback<()>,
) -> impl IntoView {
    view! {
      <Show when=move || visible.get()>
        <div class="load-more">
          <button class="load-more-btn" on:click=move |_| on_load.run(())>
            "もっと見る"
          </button>
        </div>
      </Show>
    }
}

/// Article listing with filter tabs, search and load-more.
///
/// Every interaction goes through a [`PageController`]: the initial fetch, filter
/// tabs, the settled search term, tag badges, the URL fragment and load-more.
#[component]
pub fn ArticleListing<S>(
    /// Where articles are fetched from.
    source: Arc<S>,
    /// Which articles to list.
    kind: ArticleKind,
    /// Listing settings.
    #[prop(optional)]
    listing: ListingConfig,
    /// Card templates.
    #[prop(default = TemplateRegistry::new())]
    templates: TemplateRegistry,
    /// Filter tabs; defaults to every category of `kind`.
    #[prop(optional)]
    tabs: Option<Vec<FilterTab>>,
) -> impl IntoView
where
    S: ContentSource + 'static,
{
    let debounce_ms = listing.debounce_ms;
    let tabs = tabs.unwrap_or_else(|| FilterTab::for_kind(kind));
    let handles = ListingHandles {
        controller: StoredValue::new(listing_controller(
            Arc::clone(&source),
            kind,
            listing,
            templates,
        )),
        source,
        collection: kind.collection(),
        html: RwSignal::new(String::new()),
        loading: RwSignal::new(false),
        has_more: RwSignal::new(false),
    };
    let (html, loading, has_more) = (handles.html, handles.loading, handles.has_more);

    let filter = RwSignal::new(ALL_CATEGORIES.to_string());
    let search = RwSignal::new(String::new());

    if let Some(hash) = current_hash() {
        handles.controller.update_value(|c| {
            c.apply(&PageEvent::HashChanged(hash));
        });
        if let Some(key) = handles.filter() {
            filter.set(key);
        }
    }
    handles.start();

    Effect::new({
        let handles = handles.clone();
        move |_| handles.dispatch(PageEvent::FilterSelected(filter.get()))
    });

    Effect::new({
        let handles = handles.clone();
        move |prev: Option<()>| {
            let term = search.get();
            if prev.is_some() {
                handles.dispatch(PageEvent::SearchChanged(term));
            }
        }
    });

    let hash_listener = window_event_listener(leptos::ev::hashchange, {
        let handles = handles.clone();
        move |_| {
            if let Some(hash) = current_hash() {
                handles.dispatch(PageEvent::HashChanged(hash));
                if let Some(key) = handles.filter() {
                    filter.set(key);
                }
            }
        }
    });
    on_cleanup(move || hash_listener.remove());

    let on_grid_click = move |ev: web_sys::MouseEvent| {
        if let Some(tag) = clicked_tag(&ev) {
            ev.prevent_default();
            search.set(tag);
        }
    };

    let on_load = Callback::new(move |()| handles.dispatch(PageEvent::LoadMore));

    view! {
      <section class="article-listing">
        <div class="listing-controls">
          <FilterTabs tabs=tabs active=filter />
          <SearchBox query=search debounce_ms=debounce_ms loading=loading />
        </div>
        <div
          id="articles-grid"
          class="articles-grid"
          inner_html=move || html.get()
          on:click=on_grid_click
        ></div>
        <LoadMoreButton visible=has_more on_load=on_load />
      </section>
    }
}
