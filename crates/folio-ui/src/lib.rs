//! Folio UI Components
//!
//! Leptos components for Folio listing and article pages. Listings run through a
//! [`folio_page::PageController`] that renders into a signal-backed target.
//!
//! # Components
//!
//! ## Listing
//! - [`ArticleListing`] - Filterable, searchable article grid with load-more
//! - [`FilterTabs`] - Category tabs
//! - [`LoadMoreButton`] - Extends the visible window
//!
//! ## Search
//! - [`SearchBox`] - Text input with debounced search
//!
//! ## Article
//! - [`ArticleDetail`] - Single article with contents, anchored headings and related articles
//! - [`ArticleSidebar`] - Popular and recent articles
//!
//! ## Site
//! - [`SiteContent`] - Applies CMS-managed fixed elements and grid sections to the page
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use folio_core::ArticleKind;
//! use folio_source::HttpJsonSource;
//! use folio_ui::ArticleListing;
//! use leptos::prelude::*;
//!
//! #[component]
//! fn App(source: HttpJsonSource) -> impl IntoView {
//!     view! {
//!         <ArticleListing source=Arc::new(source) kind=ArticleKind::Affiling />
//!     }
//! }
//! ```

pub mod article;
pub mod listing;
pub mod search;
pub mod site;
pub mod target;

pub use article::{ArticleDetail, ArticleSidebar, article_body};
pub use listing::{
    ArticleListing, FilterTab, FilterTabs, GRID_SELECTOR, ListingController, LoadMoreButton,
    articles_from_json, listing_controller,
};
pub use search::{DEFAULT_DEBOUNCE_MS, SearchBox};
pub use site::SiteContent;
pub use target::{DomTarget, SignalTarget};
