//! Folio Page Library
//!
//! Page-local behaviour: listing state with filter, search and load-more, a
//! controller that fetches and re-renders through a [`dom::RenderTarget`], search
//! debouncing, article head updates, and application of CMS-managed fixed
//! elements and grid sections.

pub mod article;
pub mod controller;
pub mod debounce;
pub mod dom;
pub mod site;
pub mod state;

pub use article::{STRUCTURED_DATA_SELECTOR, apply_article_meta};
pub use controller::{
    Dispatch, ListingPage, LoadOutcome, LoadTicket, PageController, PageEvent, RenderSummary,
};
pub use debounce::SearchDebouncer;
pub use dom::{MemoryDocument, RenderTarget, TargetError};
pub use site::{ApplySummary, apply_fixed_elements, populate_grid_sections, populate_site};
pub use state::PageState;
