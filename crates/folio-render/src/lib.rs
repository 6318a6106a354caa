//! Folio Render Library
//!
//! Turns normalized records into HTML: rich text and block bodies, card templates
//! selected by tag, listing selection with filters and paging, grid sections and
//! article pages with their contents, related lists and head metadata.

pub mod article;
pub mod blocks;
pub mod cards;
pub mod grid;
pub mod html;
pub mod listing;
pub mod template;

pub use article::{
    ArticleBody, ArticleMeta, MetaTag, RELATED_LIMIT, SIDEBAR_LIMIT, SidebarList, TocEntry,
    article_page_path, find_published, recent_articles, related_articles, render_article_body,
    render_article_page, render_related, render_sidebar, render_toc,
};
pub use blocks::{render_blocks, render_content};
pub use cards::{RenderCard, render_card};
pub use grid::{GridGroup, group_grid_elements};
pub use listing::{ListingQuery, Selection, SortOrder, render_listing, select};
pub use template::{Template, TemplateContext, TemplateError, TemplateRegistry, TemplateTag};
