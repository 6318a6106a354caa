//! Folio Core Library
//!
//! Configuration, property-bag decoding, typed extraction and record normalization
//! for the Folio content layer.

pub mod block;
pub mod config;
pub mod error;
pub mod extract;
pub mod normalize;
pub mod property;
pub mod record;
pub mod rich_text;

pub use block::{Block, Content};
pub use config::{Config, GridSection, WindowMode};
pub use error::{CoreError, Result};
pub use normalize::{Normalize, Normalizer, dedupe_by_id};
pub use property::{PropertyBag, PropertyValue, RichTextFragment};
pub use record::{
    Article, ArticleCategory, ArticleKind, FixedContentType, GridElement, Project, ProjectType,
    RawRecord, Record, SectionKind, SiteContentItem,
};
