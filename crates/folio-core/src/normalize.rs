//! Record normalization.
//!
//! Turns raw records into typed records. Normalization never fails: every field
//! has a default, and only an absent raw record yields `None`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::{
    block::Content,
    extract::{Checkbox, FileUrl, Link, Number, PlainText, RichHtml, SelectName, Tags, Timestamp},
    property::PropertyBag,
    record::{
        Article, ArticleCategory, ArticleKind, FixedContentType, GridElement, Project,
        ProjectType, RawRecord, Record, SiteContentItem,
    },
};

/// Field aliases, in priority order.
pub mod aliases {
    pub const TITLE: &[&str] = &[
        "Title",
        "title",
        "名前",
        "Name",
        "Article Title",
        "article_title",
        "project_name",
        "Grid Name",
        "grid_name",
    ];
    pub const SLUG: &[&str] = &["Slug", "slug"];
    pub const CATEGORY: &[&str] = &["Category", "category"];
    pub const EXCERPT: &[&str] = &[
        "Excerpt",
        "excerpt",
        "Description",
        "description",
        "Summary",
        "summary",
        "Detail Text",
        "detail_text",
    ];
    pub const DATE: &[&str] = &[
        "Published Date",
        "publishedDate",
        "Publish Date",
        "publish_date",
        "date",
        "Date",
    ];
    pub const IMAGE: &[&str] = &[
        "Featured Image",
        "image",
        "Image",
        "Project Image",
        "imageUrl",
        "Cover Image",
        "cover_image",
        "Grid Image",
        "grid_image",
    ];
    pub const PUBLISHED: &[&str] = &["Published", "published"];
    pub const STATUS: &[&str] = &["Status", "status"];
    pub const READ_TIME: &[&str] = &["Read Time", "readTime", "read_time"];
    pub const PRODUCT_COUNT: &[&str] = &["Product Count", "productCount", "product_count"];
    pub const META_DESCRIPTION: &[&str] = &["Meta Description", "metaDescription"];
    pub const TAGS: &[&str] = &["Tags", "tags"];
    pub const ORDER: &[&str] = &["Order", "order"];
    pub const CTA_LINK: &[&str] = &["CTA Link", "ctaLink", "cta_link"];
    pub const CTA_LABEL: &[&str] = &["CTA Label", "ctaLabel", "cta_label"];
    pub const PROJECT_TYPE: &[&str] = &["Project Type", "projectType", "project_type"];
    pub const LINK: &[&str] = &["Link", "link", "URL", "url", "cta_link"];
    pub const PAGE: &[&str] = &["Page", "page"];
    pub const SECTION_ID: &[&str] = &["Section ID", "sectionId", "section_id"];
    pub const ELEMENT_SELECTOR: &[&str] = &["Element Selector", "elementSelector"];
    pub const CONTENT_TYPE: &[&str] = &["Content Type", "contentType"];
    pub const CONTENT: &[&str] = &["Content", "content"];
    pub const DESCRIPTION: &[&str] = &["Description", "description"];
    pub const IMAGE_FILE: &[&str] = &["Image File", "Image", "image"];
    pub const IMAGE_URL: &[&str] = &["Image URL", "imageUrl"];
    pub const ATTRIBUTE_NAME: &[&str] = &["Attribute Name", "attributeName"];
    pub const ACTIVE: &[&str] = &["Active", "active", "published"];
    pub const ELEMENT_TYPE: &[&str] = &["Element Type", "elementType"];
    pub const CONTAINER_SELECTOR: &[&str] = &["Container Selector", "containerSelector"];
    pub const HREF: &[&str] = &["Href", "href", "Link", "link"];
}

/// Default article title.
pub const UNTITLED: &str = "Untitled";
/// Default read time in minutes.
pub const DEFAULT_READ_TIME: u32 = 5;
/// Default project status.
pub const DEFAULT_PROJECT_STATUS: &str = "運営中";
/// Default grid element type.
pub const DEFAULT_ELEMENT_TYPE: &str = "card";

/// Normalizes raw records, using a fixed clock for the date fallback.
#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    now: DateTime<Utc>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Normalizer {
    /// Normalizer using the current time as the date fallback.
    pub fn new() -> Self {
        Self { now: Utc::now() }
    }

    /// Normalizer with a pinned clock.
    pub fn at(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    /// The fallback date.
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    /// Normalize an article.
    pub fn article(&self, raw: Option<&RawRecord>, kind: ArticleKind) -> Option<Article> {
        raw.map(|raw| self.build_article(raw, kind))
    }

    fn build_article(&self, raw: &RawRecord, kind: ArticleKind) -> Article {
        let bag = raw.bag();
        let id = strip_hyphens(&raw.id);
        let (date, date_defaulted) = self.date(&bag);

        let category = bag.get::<SelectName>(aliases::CATEGORY);
        let excerpt = bag.get_or::<PlainText>(aliases::EXCERPT, String::new());
        let excerpt_html = bag.get_or::<RichHtml>(aliases::EXCERPT, String::new());
        let slug = bag
            .get::<PlainText>(aliases::SLUG)
            .unwrap_or_else(|| id.clone());

        Article {
            kind,
            title: title_or_untitled(&bag),
            slug,
            category: ArticleCategory::resolve(kind, category.as_deref()),
            excerpt,
            excerpt_html,
            content: Content::decode(raw.content.as_ref()),
            date,
            date_defaulted,
            image_url: bag.get::<FileUrl>(aliases::IMAGE),
            published: published(&bag),
            read_time: count(&bag, aliases::READ_TIME).unwrap_or(DEFAULT_READ_TIME),
            product_count: count(&bag, aliases::PRODUCT_COUNT).unwrap_or(0),
            meta_description: bag.get_or::<PlainText>(aliases::META_DESCRIPTION, String::new()),
            tags: bag.get_or::<Tags>(aliases::TAGS, Vec::new()),
            order: order(&bag),
            cta_link: bag.get::<Link>(aliases::CTA_LINK),
            cta_label: bag.get::<PlainText>(aliases::CTA_LABEL),
            id,
        }
    }

    /// Normalize a project.
    pub fn project(&self, raw: Option<&RawRecord>) -> Option<Project> {
        raw.map(|raw| self.build_project(raw))
    }

    fn build_project(&self, raw: &RawRecord) -> Project {
        let bag = raw.bag();
        let (date, date_defaulted) = self.date(&bag);
        let project_type = bag.get::<SelectName>(aliases::PROJECT_TYPE);

        Project {
            id: strip_hyphens(&raw.id),
            title: title_or_untitled(&bag),
            project_type: ProjectType::resolve(project_type.as_deref()),
            description: bag.get_or::<PlainText>(aliases::EXCERPT, String::new()),
            content: Content::decode(raw.content.as_ref()),
            image_url: bag.get::<FileUrl>(aliases::IMAGE),
            status: bag
                .get::<SelectName>(aliases::STATUS)
                .unwrap_or_else(|| DEFAULT_PROJECT_STATUS.to_string()),
            link: bag.get::<Link>(aliases::LINK),
            order: order(&bag),
            published: published(&bag),
            tags: bag.get_or::<Tags>(aliases::TAGS, Vec::new()),
            date,
            date_defaulted,
        }
    }

    /// Normalize a fixed site content fragment.
    pub fn site_content_item(&self, raw: Option<&RawRecord>) -> Option<SiteContentItem> {
        raw.map(|raw| self.build_site_content_item(raw))
    }

    fn build_site_content_item(&self, raw: &RawRecord) -> SiteContentItem {
        let bag = raw.bag();
        let content_type = bag.get::<SelectName>(aliases::CONTENT_TYPE);

        SiteContentItem {
            id: raw.id.clone(),
            title: bag.get_or::<PlainText>(aliases::TITLE, String::new()),
            page: text_or_select(&bag, aliases::PAGE),
            section_id: text_or_select(&bag, aliases::SECTION_ID),
            element_selector: bag.get_or::<PlainText>(aliases::ELEMENT_SELECTOR, String::new()),
            content_type: FixedContentType::resolve(content_type.as_deref()),
            content: bag.get_or::<PlainText>(aliases::CONTENT, String::new()),
            image_url: image_url(&bag),
            attribute_name: bag.get_or::<PlainText>(aliases::ATTRIBUTE_NAME, String::new()),
            order: order(&bag),
            published: bag.get_or::<Checkbox>(aliases::ACTIVE, false),
        }
    }

    /// Normalize a grid element.
    pub fn grid_element(&self, raw: Option<&RawRecord>) -> Option<GridElement> {
        raw.map(|raw| self.build_grid_element(raw))
    }

    fn build_grid_element(&self, raw: &RawRecord) -> GridElement {
        let bag = raw.bag();

        GridElement {
            id: raw.id.clone(),
            title: bag.get_or::<PlainText>(aliases::TITLE, String::new()),
            page: text_or_select(&bag, aliases::PAGE),
            section_id: text_or_select(&bag, aliases::SECTION_ID),
            element_type: bag
                .get::<SelectName>(aliases::ELEMENT_TYPE)
                .unwrap_or_else(|| DEFAULT_ELEMENT_TYPE.to_string()),
            content: bag.get_or::<PlainText>(aliases::CONTENT, String::new()),
            description: bag.get_or::<PlainText>(aliases::DESCRIPTION, String::new()),
            image_url: image_url(&bag),
            container_selector: bag
                .get_or::<PlainText>(aliases::CONTAINER_SELECTOR, String::new()),
            order: order(&bag),
            status: bag.get_or::<SelectName>(aliases::STATUS, String::new()),
            published: bag.get_or::<Checkbox>(aliases::PUBLISHED, false),
            href: bag.get::<Link>(aliases::HREF),
        }
    }

    fn date(&self, bag: &PropertyBag<'_>) -> (DateTime<Utc>, bool) {
        match bag.get::<Timestamp>(aliases::DATE) {
            Some(date) => (date, false),
            None => (self.now, true),
        }
    }
}

/// A record type that can be built from a raw record.
pub trait Normalize: Sized {
    /// Extra input the record needs (e.g. the article kind).
    type Options: Copy + Send + Sync + 'static;

    fn normalize(normalizer: &Normalizer, raw: &RawRecord, options: Self::Options) -> Self;

    /// Normalize a batch, preserving input order.
    fn normalize_all(normalizer: &Normalizer, raws: &[RawRecord], options: Self::Options) -> Vec<Self> {
        raws.iter()
            .map(|raw| Self::normalize(normalizer, raw, options))
            .collect()
    }
}

impl Normalize for Article {
    type Options = ArticleKind;

    fn normalize(normalizer: &Normalizer, raw: &RawRecord, kind: ArticleKind) -> Self {
        normalizer.build_article(raw, kind)
    }
}

impl Normalize for Project {
    type Options = ();

    fn normalize(normalizer: &Normalizer, raw: &RawRecord, _: ()) -> Self {
        normalizer.build_project(raw)
    }
}

impl Normalize for SiteContentItem {
    type Options = ();

    fn normalize(normalizer: &Normalizer, raw: &RawRecord, _: ()) -> Self {
        normalizer.build_site_content_item(raw)
    }
}

impl Normalize for GridElement {
    type Options = ();

    fn normalize(normalizer: &Normalizer, raw: &RawRecord, _: ()) -> Self {
        normalizer.build_grid_element(raw)
    }
}

/// Collapse records sharing an id: the last one wins and takes the position of the
/// first. Records without an id are kept as they are.
pub fn dedupe_by_id<R: Record>(records: Vec<R>) -> Vec<R> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut out: Vec<R> = Vec::with_capacity(records.len());

    for record in records {
        if record.id().is_empty() {
            out.push(record);
            continue;
        }
        match seen.get(record.id()) {
            Some(&slot) => out[slot] = record,
            None => {
                seen.insert(record.id().to_string(), out.len());
                out.push(record);
            }
        }
    }
    out
}

/// Strip hyphens from a content API page id.
pub fn strip_hyphens(id: &str) -> String {
    id.replace('-', "")
}

fn title_or_untitled(bag: &PropertyBag<'_>) -> String {
    bag.get_or::<PlainText>(aliases::TITLE, UNTITLED.to_string())
}

/// Published checkbox if present, otherwise a `Published` status.
fn published(bag: &PropertyBag<'_>) -> bool {
    if let Some(checked) = bag.get::<Checkbox>(aliases::PUBLISHED) {
        return checked;
    }
    bag.get::<SelectName>(aliases::STATUS)
        .is_some_and(|status| status.trim().eq_ignore_ascii_case("published"))
}

fn order(bag: &PropertyBag<'_>) -> i64 {
    bag.get::<Number>(aliases::ORDER)
        .map(|n| n.round() as i64)
        .unwrap_or(0)
}

fn count(bag: &PropertyBag<'_>, keys: &[&str]) -> Option<u32> {
    bag.get::<Number>(keys).map(|n| n.round().max(0.0) as u32)
}

fn text_or_select(bag: &PropertyBag<'_>, keys: &[&str]) -> String {
    bag.get::<PlainText>(keys)
        .or_else(|| bag.get::<SelectName>(keys))
        .unwrap_or_default()
}

/// An explicit image URL wins over an attached file.
fn image_url(bag: &PropertyBag<'_>) -> Option<String> {
    bag.get::<Link>(aliases::IMAGE_URL)
        .or_else(|| bag.get::<FileUrl>(aliases::IMAGE_FILE))
}
