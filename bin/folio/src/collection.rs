//! Known collections and the record kind each holds.

use std::fmt;

use folio_core::{
    Article, ArticleKind, GridElement, Normalize, Normalizer, Project, ProjectType, RawRecord,
    Record, SiteContentItem, dedupe_by_id,
};
use folio_page::site::{GRID_COLLECTION, SITE_CONTENT_COLLECTION};

/// Record kind of a collection, derived from its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Articles(ArticleKind),
    Projects,
    SiteContent,
    GridElements,
}

/// Per-collection data quality figures.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionReport {
    pub records: usize,
    pub published: usize,
    /// Ids of records whose date fell back to the normalization time.
    pub defaulted_dates: Vec<String>,
    /// Ids seen more than once.
    pub duplicate_ids: Vec<String>,
}

impl Collection {
    /// Resolve a collection name such as `affiling_articles` or `projects`.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        match name.as_str() {
            SITE_CONTENT_COLLECTION => Some(Self::SiteContent),
            GRID_COLLECTION => Some(Self::GridElements),
            "projects" | "portfolio" => Some(Self::Projects),
            _ => name
                .strip_suffix("_articles")
                .and_then(ArticleKind::parse)
                .map(Self::Articles),
        }
    }

    /// Whether the collection renders as a filterable listing.
    pub fn is_listing(self) -> bool {
        matches!(self, Self::Articles(_) | Self::Projects)
    }

    /// Category keys accepted by the listing filter.
    pub fn categories(self) -> Vec<&'static str> {
        match self {
            Self::Articles(kind) => kind.categories().iter().map(|c| c.key()).collect(),
            Self::Projects => ProjectType::ALL.iter().map(|t| t.key()).collect(),
            Self::SiteContent | Self::GridElements => Vec::new(),
        }
    }

    /// Whether a raw record normalizes to a published record.
    pub fn is_published(self, normalizer: &Normalizer, raw: &RawRecord) -> bool {
        match self {
            Self::Articles(kind) => Article::normalize(normalizer, raw, kind).published,
            Self::Projects => Project::normalize(normalizer, raw, ()).published,
            Self::SiteContent => SiteContentItem::normalize(normalizer, raw, ()).published,
            Self::GridElements => GridElement::normalize(normalizer, raw, ()).published,
        }
    }

    /// Normalize every record and collect quality figures.
    pub fn report(self, normalizer: &Normalizer, raws: &[RawRecord]) -> CollectionReport {
        let mut report = CollectionReport {
            records: raws.len(),
            published: raws
                .iter()
                .filter(|raw| self.is_published(normalizer, raw))
                .count(),
            duplicate_ids: duplicate_ids(raws.iter().map(|raw| raw.id.as_str())),
            ..CollectionReport::default()
        };

        let dated: Vec<(String, bool)> = match self {
            Self::Articles(kind) => Article::normalize_all(normalizer, raws, kind)
                .into_iter()
                .map(|a| (a.id, a.date_defaulted))
                .collect(),
            Self::Projects => Project::normalize_all(normalizer, raws, ())
                .into_iter()
                .map(|p| (p.id, p.date_defaulted))
                .collect(),
            Self::SiteContent | Self::GridElements => Vec::new(),
        };
        report.defaulted_dates = dated
            .into_iter()
            .filter(|(_, defaulted)| *defaulted)
            .map(|(id, _)| id)
            .collect();
        report
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Articles(kind) => write!(f, "{} articles", kind.as_str()),
            Self::Projects => f.write_str("projects"),
            Self::SiteContent => f.write_str("site content"),
            Self::GridElements => f.write_str("grid elements"),
        }
    }
}

/// Ids occurring more than once, in first-seen order. Empty ids are ignored.
pub fn duplicate_ids<'a>(ids: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut duplicates: Vec<String> = Vec::new();
    for id in ids {
        if id.is_empty() {
            continue;
        }
        if !seen.insert(id) && !duplicates.iter().any(|d| d == id) {
            duplicates.push(id.to_string());
        }
    }
    duplicates
}

/// Normalize and dedupe a listing collection.
pub fn listing_records<R>(raws: &[RawRecord], options: R::Options) -> Vec<R>
where
    R: Normalize + Record,
{
    dedupe_by_id(R::normalize_all(&Normalizer::new(), raws, options))
}
