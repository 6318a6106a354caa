//! Normalized record types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::{block::Content, property::PropertyBag};

/// Which article listing a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArticleKind {
    /// Affiliate articles (comparisons, rankings, reviews, guides).
    Affiling,
    /// Note articles.
    Note,
}

impl ArticleKind {
    /// Category used when the record carries none, or one outside this kind.
    pub fn default_category(self) -> ArticleCategory {
        match self {
            Self::Affiling => ArticleCategory::Comparison,
            Self::Note => ArticleCategory::Technology,
        }
    }

    /// Categories valid for this kind.
    pub fn categories(self) -> &'static [ArticleCategory] {
        use ArticleCategory::*;
        match self {
            Self::Affiling => &[Comparison, Ranking, Review, Guide],
            Self::Note => &[Technology, Business, Creative, Lifestyle, News],
        }
    }

    /// Parse a kind name (`affiling`, `note`).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "affiling" | "affiliate" => Some(Self::Affiling),
            "note" => Some(Self::Note),
            _ => None,
        }
    }

    /// Kind name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Affiling => "affiling",
            Self::Note => "note",
        }
    }

    /// Collection holding articles of this kind.
    pub fn collection(self) -> &'static str {
        match self {
            Self::Affiling => "affiling_articles",
            Self::Note => "note_articles",
        }
    }
}

/// Article category with a fixed key and display label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArticleCategory {
    Comparison,
    Ranking,
    Review,
    Guide,
    Technology,
    Business,
    Creative,
    Lifestyle,
    News,
}

impl ArticleCategory {
    /// Stable key used for filtering.
    pub fn key(self) -> &'static str {
        match self {
            Self::Comparison => "comparison",
            Self::Ranking => "ranking",
            Self::Review => "review",
            Self::Guide => "guide",
            Self::Technology => "technology",
            Self::Business => "business",
            Self::Creative => "creative",
            Self::Lifestyle => "lifestyle",
            Self::News => "news",
        }
    }

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Comparison => "商品比較",
            Self::Ranking => "ランキング",
            Self::Review => "レビュー",
            Self::Guide => "ガイド",
            Self::Technology => "テクノロジー",
            Self::Business => "ビジネス",
            Self::Creative => "クリエイティブ",
            Self::Lifestyle => "ライフスタイル",
            Self::News => "ニュース",
        }
    }

    /// Resolve a raw value within `kind`: keys first (case-insensitive), then
    /// labels, then the kind's default.
    pub fn resolve(kind: ArticleKind, value: Option<&str>) -> Self {
        let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
            return kind.default_category();
        };
        let categories = kind.categories();
        categories
            .iter()
            .find(|c| c.key().eq_ignore_ascii_case(value))
            .or_else(|| categories.iter().find(|c| c.label() == value))
            .copied()
            .unwrap_or_else(|| kind.default_category())
    }
}

/// Project type used for filtering and card selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    #[default]
    Sns,
    Brand,
    Development,
    Writing,
    Affiliate,
    Ec,
}

impl ProjectType {
    /// All project types.
    pub const ALL: [Self; 6] = [
        Self::Sns,
        Self::Brand,
        Self::Development,
        Self::Writing,
        Self::Affiliate,
        Self::Ec,
    ];

    /// Stable key.
    pub fn key(self) -> &'static str {
        match self {
            Self::Sns => "sns",
            Self::Brand => "brand",
            Self::Development => "development",
            Self::Writing => "writing",
            Self::Affiliate => "affiliate",
            Self::Ec => "ec",
        }
    }

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Sns => "SNS運用",
            Self::Brand => "ブランド",
            Self::Development => "開発",
            Self::Writing => "ライティング",
            Self::Affiliate => "アフィリエイト",
            Self::Ec => "EC",
        }
    }

    /// Parse a key or label; anything else is the default.
    pub fn resolve(value: Option<&str>) -> Self {
        let Some(value) = value.map(str::trim) else {
            return Self::default();
        };
        Self::ALL
            .into_iter()
            .find(|t| t.key().eq_ignore_ascii_case(value) || t.label() == value)
            .unwrap_or_default()
    }
}

/// How a fixed fragment is written into its element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FixedContentType {
    #[default]
    Text,
    Html,
    Image,
    Attribute,
}

impl FixedContentType {
    /// Parse a content type name; anything unknown is text.
    pub fn resolve(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("html") => Self::Html,
            Some("image") => Self::Image,
            Some("attribute") => Self::Attribute,
            _ => Self::Text,
        }
    }
}

/// Whether a section's fragments are fixed elements or grid cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionKind {
    Fixed,
    Grid,
}

/// A raw record as fetched: an id, a property bag and an optional body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    pub id: String,
    pub properties: Map<String, Value>,
    pub content: Option<Value>,
}

impl RawRecord {
    /// Wrap a JSON object. Objects with a `properties` key are content API pages;
    /// any other object is a flat record and is its own property bag.
    pub fn from_json(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        let id = match map.get("id") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        };
        let content = map
            .get("content")
            .or_else(|| map.get("blocks"))
            .filter(|v| !v.is_null())
            .cloned();

        let properties = match map.get("properties") {
            Some(Value::Object(props)) => props.clone(),
            Some(_) => Map::new(),
            None => map.clone(),
        };

        Some(Self {
            id,
            properties,
            content,
        })
    }

    /// Records in a payload: a bare array, or an object with a `results` array.
    /// Non-object entries are dropped.
    pub fn from_results(value: &Value) -> Vec<Self> {
        let items = match value {
            Value::Array(items) => items.as_slice(),
            Value::Object(map) => map
                .get("results")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default(),
            _ => &[],
        };
        items.iter().filter_map(Self::from_json).collect()
    }

    /// The property bag view.
    pub fn bag(&self) -> PropertyBag<'_> {
        PropertyBag::new(Some(&self.properties))
    }
}

/// Shared view over listable records.
pub trait Record {
    fn id(&self) -> &str;
    fn title(&self) -> &str;
    fn excerpt(&self) -> &str;
    fn tags(&self) -> &[String];
    /// Key compared against the active category filter.
    fn category_key(&self) -> &str;
    fn is_published(&self) -> bool;
    fn order(&self) -> i64;
    fn date(&self) -> DateTime<Utc>;
}

/// An article (affiliate or note).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    pub kind: ArticleKind,
    pub title: String,
    pub slug: String,
    pub category: ArticleCategory,
    pub excerpt: String,
    /// Inline markup built from the rich-text excerpt.
    pub excerpt_html: String,
    pub content: Content,
    pub date: DateTime<Utc>,
    /// True when `date` is the normalization-time fallback.
    pub date_defaulted: bool,
    pub image_url: Option<String>,
    pub published: bool,
    pub read_time: u32,
    pub product_count: u32,
    pub meta_description: String,
    pub tags: Vec<String>,
    pub order: i64,
    pub cta_link: Option<String>,
    pub cta_label: Option<String>,
}

/// A portfolio project.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub title: String,
    pub project_type: ProjectType,
    pub description: String,
    pub content: Content,
    pub image_url: Option<String>,
    pub status: String,
    pub link: Option<String>,
    pub order: i64,
    pub published: bool,
    pub tags: Vec<String>,
    pub date: DateTime<Utc>,
    pub date_defaulted: bool,
}

/// A CMS-managed fragment written into an existing element.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteContentItem {
    pub id: String,
    pub title: String,
    pub page: String,
    pub section_id: String,
    pub element_selector: String,
    pub content_type: FixedContentType,
    pub content: String,
    pub image_url: Option<String>,
    pub attribute_name: String,
    pub order: i64,
    /// From the `Active` checkbox.
    pub published: bool,
}

/// A CMS-managed card inside a grid section.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridElement {
    pub id: String,
    pub title: String,
    pub page: String,
    pub section_id: String,
    pub element_type: String,
    pub content: String,
    pub description: String,
    pub image_url: Option<String>,
    pub container_selector: String,
    pub order: i64,
    pub status: String,
    pub published: bool,
    pub href: Option<String>,
}

impl Record for Article {
    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn excerpt(&self) -> &str {
        &self.excerpt
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }

    fn category_key(&self) -> &str {
        self.category.key()
    }

    fn is_published(&self) -> bool {
        self.published
    }

    fn order(&self) -> i64 {
        self.order
    }

    fn date(&self) -> DateTime<Utc> {
        self.date
    }
}

impl Record for Project {
    fn id(&self) -> &str {
        &self.id
    }

    fn title(&self) -> &str {
        &self.title
    }

    fn excerpt(&self) -> &str {
        &self.description
    }

    fn tags(&self) -> &[String] {
        &self.tags
    }

    fn category_key(&self) -> &str {
        self.project_type.key()
    }

    fn is_published(&self) -> bool {
        self.published
    }

    fn order(&self) -> i64 {
        self.order
    }

    fn date(&self) -> DateTime<Utc> {
        self.date
    }
}
