//! Card template system.
//!
//! Templates are plain strings with `{{ variable }}` placeholders (`{{ variable? }}`
//! for optional ones). Every template is keyed by a [`TemplateTag`] from a closed
//! set; an unknown tag name resolves to [`TemplateTag::Default`].

use std::{collections::HashMap, fmt};

use thiserror::Error;

use crate::html::escape_html;

/// Template rendering errors.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Missing required variable.
    #[error("missing required variable: {0}")]
    MissingVariable(String),

    /// Template not found.
    #[error("template not found: {0}")]
    NotFound(String),

    /// Invalid template syntax.
    #[error("invalid template syntax: {0}")]
    InvalidSyntax(String),
}

/// Result type for template operations.
pub type Result<T> = std::result::Result<T, TemplateError>;

/// The fixed set of templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateTag {
    SnsCard,
    BrandItem,
    DevCard,
    ChannelCard,
    AreaCard,
    ArticleCard,
    EcCard,
    ArticleListing,
    ProjectCard,
    TableRow,
    BadgeList,
    Default,
}

impl TemplateTag {
    /// Every tag.
    pub const ALL: [Self; 12] = [
        Self::SnsCard,
        Self::BrandItem,
        Self::DevCard,
        Self::ChannelCard,
        Self::AreaCard,
        Self::ArticleCard,
        Self::EcCard,
        Self::ArticleListing,
        Self::ProjectCard,
        Self::TableRow,
        Self::BadgeList,
        Self::Default,
    ];

    /// Tag name as used in configuration and markup.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SnsCard => "sns_card",
            Self::BrandItem => "brand_item",
            Self::DevCard => "dev_card",
            Self::ChannelCard => "channel_card",
            Self::AreaCard => "area_card",
            Self::ArticleCard => "article_card",
            Self::EcCard => "ec_card",
            Self::ArticleListing => "article_listing",
            Self::ProjectCard => "project_card",
            Self::TableRow => "table_row",
            Self::BadgeList => "badge_list",
            Self::Default => "default",
        }
    }

    /// Resolve a tag name; unknown names map to `Default`.
    pub fn parse(name: &str) -> Self {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|tag| tag.as_str().eq_ignore_ascii_case(name))
            .unwrap_or(Self::Default)
    }
}

impl fmt::Display for TemplateTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Template context with variables for interpolation.
///
/// Values go in either as text (escaped on insert) or as markup (inserted as is).
#[derive(Debug, Clone, Default)]
pub struct TemplateContext {
    variables: HashMap<String, String>,
}

impl TemplateContext {
    /// Create a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a text value, escaping it.
    pub fn insert_text(&mut self, key: impl Into<String>, value: impl AsRef<str>) {
        self.variables
            .insert(key.into(), escape_html(value.as_ref()));
    }

    /// Insert pre-rendered markup as is.
    pub fn insert_html(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.variables.insert(key.into(), value.into());
    }

    /// Builder form of [`insert_text`](Self::insert_text).
    #[must_use]
    pub fn with_text(mut self, key: impl Into<String>, value: impl AsRef<str>) -> Self {
        self.insert_text(key, value);
        self
    }

    /// Builder form of [`insert_html`](Self::insert_html).
    #[must_use]
    pub fn with_html(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert_html(key, value);
        self
    }

    /// Get a variable value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.variables.get(key).map(String::as_str)
    }

    /// Check if a variable exists.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.variables.contains_key(key)
    }
}

/// A simple template that supports variable interpolation.
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    content: String,
}

impl Template {
    /// Create a new template with the given name and content.
    #[must_use]
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Get the template name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Render the template with the given context.
    ///
    /// Substituted values are never re-scanned for placeholders.
    pub fn render(&self, context: &TemplateContext) -> Result<String> {
        let mut result = self.content.clone();
        let mut pos = 0;

        while let Some(start) = result[pos..].find("{{") {
            let start = pos + start;
            let end = result[start..]
                .find("}}")
                .ok_or_else(|| TemplateError::InvalidSyntax("unclosed {{ delimiter".to_string()))?;
            let end = start + end + 2;

            let var_name = result[start + 2..end - 2].trim();

            let (var_name, optional) = if let Some(stripped) = var_name.strip_suffix('?') {
                (stripped, true)
            } else {
                (var_name, false)
            };

            let value = match context.get(var_name) {
                Some(v) => v.to_string(),
                None if optional => String::new(),
                None => return Err(TemplateError::MissingVariable(var_name.to_string())),
            };

            result.replace_range(start..end, &value);
            pos = start + value.len();
        }

        Ok(result)
    }
}

/// Lookup table from template tag to template.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: HashMap<TemplateTag, Template>,
}

impl TemplateRegistry {
    /// Create a new registry with the built-in templates.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self::default();
        registry.register_defaults();
        registry
    }

    /// Register the built-in templates.
    fn register_defaults(&mut self) {
        for tag in TemplateTag::ALL {
            let content = match tag {
                TemplateTag::SnsCard | TemplateTag::EcCard => SNS_CARD_TEMPLATE,
                TemplateTag::BrandItem => BRAND_ITEM_TEMPLATE,
                TemplateTag::DevCard => DEV_CARD_TEMPLATE,
                TemplateTag::ChannelCard => CHANNEL_CARD_TEMPLATE,
                TemplateTag::AreaCard => AREA_CARD_TEMPLATE,
                TemplateTag::ArticleCard => ARTICLE_CARD_TEMPLATE,
                TemplateTag::ArticleListing => ARTICLE_LISTING_TEMPLATE,
                TemplateTag::ProjectCard => PROJECT_CARD_TEMPLATE,
                TemplateTag::TableRow => TABLE_ROW_TEMPLATE,
                TemplateTag::BadgeList => BADGE_LIST_TEMPLATE,
                TemplateTag::Default => DEFAULT_CARD_TEMPLATE,
            };
            self.register(tag, Template::new(tag.as_str(), content));
        }
    }

    /// Register (or replace) the template for a tag.
    pub fn register(&mut self, tag: TemplateTag, template: Template) {
        self.templates.insert(tag, template);
    }

    /// Template for a tag, falling back to the default template.
    #[must_use]
    pub fn get(&self, tag: TemplateTag) -> Option<&Template> {
        self.templates
            .get(&tag)
            .or_else(|| self.templates.get(&TemplateTag::Default))
    }

    /// Render a tag's template with the given context.
    pub fn render(&self, tag: TemplateTag, context: &TemplateContext) -> Result<String> {
        let template = self
            .get(tag)
            .ok_or_else(|| TemplateError::NotFound(tag.to_string()))?;
        template.render(context)
    }
}

/// Card for SNS and EC grid entries.
pub const SNS_CARD_TEMPLATE: &str = r#"<div class="notion-card notion-card-{{ tag }}"{{ order_style? }}>
    {{ wrapper_open }}
        <div class="card-image">{{ image_html }}</div>
        <div class="card-content">
            <h3 class="card-title">{{ title }}</h3>
            <p class="card-description">{{ description }}</p>
        </div>
    {{ wrapper_close }}
</div>"#;

/// Brand showcase item.
pub const BRAND_ITEM_TEMPLATE: &str = r#"<div class="notion-card notion-card-{{ tag }}"{{ order_style? }}>
    <div class="brand-visual">{{ image_html }}</div>
    <div class="brand-info">
        <h3 class="brand-title">{{ title }}</h3>
        <p class="brand-description">{{ description }}</p>
    </div>
</div>"#;

/// Development card with an optional status badge.
pub const DEV_CARD_TEMPLATE: &str = r#"<div class="notion-card notion-card-{{ tag }}"{{ order_style? }}>
    <div class="dev-icon"><svg viewBox="0 0 24 24" fill="currentColor"><path d="M9.4 16.6 4.8 12l4.6-4.6L8 6l-6 6 6 6 1.4-1.4zm5.2 0 4.6-4.6-4.6-4.6L16 6l6 6-6 6-1.4-1.4z"/></svg></div>
    <h3 class="dev-title">{{ title }}</h3>
    <p class="dev-description">{{ body }}</p>
    {{ status_html? }}
</div>"#;

/// Channel card.
pub const CHANNEL_CARD_TEMPLATE: &str = r#"<div class="notion-card notion-card-{{ tag }}"{{ order_style? }}>
    {{ wrapper_open }}
        <div class="channel-icon"><svg viewBox="0 0 24 24" fill="currentColor"><path d="M12 2a10 10 0 1 0 0 20 10 10 0 0 0 0-20zm-2 15-5-5 1.4-1.4 3.6 3.6 7.6-7.6L19 8l-9 9z"/></svg></div>
        <h3 class="channel-title">{{ title }}</h3>
        <p class="channel-description">{{ description }}</p>
    {{ wrapper_close }}
</div>"#;

/// Business area card with hover content.
pub const AREA_CARD_TEMPLATE: &str = r#"<div class="notion-card notion-card-{{ tag }}"{{ order_style? }}>
    <div class="card-background"><div class="card-gradient"></div></div>
    <div class="card-content">
        <h3 class="card-title">{{ title }}</h3>
        <p class="card-description">{{ description }}</p>
        <div class="card-hover-content"><p>{{ hover }}</p></div>
    </div>
</div>"#;

/// Writing grid card.
pub const ARTICLE_CARD_TEMPLATE: &str = r#"<div class="notion-card notion-card-{{ tag }}"{{ order_style? }}>
    {{ wrapper_open }}
        {{ image_html? }}
        <div class="article-content">
            <h3 class="article-title">{{ title }}</h3>
            <p class="article-description">{{ description }}</p>
        </div>
    {{ wrapper_close }}
</div>"#;

/// Article card on the affiliate and note listing pages.
pub const ARTICLE_LISTING_TEMPLATE: &str = r#"<article class="article-card" data-category="{{ category }}" data-article-id="{{ id }}">
    <div class="article-image">{{ image_html }}</div>
    <div class="article-content">
        <div class="article-meta">
            <span class="article-category">{{ category_label }}</span>
            <span class="article-date">{{ date }}</span>
        </div>
        <h3 class="article-title"><a href="{{ href }}">{{ title }}</a></h3>
        <p class="article-excerpt">{{ excerpt_html }}</p>
        {{ tags_html? }}
        <div class="article-stats">{{ stats_html }}</div>
        {{ cta_html? }}
    </div>
</article>"#;

/// Project card on the portfolio listing.
pub const PROJECT_CARD_TEMPLATE: &str = r#"<div class="project-card" data-type="{{ category }}">
    <div class="card-image">{{ image_html }}</div>
    <div class="card-content">
        <span class="project-type">{{ category_label }}</span>
        <h3 class="card-title">{{ title }}</h3>
        <p class="card-description">{{ description }}</p>
        <span class="project-status">{{ status }}</span>
        {{ link_html? }}
    </div>
</div>"#;

/// Summary table row.
pub const TABLE_ROW_TEMPLATE: &str = r#"<tr class="record-row" data-category="{{ category }}"><td class="record-title"><a href="{{ href }}">{{ title }}</a></td><td class="record-category">{{ category_label }}</td><td class="record-date">{{ date }}</td></tr>"#;

/// Tag badges.
pub const BADGE_LIST_TEMPLATE: &str = r#"<div class="article-tags">{{ badges }}</div>"#;

/// Fallback card.
pub const DEFAULT_CARD_TEMPLATE: &str = r#"<div class="notion-card notion-card-{{ tag }}"{{ order_style? }}>
    <div class="card-image">{{ image_html? }}</div>
    <div class="card-content">
        <h3 class="card-title">{{ title }}</h3>
        <p class="card-description">{{ description? }}</p>
    </div>
</div>"#;
