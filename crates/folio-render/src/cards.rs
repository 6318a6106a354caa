//! Record cards.
//!
//! A card is a template plus the context a record builds for it. Every record fills
//! the shared card variables (`tag`, `title`, `description`, `image_html`, wrapper
//! tags, ...) so any template can render any record; record-specific variables are
//! added on top.

use folio_core::{Article, ArticleKind, GridElement, Project, Record};
use tracing::warn;

use crate::{
    blocks::render_content,
    html::{escape_html, format_date, img_tag, safe_href, wrapper_tags},
    template::{TemplateContext, TemplateRegistry, TemplateTag},
};

/// Maximum number of tag badges on a card.
pub const MAX_BADGES: usize = 3;

/// Status that earns a badge on development cards.
pub const IN_DEVELOPMENT: &str = "開発中";

/// Description shown on project cards without one.
pub const MISSING_DESCRIPTION: &str = "説明文が設定されていません。";

const ICON_PLACEHOLDER: &str = r#"<div class="image-placeholder"><svg viewBox="0 0 24 24" fill="currentColor" aria-hidden="true"><path d="M12 2 2 7l10 5 10-5-10-5zM2 17l10 5 10-5M2 12l10 5 10-5"/></svg></div>"#;

const ARTICLE_PLACEHOLDER: &str = r#"<div class="article-placeholder"><svg viewBox="0 0 24 24" fill="currentColor" width="48" height="48"><path d="M14 2H6a2 2 0 0 0-2 2v16a2 2 0 0 0 2 2h12a2 2 0 0 0 2-2V8l-6-6m4 18H6V4h7v5h5v11z"/></svg></div>"#;

/// A record that can be rendered as a card.
pub trait RenderCard {
    /// Template used when the caller has no preference.
    fn default_template(&self) -> TemplateTag;

    /// Variables for rendering this record with `tag`.
    fn card_context(&self, tag: TemplateTag, templates: &TemplateRegistry) -> TemplateContext;
}

/// Render a record with a template. A failing template renders nothing.
pub fn render_card<R: RenderCard + ?Sized>(
    record: &R,
    tag: TemplateTag,
    templates: &TemplateRegistry,
) -> String {
    let context = record.card_context(tag, templates);
    match templates.render(tag, &context) {
        Ok(html) => html,
        Err(e) => {
            warn!(template = %tag, error = %e, "card template failed, rendering nothing");
            String::new()
        }
    }
}

/// Render up to [`MAX_BADGES`] tags as a badge list, or nothing without tags.
pub fn badge_list(tags: &[String], templates: &TemplateRegistry) -> String {
    if tags.is_empty() {
        return String::new();
    }
    let badges: String = tags
        .iter()
        .take(MAX_BADGES)
        .map(|tag| format!(r#"<span class="article-tag">{}</span>"#, escape_html(tag)))
        .collect();
    let context = TemplateContext::new().with_html("badges", badges);
    templates
        .render(TemplateTag::BadgeList, &context)
        .unwrap_or_else(|e| {
            warn!(error = %e, "badge list template failed");
            String::new()
        })
}

/// Shared card fields.
struct CardFields<'a> {
    title: &'a str,
    description: &'a str,
    body: &'a str,
    image_url: Option<&'a str>,
    href: Option<&'a str>,
    external: bool,
    order: i64,
}

fn shared_context(tag: TemplateTag, fields: &CardFields<'_>) -> TemplateContext {
    let wrapper_class = match tag {
        TemplateTag::SnsCard | TemplateTag::EcCard => "project-card",
        TemplateTag::ChannelCard => "channel-card",
        TemplateTag::ArticleCard => "article-card",
        _ => "card-link",
    };
    let (wrapper_open, wrapper_close) = wrapper_tags(fields.href, wrapper_class, fields.external);
    let hover = if fields.body.is_empty() {
        fields.description
    } else {
        fields.body
    };
    let body = if fields.description.is_empty() {
        fields.body
    } else {
        fields.description
    };

    let mut context = TemplateContext::new()
        .with_text("tag", tag.as_str())
        .with_text("title", fields.title)
        .with_text("description", fields.description)
        .with_text("body", body)
        .with_text("hover", hover)
        .with_html("wrapper_open", wrapper_open)
        .with_html("wrapper_close", wrapper_close)
        .with_html("image_html", image_html(tag, fields.image_url, fields.title));

    if let Some(href) = fields.href.and_then(safe_href) {
        context.insert_text("href", href);
    }
    if fields.order != 0 {
        context.insert_html("order_style", format!(r#" style="order: {}""#, fields.order));
    }
    context
}

fn image_html(tag: TemplateTag, url: Option<&str>, title: &str) -> String {
    match (tag, url) {
        (TemplateTag::BrandItem, Some(url)) => img_tag(url, title, Some("brand-image")),
        (TemplateTag::BrandItem, None) => format!(
            r#"<div class="logo-preview"><span class="logo-text">{}</span></div>"#,
            escape_html(title)
        ),
        (TemplateTag::ArticleCard, Some(url)) => {
            format!(r#"<div class="article-image">{}</div>"#, img_tag(url, title, None))
        }
        (TemplateTag::ArticleListing, None) => ARTICLE_PLACEHOLDER.to_string(),
        (TemplateTag::Default, None) => r#"<div class="image-placeholder"></div>"#.to_string(),
        (TemplateTag::SnsCard | TemplateTag::EcCard | TemplateTag::ProjectCard, None) => {
            ICON_PLACEHOLDER.to_string()
        }
        (_, Some(url)) => img_tag(url, title, None),
        (_, None) => String::new(),
    }
}

/// Link target for an article card.
pub fn article_href(article: &Article) -> String {
    match (&article.kind, &article.cta_link) {
        (ArticleKind::Note, Some(link)) => link.clone(),
        (kind, _) => format!("{}-article.html?id={}", kind.as_str(), article.id),
    }
}

fn article_stats(article: &Article) -> String {
    let mut stats = format!(
        r#"<span class="article-stat">読了時間: {}分</span>"#,
        article.read_time
    );
    if article.product_count > 0 {
        stats.push_str(&format!(
            r#"<span class="article-stat">商品数: {}</span>"#,
            article.product_count
        ));
    }
    if article.kind == ArticleKind::Affiling {
        stats.push_str(r#"<span class="affiliate-badge">アフィリエイト</span>"#);
    }
    stats
}

impl RenderCard for Article {
    fn default_template(&self) -> TemplateTag {
        TemplateTag::ArticleListing
    }

    fn card_context(&self, tag: TemplateTag, templates: &TemplateRegistry) -> TemplateContext {
        let href = article_href(self);
        let external = self.kind == ArticleKind::Note && self.cta_link.is_some();
        let mut context = shared_context(
            tag,
            &CardFields {
                title: &self.title,
                description: &self.excerpt,
                body: &self.excerpt,
                image_url: self.image_url.as_deref(),
                href: Some(&href),
                external,
                order: self.order,
            },
        );

        let excerpt_html = if self.excerpt_html.is_empty() {
            escape_html(&self.excerpt)
        } else {
            self.excerpt_html.clone()
        };

        context.insert_text("id", &self.id);
        context.insert_text("category", self.category_key());
        context.insert_text("category_label", self.category.label());
        context.insert_text("date", format_date(&self.date));
        context.insert_html("excerpt_html", excerpt_html);
        context.insert_html("stats_html", article_stats(self));
        context.insert_html("content_html", render_content(&self.content));

        let tags_html = badge_list(&self.tags, templates);
        if !tags_html.is_empty() {
            context.insert_html("tags_html", tags_html);
        }

        if let Some(link) = self.cta_link.as_deref().and_then(safe_href) {
            let label = self.cta_label.as_deref().unwrap_or("記事を読む");
            context.insert_html(
                "cta_html",
                format!(
                    r#"<a class="load-more-button" href="{}" target="_blank" rel="noopener noreferrer"><span class="button-text">{}</span><div class="button-bg"></div></a>"#,
                    escape_html(link),
                    escape_html(label)
                ),
            );
        }

        context
    }
}

impl RenderCard for Project {
    fn default_template(&self) -> TemplateTag {
        TemplateTag::ProjectCard
    }

    fn card_context(&self, tag: TemplateTag, _templates: &TemplateRegistry) -> TemplateContext {
        let description = if self.description.is_empty() {
            MISSING_DESCRIPTION
        } else {
            &self.description
        };
        let mut context = shared_context(
            tag,
            &CardFields {
                title: &self.title,
                description,
                body: description,
                image_url: self.image_url.as_deref(),
                href: self.link.as_deref(),
                external: true,
                order: self.order,
            },
        );

        context.insert_text("id", &self.id);
        context.insert_text("category", self.project_type.key());
        context.insert_text("category_label", self.project_type.label());
        context.insert_text("date", format_date(&self.date));
        context.insert_text("status", &self.status);
        context.insert_html("content_html", render_content(&self.content));
        if let Some(link) = self.link.as_deref().and_then(safe_href) {
            context.insert_html(
                "link_html",
                format!(
                    r#"<a class="card-link" href="{}" target="_blank" rel="noopener noreferrer">詳細を見る</a>"#,
                    escape_html(link)
                ),
            );
        } else {
            context.insert_text("href", "#");
        }

        context
    }
}

impl RenderCard for GridElement {
    fn default_template(&self) -> TemplateTag {
        TemplateTag::Default
    }

    fn card_context(&self, tag: TemplateTag, _templates: &TemplateRegistry) -> TemplateContext {
        let mut context = shared_context(
            tag,
            &CardFields {
                title: &self.title,
                description: &self.description,
                body: &self.content,
                image_url: self.image_url.as_deref(),
                href: self.href.as_deref(),
                external: false,
                order: self.order,
            },
        );

        context.insert_text("id", &self.id);
        context.insert_text("status", &self.status);
        if self.status == IN_DEVELOPMENT {
            context.insert_html(
                "status_html",
                format!(
                    r#"<div class="dev-status"><span class="status-badge">{IN_DEVELOPMENT}</span></div>"#
                ),
            );
        }

        context
    }
}
