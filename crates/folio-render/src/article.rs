//! Article pages.
//!
//! Everything around a single article body: heading anchors and the table of
//! contents built from them, related and sidebar lists, and the head metadata
//! (title, description, Open Graph and Twitter tags, canonical URL and JSON-LD).

use folio_core::{
    Article, Config, Record,
    block::{Block, Content},
    property::plain_text,
};
use serde_json::{Value, json};

use crate::{
    blocks::render_blocks,
    cards::render_card,
    html::{escape_html, format_date, render_rich_text},
    template::{TemplateRegistry, TemplateTag},
};

/// Related articles shown under a body.
pub const RELATED_LIMIT: usize = 4;

/// Entries per sidebar list.
pub const SIDEBAR_LIMIT: usize = 5;

/// Characters kept when a description falls back to the body text.
pub const DESCRIPTION_CHARS: usize = 150;

const ANCHOR_TITLE: &str = "この見出しへのリンク";

/// Find a published article by id or slug.
pub fn find_published<'a>(articles: &'a [Article], key: &str) -> Option<&'a Article> {
    articles
        .iter()
        .find(|a| a.published && (a.id() == key || (!a.slug.is_empty() && a.slug == key)))
}

/// Page path of an article, keyed by slug when it has one.
pub fn article_page_path(article: &Article) -> String {
    let key = if article.slug.is_empty() {
        &article.id
    } else {
        &article.slug
    };
    format!("{}-article.html?id={key}", article.kind.as_str())
}

/// Published articles sharing `current`'s category, newest first.
pub fn related_articles<'a>(
    articles: &'a [Article],
    current: &Article,
    limit: usize,
) -> Vec<&'a Article> {
    let mut related: Vec<&Article> = articles
        .iter()
        .filter(|a| a.published && a.id != current.id && a.category == current.category)
        .collect();
    related.sort_by(|a, b| b.date.cmp(&a.date));
    related.truncate(limit);
    related
}

/// Published articles, newest first.
pub fn recent_articles(articles: &[Article], limit: usize) -> Vec<&Article> {
    let mut recent: Vec<&Article> = articles.iter().filter(|a| a.published).collect();
    recent.sort_by(|a, b| b.date.cmp(&a.date));
    recent.truncate(limit);
    recent
}

/// Render related articles as cards; empty when there are none.
pub fn render_related(articles: &[&Article], templates: &TemplateRegistry) -> String {
    articles
        .iter()
        .map(|a| render_card(*a, TemplateTag::ArticleCard, templates))
        .collect()
}

/// Sidebar article lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidebarList {
    /// Ranked by recency until view counts exist; shows read time.
    Popular,
    Recent,
}

impl SidebarList {
    fn class(self) -> &'static str {
        match self {
            Self::Popular => "popular",
            Self::Recent => "recent",
        }
    }
}

/// Render sidebar entries.
pub fn render_sidebar(articles: &[&Article], list: SidebarList) -> String {
    let class = list.class();
    articles
        .iter()
        .map(|a| {
            let read_time = match list {
                SidebarList::Popular => {
                    format!(r#"<span class="article-read-time">{}分</span>"#, a.read_time)
                }
                SidebarList::Recent => String::new(),
            };
            format!(
                r#"<a href="{href}" class="{class}-article-item"><div class="{class}-article-content"><h4 class="{class}-article-title">{title}</h4><div class="{class}-article-meta"><span class="article-date">{date}</span>{read_time}</div></div></a>"#,
                href = escape_html(&article_page_path(a)),
                title = escape_html(&a.title),
                date = format_date(&a.date),
            )
        })
        .collect()
}

/// A table-of-contents entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocEntry {
    pub level: u8,
    pub anchor: String,
    pub text: String,
}

/// An article body with anchored headings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleBody {
    pub html: String,
    pub toc: Vec<TocEntry>,
}

/// Render a body, giving every `h2` and `h3` an id and an anchor link.
///
/// Headings are numbered `heading-<n>` in document order; an id already present
/// in markup is kept.
pub fn render_article_body(content: &Content) -> ArticleBody {
    match content {
        Content::Blocks(blocks) => anchor_block_headings(blocks),
        Content::Html(html) => anchor_html_headings(html),
    }
}

fn anchor_link(anchor: &str) -> String {
    format!(
        r##"<a href="#{anchor}" class="heading-anchor" title="{ANCHOR_TITLE}" aria-hidden="true">#</a>"##,
        anchor = escape_html(anchor)
    )
}

fn anchor_block_headings(blocks: &[Block]) -> ArticleBody {
    let mut body = ArticleBody::default();
    let mut run_start = 0;

    for (i, block) in blocks.iter().enumerate() {
        let Block::Heading { level, text } = block else {
            continue;
        };
        let level = (*level).clamp(1, 3);
        if level < 2 {
            continue;
        }

        body.html.push_str(&render_blocks(&blocks[run_start..i]));
        run_start = i + 1;

        let anchor = format!("heading-{}", body.toc.len());
        body.html.push_str(&format!(
            r#"<h{level} id="{anchor}">{}{}</h{level}>"#,
            render_rich_text(text),
            anchor_link(&anchor)
        ));
        body.toc.push(TocEntry {
            level,
            anchor,
            text: plain_text(text),
        });
    }

    body.html.push_str(&render_blocks(&blocks[run_start..]));
    body
}

/// Position and level of the next `<h2`/`<h3` opening tag at or after `from`.
fn next_heading(lower: &str, from: usize) -> Option<(usize, u8)> {
    let bytes = lower.as_bytes();
    let mut at = from;
    while let Some(offset) = lower[at..].find("<h") {
        let pos = at + offset;
        let level = bytes.get(pos + 2).copied();
        let after = bytes.get(pos + 3).copied();
        if let (Some(level @ (b'2' | b'3')), Some(after)) = (level, after)
            && (after == b'>' || after.is_ascii_whitespace())
        {
            return Some((pos, level - b'0'));
        }
        at = pos + 2;
    }
    None
}

/// Value of a double-quoted `id` attribute.
fn existing_id(attrs: &str) -> Option<&str> {
    let lower = attrs.to_ascii_lowercase();
    let start = [" id=\"", "\tid=\"", "\nid=\""]
        .iter()
        .filter_map(|p| lower.find(p).map(|i| i + p.len()))
        .min()?;
    let len = attrs[start..].find('"')?;
    Some(&attrs[start..start + len]).filter(|id| !id.is_empty())
}

fn anchor_html_headings(html: &str) -> ArticleBody {
    // ASCII lowercasing keeps byte offsets aligned with `html`.
    let lower = html.to_ascii_lowercase();
    let mut body = ArticleBody {
        html: String::with_capacity(html.len()),
        toc: Vec::new(),
    };
    let mut cursor = 0;

    while let Some((start, level)) = next_heading(&lower, cursor) {
        let Some(open_end) = lower[start..].find('>').map(|i| start + i) else {
            break;
        };
        let close_tag = format!("</h{level}>");
        let Some(close) = lower[open_end..].find(&close_tag).map(|i| open_end + i) else {
            break;
        };

        let attrs = &html[start + 3..open_end];
        let index = body.toc.len();
        let (anchor, inserted) = match existing_id(attrs) {
            Some(id) => (id.to_string(), false),
            None => (format!("heading-{index}"), true),
        };

        body.html.push_str(&html[cursor..start + 3]);
        if inserted {
            body.html.push_str(&format!(r#" id="{anchor}""#));
        }
        body.html.push_str(&html[start + 3..close]);
        body.html.push_str(&anchor_link(&anchor));
        body.html.push_str(&close_tag);

        body.toc.push(TocEntry {
            level,
            anchor,
            text: strip_tags(&html[open_end + 1..close]).trim().to_string(),
        });
        cursor = close + close_tag.len();
    }

    body.html.push_str(&html[cursor..]);
    body
}

/// Text content of markup: tags dropped, basic entities decoded.
pub fn strip_tags(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// Render the table of contents; empty without entries.
pub fn render_toc(toc: &[TocEntry]) -> String {
    if toc.is_empty() {
        return String::new();
    }
    let links: String = toc
        .iter()
        .map(|entry| {
            format!(
                r##"<a href="#{anchor}" class="toc-link toc-h{level}">{text}</a>"##,
                anchor = escape_html(&entry.anchor),
                level = entry.level,
                text = escape_html(&entry.text)
            )
        })
        .collect();
    format!(r#"<nav class="toc-nav">{links}</nav>"#)
}

/// A `<meta>` tag keyed by `name` or `property`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaTag {
    pub attribute: &'static str,
    pub key: &'static str,
    pub content: String,
}

impl MetaTag {
    fn name(key: &'static str, content: &str) -> Self {
        Self {
            attribute: "name",
            key,
            content: content.to_string(),
        }
    }

    fn property(key: &'static str, content: &str) -> Self {
        Self {
            attribute: "property",
            key,
            content: content.to_string(),
        }
    }

    /// Selector matching this tag in a document head.
    pub fn selector(&self) -> String {
        format!(r#"meta[{}="{}"]"#, self.attribute, self.key)
    }

    pub fn html(&self) -> String {
        format!(
            r#"<meta {}="{}" content="{}">"#,
            self.attribute,
            self.key,
            escape_html(&self.content)
        )
    }
}

/// Head metadata for an article page.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleMeta {
    pub title: String,
    pub description: String,
    pub url: String,
    pub image: Option<String>,
    pub site_name: String,
    pub structured_data: Value,
}

impl ArticleMeta {
    pub fn new(article: &Article, config: &Config) -> Self {
        let site_name = config.site.title.clone();
        let title = format!("{} | {site_name}", article.title);
        let description = description(article);
        let url = config.url_for(&article_page_path(article));
        let image = article.image_url.clone().filter(|u| !u.is_empty());
        let published = article.date.to_rfc3339();
        let listing_url = config.url_for(&format!("{}.html", article.kind.as_str()));

        let structured_data = json!([
            {
                "@context": "https://schema.org",
                "@type": "Article",
                "headline": title,
                "description": description,
                "image": image,
                "datePublished": published,
                "dateModified": published,
                "articleSection": article.category.label(),
                "keywords": article.tags.join(","),
                "author": {"@type": "Organization", "name": site_name},
                "publisher": {"@type": "Organization", "name": site_name},
                "mainEntityOfPage": url,
            },
            {
                "@context": "https://schema.org",
                "@type": "BreadcrumbList",
                "itemListElement": [
                    {"@type": "ListItem", "position": 1, "name": "Home", "item": config.url_for("")},
                    {
                        "@type": "ListItem",
                        "position": 2,
                        "name": article.category.label(),
                        "item": format!("{listing_url}#{}", article.category.key()),
                    },
                    {"@type": "ListItem", "position": 3, "name": article.title, "item": url},
                ]
            }
        ]);

        Self {
            title,
            description,
            url,
            image,
            site_name,
            structured_data,
        }
    }

    /// Description, Open Graph and Twitter tags.
    pub fn meta_tags(&self) -> Vec<MetaTag> {
        let mut tags = vec![
            MetaTag::name("description", &self.description),
            MetaTag::property("og:title", &self.title),
            MetaTag::property("og:description", &self.description),
            MetaTag::property("og:url", &self.url),
            MetaTag::property("og:type", "article"),
            MetaTag::property("og:site_name", &self.site_name),
            MetaTag::name("twitter:card", "summary_large_image"),
            MetaTag::name("twitter:title", &self.title),
            MetaTag::name("twitter:description", &self.description),
        ];
        if let Some(image) = &self.image {
            tags.push(MetaTag::property("og:image", image));
            tags.push(MetaTag::name("twitter:image", image));
        }
        tags
    }

    /// JSON-LD text, safe to place inside a `<script>` element.
    pub fn json_ld(&self) -> String {
        self.structured_data.to_string().replace("</", r"<\/")
    }

    /// Head markup for statically rendered pages.
    pub fn head_html(&self) -> String {
        let mut head = format!("<title>{}</title>", escape_html(&self.title));
        for tag in self.meta_tags() {
            head.push_str(&tag.html());
        }
        head.push_str(&format!(
            r#"<link rel="canonical" href="{}">"#,
            escape_html(&self.url)
        ));
        head.push_str(&format!(
            r#"<script type="application/ld+json" id="article-json-ld">{}</script>"#,
            self.json_ld()
        ));
        head
    }
}

/// Meta description, then excerpt, then the start of the body text.
fn description(article: &Article) -> String {
    let own = article.meta_description.trim();
    if !own.is_empty() {
        return own.to_string();
    }
    let excerpt = article.excerpt.trim();
    if !excerpt.is_empty() {
        return excerpt.to_string();
    }
    let text = strip_tags(&render_article_body(&article.content).html);
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    match text.char_indices().nth(DESCRIPTION_CHARS) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text,
    }
}

/// A complete static article document body: header, contents, body and related
/// cards.
pub fn render_article_page(
    article: &Article,
    articles: &[Article],
    templates: &TemplateRegistry,
) -> String {
    let body = render_article_body(&article.content);
    let body_html = if body.html.is_empty() {
        format!("<p>{}</p>", escape_html(&article.excerpt))
    } else {
        body.html
    };
    let related = related_articles(articles, article, RELATED_LIMIT);

    let mut page = format!(
        r#"<article class="article-detail"><header class="article-header"><span class="article-category">{}</span><h1 class="article-title">{}</h1><time class="article-date">{}</time></header>"#,
        article.category.label(),
        escape_html(&article.title),
        format_date(&article.date)
    );
    page.push_str(&render_toc(&body.toc));
    page.push_str(&format!(
        r#"<div class="article-content" id="article-body">{body_html}</div></article>"#
    ));
    if !related.is_empty() {
        page.push_str(&format!(
            r#"<section class="related-articles"><div class="related-grid">{}</div></section>"#,
            render_related(&related, templates)
        ));
    }
    page
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use folio_core::{ArticleCategory, ArticleKind, block::decode_blocks};
    use serde_json::json;

    use super::*;

    fn article(id: &str, category: ArticleCategory, day: u32) -> Article {
        Article {
            id: id.to_string(),
            kind: ArticleKind::Affiling,
            title: format!("Title {id}"),
            slug: String::new(),
            category,
            excerpt: String::new(),
            excerpt_html: String::new(),
            content: Content::default(),
            date: Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(),
            date_defaulted: false,
            image_url: None,
            published: true,
            read_time: 3,
            product_count: 0,
            meta_description: String::new(),
            tags: vec![],
            order: 0,
            cta_link: None,
            cta_label: None,
        }
    }

    fn config() -> Config {
        let mut config = Config::default();
        config.site.title = "Affiling".to_string();
        config.site.base_url = "https://example.com/".to_string();
        config
    }

    #[test]
    fn test_find_published_by_id_or_slug() {
        let mut live = article("a1", ArticleCategory::Review, 1);
        live.slug = "best-mice".to_string();
        let mut draft = article("a2", ArticleCategory::Review, 2);
        draft.published = false;
        let articles = vec![live, draft];

        assert_eq!(find_published(&articles, "a1").map(|a| a.id.as_str()), Some("a1"));
        assert_eq!(find_published(&articles, "best-mice").map(|a| a.id.as_str()), Some("a1"));
        assert!(find_published(&articles, "a2").is_none());
        assert!(find_published(&articles, "").is_none());
    }

    #[test]
    fn test_related_same_category_newest_first() {
        let current = article("c", ArticleCategory::Review, 10);
        let mut draft = article("d", ArticleCategory::Review, 20);
        draft.published = false;
        let articles: Vec<Article> = (1..=6)
            .map(|day| article(&format!("r{day}"), ArticleCategory::Review, day))
            .chain([
                current.clone(),
                draft,
                article("g", ArticleCategory::Guide, 30),
            ])
            .collect();

        let ids: Vec<&str> = related_articles(&articles, &current, RELATED_LIMIT)
            .iter()
            .map(|a| a.id.as_str())
            .collect();
        assert_eq!(ids, ["r6", "r5", "r4", "r3"]);
    }

    #[test]
    fn test_sidebar_lists() {
        let mut articles = vec![
            article("old", ArticleCategory::Review, 1),
            article("new", ArticleCategory::Guide, 9),
        ];
        articles[1].title = "A & B".to_string();
        let recent = recent_articles(&articles, SIDEBAR_LIMIT);
        assert_eq!(recent[0].id, "new");

        let popular = render_sidebar(&recent, SidebarList::Popular);
        assert!(popular.starts_with(
            r#"<a href="affiling-article.html?id=new" class="popular-article-item">"#
        ));
        assert!(popular.contains("A &amp; B"));
        assert!(popular.contains(r#"<span class="article-read-time">3分</span>"#));

        let recent_html = render_sidebar(&recent, SidebarList::Recent);
        assert!(recent_html.contains(r#"class="recent-article-title""#));
        assert!(!recent_html.contains("article-read-time"));
    }

    #[test]
    fn test_block_headings_get_anchors() {
        let blocks = decode_blocks(&json!([
            {"type": "heading_1", "heading_1": {"rich_text": [{"plain_text": "Top"}]}},
            {"type": "bulleted_list_item", "bulleted_list_item": {"rich_text": [{"plain_text": "a"}]}},
            {"type": "heading_2", "heading_2": {"rich_text": [{"plain_text": "Setup"}]}},
            {"type": "paragraph", "paragraph": {"rich_text": [{"plain_text": "Body"}]}},
            {"type": "heading_3", "heading_3": {"rich_text": [{"plain_text": "Tips & tricks"}]}}
        ]));
        let body = render_article_body(&Content::Blocks(blocks));

        assert!(body.html.starts_with("<h1>Top</h1><ul><li>a</li></ul><h2 id=\"heading-0\">Setup<a href=\"#heading-0\""));
        assert!(body.html.contains(r#"<h3 id="heading-1">Tips &amp; tricks<a"#));
        assert_eq!(
            body.toc,
            vec![
                TocEntry { level: 2, anchor: "heading-0".into(), text: "Setup".into() },
                TocEntry { level: 3, anchor: "heading-1".into(), text: "Tips & tricks".into() },
            ]
        );
        assert_eq!(
            render_toc(&body.toc),
            r##"<nav class="toc-nav"><a href="#heading-0" class="toc-link toc-h2">Setup</a><a href="#heading-1" class="toc-link toc-h3">Tips &amp; tricks</a></nav>"##
        );
    }

    #[test]
    fn test_markup_headings_get_anchors() {
        let html = r#"<p>x</p><H2 class="t">One <em>&amp;</em> two</H2><header>h</header><h3 id="keep">Three</h3>"#;
        let body = render_article_body(&Content::Html(html.to_string()));

        assert!(body.html.starts_with(r##"<p>x</p><H2 id="heading-0" class="t">One <em>&amp;</em> two<a href="#heading-0""##));
        assert!(body.html.contains("</h2><header>h</header><h3 id=\"keep\">Three<a href=\"#keep\""));
        assert!(body.html.ends_with("</h3>"));
        assert_eq!(body.toc[0].text, "One & two");
        assert_eq!(body.toc[1].anchor, "keep");
        assert!(render_toc(&[]).is_empty());
    }

    #[test]
    fn test_unclosed_heading_is_left_alone() {
        let html = "<h2>never closed";
        let body = render_article_body(&Content::Html(html.to_string()));
        assert_eq!(body.html, html);
        assert!(body.toc.is_empty());
    }

    #[test]
    fn test_description_fallbacks() {
        let config = config();
        let mut a = article("a1", ArticleCategory::Review, 1);
        a.content = Content::Html(format!("<p>{}</p>", "x".repeat(200)));
        let meta = ArticleMeta::new(&a, &config);
        assert_eq!(meta.description, format!("{}…", "x".repeat(DESCRIPTION_CHARS)));

        a.excerpt = "Excerpt".to_string();
        assert_eq!(ArticleMeta::new(&a, &config).description, "Excerpt");

        a.meta_description = "Meta".to_string();
        assert_eq!(ArticleMeta::new(&a, &config).description, "Meta");
    }

    #[test]
    fn test_meta_uses_slug_and_site_title() {
        let mut a = article("a1", ArticleCategory::Review, 1);
        a.slug = "best-mice".to_string();
        a.title = "Mice </script>".to_string();
        a.image_url = Some("https://cdn.example.com/m.png".to_string());
        let meta = ArticleMeta::new(&a, &config());

        assert_eq!(meta.title, "Mice </script> | Affiling");
        assert_eq!(meta.url, "https://example.com/affiling-article.html?id=best-mice");
        assert_eq!(meta.structured_data[0]["@type"], "Article");
        assert_eq!(meta.structured_data[0]["mainEntityOfPage"], meta.url.as_str());
        assert_eq!(
            meta.structured_data[1]["itemListElement"][1]["item"],
            "https://example.com/affiling.html#review"
        );
        assert!(meta.meta_tags().iter().any(|t| t.key == "og:image"));

        let head = meta.head_html();
        assert!(head.starts_with("<title>Mice &lt;/script&gt; | Affiling</title>"));
        assert!(head.contains(r#"<meta property="og:type" content="article">"#));
        assert!(head.contains(r#"<link rel="canonical" href="https://example.com/affiling-article.html?id=best-mice">"#));
        assert!(!meta.json_ld().contains("</script>"));
    }

    #[test]
    fn test_article_page_includes_related() {
        let current = article("c", ArticleCategory::Review, 2);
        let other = article("o", ArticleCategory::Review, 1);
        let articles = vec![current.clone(), other];

        let page = render_article_page(&current, &articles, &TemplateRegistry::new());
        assert!(page.contains(r#"<div class="article-content" id="article-body">"#));
        assert!(page.contains(r#"<section class="related-articles">"#));
        assert!(page.contains("Title o"));
        assert!(!page.contains("toc-nav"));
    }
}
