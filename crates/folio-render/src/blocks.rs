//! Block sequence rendering.
//!
//! Consecutive list items are grouped into a single `<ul>` or `<ol>`. Unsupported
//! blocks render as nothing and never interrupt their siblings.

use folio_core::{
    block::{Block, Content},
    property::plain_text,
};
use tracing::trace;

use crate::html::{escape_html, render_rich_text};

/// Render a record body.
pub fn render_content(content: &Content) -> String {
    match content {
        Content::Html(html) => html.clone(),
        Content::Blocks(blocks) => render_blocks(blocks),
    }
}

/// Render a block sequence.
pub fn render_blocks(blocks: &[Block]) -> String {
    let mut html = String::new();
    let mut open_list: Option<&'static str> = None;

    for block in blocks {
        let list = match block {
            Block::BulletedListItem { .. } => Some("ul"),
            Block::NumberedListItem { .. } => Some("ol"),
            _ => None,
        };

        if open_list != list {
            if let Some(tag) = open_list {
                html.push_str(&format!("</{tag}>"));
            }
            if let Some(tag) = list {
                html.push_str(&format!("<{tag}>"));
            }
            open_list = list;
        }

        html.push_str(&render_block(block));
    }

    if let Some(tag) = open_list {
        html.push_str(&format!("</{tag}>"));
    }

    html
}

/// Render a single block.
pub fn render_block(block: &Block) -> String {
    match block {
        Block::Paragraph { text } => format!("<p>{}</p>", render_rich_text(text)),
        Block::Heading { level, text } => {
            let level = (*level).clamp(1, 3);
            format!("<h{level}>{}</h{level}>", render_rich_text(text))
        }
        Block::BulletedListItem { text } | Block::NumberedListItem { text } => {
            format!("<li>{}</li>", render_rich_text(text))
        }
        Block::Quote { text } => format!(
            r#"<blockquote class="notion-quote">{}</blockquote>"#,
            render_rich_text(text)
        ),
        Block::Code { language, code } => format!(
            r#"<pre><code class="language-{}">{}</code></pre>"#,
            escape_html(language),
            escape_html(code)
        ),
        Block::Image { url, caption } => {
            let Some(url) = url else {
                return String::new();
            };
            let caption_html = render_rich_text(caption);
            let figcaption = if caption_html.is_empty() {
                String::new()
            } else {
                format!("<figcaption>{caption_html}</figcaption>")
            };
            format!(
                r#"<figure class="notion-image"><img src="{}" alt="{}" loading="lazy">{figcaption}</figure>"#,
                escape_html(url),
                escape_html(&plain_text(caption))
            )
        }
        Block::Divider => r#"<hr class="notion-divider">"#.to_string(),
        Block::Toggle { summary, children } => format!(
            r#"<details class="notion-toggle"><summary>{}</summary>{}</details>"#,
            render_rich_text(summary),
            render_blocks(children)
        ),
        Block::Unsupported { kind } => {
            trace!(kind = %kind, "skipping unsupported block");
            String::new()
        }
    }
}
