//! Inline HTML for rich-text fragments.

use crate::property::{FragmentKind, MentionKind, RichTextFragment};

/// Escape HTML special characters.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Schemes a rendered link may use.
const SAFE_SCHEMES: [&str; 4] = ["http", "https", "mailto", "tel"];

/// `href` if it is safe to emit in a link or attribute.
///
/// Relative references and `http`, `https`, `mailto` and `tel` URLs pass; any other
/// scheme (`javascript:`, `data:`, `vbscript:`) yields `None`. Whitespace and control
/// characters are ignored when reading the scheme, as browsers do.
pub fn safe_href(href: &str) -> Option<&str> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    let compact: String = href
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect();
    match compact.split_once(':') {
        Some((scheme, _)) if !scheme.contains(['/', '?', '#']) => SAFE_SCHEMES
            .iter()
            .any(|safe| scheme.eq_ignore_ascii_case(safe))
            .then_some(href),
        _ => Some(href),
    }
}

/// Render a sequence of fragments to inline HTML.
pub fn render_rich_text(fragments: &[RichTextFragment]) -> String {
    fragments.iter().map(render_fragment).collect()
}

/// Render one fragment.
///
/// Text is escaped first, then wrapped in annotation order (bold, italic,
/// strikethrough, underline, code), then in a link, then in a colour span.
pub fn render_fragment(fragment: &RichTextFragment) -> String {
    match &fragment.kind {
        FragmentKind::Mention(MentionKind::Page) => {
            let text = non_empty_or(&fragment.text, "Page");
            format!(r##"<a href="#" class="notion-page-mention">{}</a>"##, escape_html(text))
        }
        FragmentKind::Mention(MentionKind::User) => {
            let text = non_empty_or(&fragment.text, "User");
            format!(r#"<span class="notion-user-mention">@{}</span>"#, escape_html(text))
        }
        FragmentKind::Equation(expression) => {
            format!(r#"<span class="notion-equation">{}</span>"#, escape_html(expression))
        }
        FragmentKind::Mention(MentionKind::Other) | FragmentKind::Text => annotated(fragment),
    }
}

fn annotated(fragment: &RichTextFragment) -> String {
    let ann = &fragment.annotations;
    let mut html = escape_html(&fragment.text);

    for (on, tag) in [
        (ann.bold, "strong"),
        (ann.italic, "em"),
        (ann.strikethrough, "s"),
        (ann.underline, "u"),
        (ann.code, "code"),
    ] {
        if on {
            html = format!("<{tag}>{html}</{tag}>");
        }
    }

    if let Some(href) = fragment.href.as_deref().and_then(safe_href) {
        html = format!(
            r#"<a href="{}" target="_blank" rel="noopener noreferrer">{html}</a>"#,
            escape_html(href)
        );
    }

    if let Some(color) = &ann.color {
        html = format!(r#"<span class="notion-color-{}">{html}</span>"#, escape_html(color));
    }

    html
}

fn non_empty_or<'a>(text: &'a str, fallback: &'a str) -> &'a str {
    if text.is_empty() { fallback } else { text }
}
