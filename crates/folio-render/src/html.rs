//! Small HTML helpers shared by the renderers.

use chrono::{DateTime, Utc};
pub use folio_core::rich_text::{escape_html, render_fragment, render_rich_text, safe_href};

/// Display format for dates (`YYYY.MM.DD`).
pub const DATE_FORMAT: &str = "%Y.%m.%d";

/// Format a date for display.
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// A lazily loaded `<img>` tag with escaped attributes.
pub fn img_tag(src: &str, alt: &str, class: Option<&str>) -> String {
    let class_attr = class
        .map(|c| format!(r#" class="{}""#, escape_html(c)))
        .unwrap_or_default();
    format!(
        r#"<img src="{}" alt="{}"{class_attr} loading="lazy">"#,
        escape_html(src),
        escape_html(alt)
    )
}

/// Opening and closing tags for an optional link wrapper.
///
/// With a safe `href` the wrapper is an anchor, otherwise a `div`.
pub fn wrapper_tags(href: Option<&str>, class: &str, external: bool) -> (String, String) {
    match href.and_then(safe_href) {
        Some(href) => {
            let target = if external {
                r#" target="_blank" rel="noopener noreferrer""#
            } else {
                ""
            };
            (
                format!(
                    r#"<a href="{}" class="{}"{target}>"#,
                    escape_html(href),
                    escape_html(class)
                ),
                "</a>".to_string(),
            )
        }
        None => (
            format!(r#"<div class="{}">"#, escape_html(class)),
            "</div>".to_string(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_format_date() {
        let date = Utc.with_ymd_and_hms(2024, 3, 7, 15, 0, 0).unwrap();
        assert_eq!(format_date(&date), "2024.03.07");
    }

    #[test]
    fn test_img_tag_escapes() {
        assert_eq!(
            img_tag("/a.png?x=1&y=2", "\"quoted\"", None),
            r#"<img src="/a.png?x=1&amp;y=2" alt="&quot;quoted&quot;" loading="lazy">"#
        );
        assert!(img_tag("/b.png", "", Some("brand-image")).contains(r#"class="brand-image""#));
    }

    #[test]
    fn test_wrapper_tags() {
        let (open, close) = wrapper_tags(Some("https://x.example"), "project-card", true);
        assert!(open.starts_with(r#"<a href="https://x.example" class="project-card""#));
        assert!(open.contains("noopener"));
        assert_eq!(close, "</a>");

        let (open, close) = wrapper_tags(None, "project-card", true);
        assert_eq!(open, r#"<div class="project-card">"#);
        assert_eq!(close, "</div>");

        let (open, _) = wrapper_tags(Some("javascript:alert(1)"), "project-card", true);
        assert_eq!(open, r#"<div class="project-card">"#);
    }
}
