//! Article page head updates.

use folio_render::ArticleMeta;
use tracing::debug;

use crate::{
    dom::{RenderTarget, TargetError},
    site::ApplySummary,
};

/// Script element holding the article's JSON-LD.
pub const STRUCTURED_DATA_SELECTOR: &str = "#article-json-ld";

/// Write an article's title, meta tags, canonical link and structured data into
/// the elements already present in the head. Missing elements are skipped.
pub fn apply_article_meta(meta: &ArticleMeta, target: &mut dyn RenderTarget) -> ApplySummary {
    let mut summary = ApplySummary::default();
    let mut record = |selector: &str, result: Result<(), TargetError>| match result {
        Ok(()) => summary.applied += 1,
        Err(e) => {
            debug!(selector, error = %e, "head element missing, skipping");
            summary.skipped += 1;
        }
    };

    record("title", target.set_text("title", &meta.title));
    for tag in meta.meta_tags() {
        let selector = tag.selector();
        let result = target.set_attribute(&selector, "content", &tag.content);
        record(&selector, result);
    }
    let canonical = r#"link[rel="canonical"]"#;
    record(canonical, target.set_attribute(canonical, "href", &meta.url));
    record(
        STRUCTURED_DATA_SELECTOR,
        target.set_text(STRUCTURED_DATA_SELECTOR, &meta.json_ld()),
    );

    summary
}

#[cfg(test)]
mod tests {
    use folio_core::{Article, ArticleKind, Config, Normalize, Normalizer, RawRecord};
    use serde_json::json;

    use super::*;
    use crate::dom::MemoryDocument;

    fn article() -> Article {
        let raws = RawRecord::from_results(&json!([
            {"id": "a1", "title": "Mice", "excerpt": "Short", "published": true, "date": "2024-05-01"}
        ]));
        Article::normalize_all(&Normalizer::new(), &raws, ArticleKind::Affiling).remove(0)
    }

    #[test]
    fn test_head_elements_are_updated() {
        let mut config = Config::default();
        config.site.title = "Affiling".to_string();
        config.site.base_url = "https://example.com".to_string();
        let meta = ArticleMeta::new(&article(), &config);

        let mut doc = MemoryDocument::new()
            .with_element("title", "title")
            .with_element(r#"meta[name="description"]"#, "meta")
            .with_element(r#"meta[property="og:title"]"#, "meta")
            .with_element(r#"link[rel="canonical"]"#, "link")
            .with_element(STRUCTURED_DATA_SELECTOR, "script");

        let summary = apply_article_meta(&meta, &mut doc);
        assert_eq!(summary.applied, 5);
        assert_eq!(summary.skipped, meta.meta_tags().len() - 2);
        assert_eq!(doc.inner_html("title"), Some("Mice | Affiling"));
        assert_eq!(doc.attribute(r#"meta[name="description"]"#, "content"), Some("Short"));
        assert_eq!(
            doc.attribute(r#"link[rel="canonical"]"#, "href"),
            Some("https://example.com/affiling-article.html?id=a1")
        );
        assert!(doc.inner_html(STRUCTURED_DATA_SELECTOR).unwrap().contains("schema.org"));
    }
}
