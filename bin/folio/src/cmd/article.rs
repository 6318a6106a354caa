//! Article command - a standalone article page with head metadata

use std::path::{Path, PathBuf};

use color_eyre::eyre::{Result, WrapErr, bail, eyre};
use folio_core::{Article, Config};
use folio_render::{
    ArticleMeta, TemplateRegistry, find_published, html::escape_html, render_article_page,
};
use folio_source::ContentSource;

use super::{content_source, load_config};
use crate::collection::{Collection, listing_records};

/// Run the article command.
///
/// Writes the page to `output`, or to stdout.
pub async fn run(
    config_path: &Path,
    collection: &str,
    key: &str,
    output: Option<&PathBuf>,
) -> Result<()> {
    tracing::info!(?config_path, collection, key, "Rendering article");

    let config = load_config(config_path)?;
    let source = content_source(&config.source)?;
    let html = render_article(source, &config, collection, key).await?;

    match output {
        Some(path) => {
            std::fs::write(path, &html)
                .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
            println!("✓ Wrote {} bytes to {}", html.len(), path.display());
        }
        None => println!("{html}"),
    }
    Ok(())
}

/// Render the published article with id or slug `key` as a full HTML document.
pub async fn render_article<S: ContentSource>(
    source: S,
    config: &Config,
    collection: &str,
    key: &str,
) -> Result<String> {
    let kind = match Collection::from_name(collection) {
        Some(Collection::Articles(kind)) => kind,
        Some(other) => bail!("{collection} holds {other}, not articles"),
        None => bail!("Unknown collection: {collection}"),
    };

    let raws = source
        .fetch(collection)
        .await
        .wrap_err_with(|| format!("Failed to fetch {collection}"))?;
    let articles: Vec<Article> = listing_records(&raws, kind);
    let article = find_published(&articles, key)
        .ok_or_else(|| eyre!("No published article '{key}' in {collection}"))?;
    tracing::debug!(id = %article.id, total = articles.len(), "article found");

    let meta = ArticleMeta::new(article, config);
    let body = render_article_page(article, &articles, &TemplateRegistry::new());
    Ok(format!(
        r#"<!DOCTYPE html><html lang="{}"><head><meta charset="utf-8">{}</head><body>{body}</body></html>"#,
        escape_html(&config.site.language),
        meta.head_html()
    ))
}

#[cfg(test)]
mod tests {
    use folio_source::JsonFileSource;

    use super::*;

    fn write_articles(dir: &Path) {
        let records = serde_json::json!([
            {"id": "r1", "slug": "first-review", "title": "First", "category": "review",
             "excerpt": "Hands-on", "published": true, "date": "2024-03-01",
             "content": [
                {"type": "heading_2", "heading_2": {"rich_text": [{"plain_text": "Setup"}]}},
                {"type": "paragraph", "paragraph": {"rich_text": [{"plain_text": "Body"}]}}
             ]},
            {"id": "r2", "title": "Second", "category": "review", "published": true, "date": "2024-03-02"},
            {"id": "g1", "title": "Guide", "category": "guide", "published": true, "date": "2024-03-03"},
            {"id": "d1", "title": "Draft", "category": "review", "published": false, "date": "2024-03-04"}
        ]);
        std::fs::write(dir.join("affiling_articles.json"), records.to_string()).unwrap();
    }

    fn config() -> Config {
        let mut config = Config::default();
        config.site.title = "Affiling".to_string();
        config.site.base_url = "https://example.com".to_string();
        config
    }

    #[tokio::test]
    async fn test_article_page_by_slug() {
        let dir = tempfile::tempdir().unwrap();
        write_articles(dir.path());

        let html = render_article(
            JsonFileSource::new(dir.path()),
            &config(),
            "affiling_articles",
            "first-review",
        )
        .await
        .unwrap();

        assert!(html.contains("<title>First | Affiling</title>"));
        assert!(html.contains(r#"<meta name="description" content="Hands-on">"#));
        assert!(html.contains(
            r#"<link rel="canonical" href="https://example.com/affiling-article.html?id=first-review">"#
        ));
        assert!(html.contains(r##"<a href="#heading-0" class="toc-link toc-h2">Setup</a>"##));
        assert!(html.contains(r#"<h2 id="heading-0">Setup"#));
        assert!(html.contains("Second"));
        assert!(!html.contains("Guide"));
        assert!(!html.contains("Draft"));
    }

    #[tokio::test]
    async fn test_drafts_and_other_collections_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_articles(dir.path());

        let draft = render_article(
            JsonFileSource::new(dir.path()),
            &config(),
            "affiling_articles",
            "d1",
        )
        .await;
        assert!(draft.is_err());

        let projects =
            render_article(JsonFileSource::new(dir.path()), &config(), "projects", "r1").await;
        assert!(projects.is_err());
    }
}
