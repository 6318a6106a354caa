//! Single-article view and article sidebar.

use folio_core::{Article, Config};
use folio_page::apply_article_meta;
use folio_render::{
    ArticleBody, ArticleMeta, RELATED_LIMIT, SIDEBAR_LIMIT, SidebarList, TemplateRegistry,
    html::{escape_html, format_date},
    recent_articles, related_articles, render_article_body, render_related, render_sidebar,
    render_toc,
};
use leptos::prelude::*;
use tracing::debug;

use crate::target::DomTarget;

/// Body with anchored headings, or the escaped excerpt when there is no body.
pub fn article_body(article: &Article) -> ArticleBody {
    let body = render_article_body(&article.content);
    if body.html.is_empty() {
        ArticleBody {
            html: format!("<p>{}</p>", escape_html(&article.excerpt)),
            toc: Vec::new(),
        }
    } else {
        body
    }
}

/// Renders one article with its contents and related articles, or a not-found
/// notice. With a `config`, the document head is updated for the article.
#[component]
pub fn ArticleDetail(
    /// Article to show.
    #[prop(into)]
    article: Signal<Option<Article>>,
    /// Articles to pick related entries from.
    #[prop(default = Signal::stored(Vec::new()), into)]
    articles: Signal<Vec<Article>>,
    /// Site configuration for head metadata.
    #[prop(optional)]
    config: Option<Config>,
    #[prop(default = TemplateRegistry::new())] templates: TemplateRegistry,
) -> impl IntoView {
    let templates = StoredValue::new(templates);
    let body = Memo::new(move |_| article.with(|a| a.as_ref().map(article_body)));

    if let Some(config) = config {
        Effect::new(move |_| {
            article.with(|a| {
                if let Some(a) = a {
                    let meta = ArticleMeta::new(a, &config);
                    let summary = apply_article_meta(&meta, &mut DomTarget::current());
                    debug!(id = %a.id, applied = summary.applied, "article head updated");
                }
            });
        });
    }

    let related = move || {
        article.with(|current| {
            let Some(current) = current else {
                return String::new();
            };
            articles.with(|all| {
                let related = related_articles(all, current, RELATED_LIMIT);
                templates.with_value(|t| render_related(&related, t))
            })
        })
    };

    view! {
      <Show
        when=move || article.with(Option::is_some)
        fallback=|| view! { <p class="article-not-found">"記事が見つかりません"</p> }
      >
        <article class="article-detail">
          <header class="article-header">
            <span class="article-category">
              {move || article.with(|a| a.as_ref().map(|a| a.category.label()).unwrap_or_default())}
            </span>
            <h1 class="article-title">
              {move || article.with(|a| a.as_ref().map(|a| a.title.clone()).unwrap_or_default())}
            </h1>
            <time class="article-date">
              {move || article.with(|a| a.as_ref().map(|a| format_date(&a.date)).unwrap_or_default())}
            </time>
          </header>
          <Show when=move || body.with(|b| b.as_ref().is_some_and(|b| !b.toc.is_empty()))>
            <aside class="article-toc" id="article-toc">
              <h2 class="toc-title">"目次"</h2>
              <div inner_html=move || body.with(|b| b.as_ref().map(|b| render_toc(&b.toc)).unwrap_or_default())></div>
            </aside>
          </Show>
          <div
            class="article-content"
            id="article-body"
            inner_html=move || body.with(|b| b.as_ref().map(|b| b.html.clone()).unwrap_or_default())
          ></div>
        </article>
        <Show when=move || !related().is_empty()>
          <section class="related-articles" id="related-articles">
            <h2 class="related-title">"関連記事"</h2>
            <div class="related-grid" id="related-grid" inner_html=related></div>
          </section>
        </Show>
      </Show>
    }
}

/// Popular and recent article lists.
#[component]
pub fn ArticleSidebar(
    #[prop(into)] articles: Signal<Vec<Article>>,
) -> impl IntoView {
    let list = move |kind: SidebarList| {
        articles.with(|all| render_sidebar(&recent_articles(all, SIDEBAR_LIMIT), kind))
    };

    view! {
      <aside class="article-sidebar">
        <section class="sidebar-section">
          <h3 class="sidebar-title">"人気の記事"</h3>
          <div id="popular-articles" inner_html=move || list(SidebarList::Popular)></div>
        </section>
        <section class="sidebar-section">
          <h3 class="sidebar-title">"最新の記事"</h3>
          <div id="recent-articles" inner_html=move || list(SidebarList::Recent)></div>
        </section>
      </aside>
    }
}
