//! Page controller behaviour against in-memory sources and documents.

use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use folio_core::{Article, ArticleKind, RawRecord, config::ListingConfig};
use folio_page::{
    Dispatch, ListingPage, LoadOutcome, MemoryDocument, PageController, PageEvent, RenderSummary,
};
use folio_render::{TemplateTag, listing::empty_state};
use folio_source::{ContentSource, SourceError};
use serde_json::{Value, json};
use tokio::sync::mpsc;

const GRID: &str = "#articles-grid";

struct StaticSource {
    records: Option<Vec<RawRecord>>,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl ContentSource for StaticSource {
    fn name(&self) -> &str {
        "static"
    }

    async fn fetch(&self, collection: &str) -> Result<Vec<RawRecord>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.records
            .clone()
            .ok_or_else(|| SourceError::Unavailable(collection.to_string()))
    }
}

fn articles(n: usize) -> Vec<RawRecord> {
    let results: Vec<Value> = (0..n)
        .map(|i| {
            json!({
                "id": format!("a{i}"),
                "title": format!("Article {i}"),
                "category": if i < 3 { "review" } else { "guide" },
                "excerpt": "Hands-on notes",
                "published": true,
                "date": format!("2024-05-{:02}", i + 1),
                "tags": if i == 7 { json!(["keyboard"]) } else { json!([]) }
            })
        })
        .collect();
    RawRecord::from_results(&Value::Array(results))
}

fn controller(
    records: Option<Vec<RawRecord>>,
) -> (PageController<StaticSource, Article>, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let source = StaticSource {
        records,
        calls: Arc::clone(&calls),
    };
    let page = ListingPage::new("affiling_articles", GRID, TemplateTag::ArticleListing)
        .with_categories(["comparison", "ranking", "review", "guide"]);
    (
        PageController::new(source, page, ArticleKind::Affiling, ListingConfig::default()),
        calls,
    )
}

fn document() -> MemoryDocument {
    MemoryDocument::new().with_element(GRID, "div")
}

#[tokio::test]
async fn test_initial_load_renders_first_window() {
    let (mut page, _) = controller(Some(articles(10)));
    let mut doc = document();

    let outcome = page.reload(&mut doc).await;
    assert_eq!(
        outcome,
        LoadOutcome::Rendered(RenderSummary {
            shown: 6,
            total: 10,
            has_more: true,
            source_failed: false,
        })
    );
    assert_eq!(doc.writes(), 1);
    assert_eq!(doc.inner_html(GRID).unwrap().matches("<article ").count(), 6);
}

#[tokio::test]
async fn test_review_filter_shows_three_review_cards() {
    let (mut page, _) = controller(Some(articles(10)));
    let mut doc = document();
    page.reload(&mut doc).await;

    page.set_filter("review", &mut doc).await;
    let html = doc.inner_html(GRID).unwrap();
    assert_eq!(html.matches("<article ").count(), 3);
    assert_eq!(html.matches(">レビュー</span>").count(), 3);
}

#[tokio::test]
async fn test_same_filter_does_not_refetch() {
    let (mut page, calls) = controller(Some(articles(4)));
    let mut doc = document();
    page.reload(&mut doc).await;

    assert_eq!(page.set_filter("all", &mut doc).await, LoadOutcome::Unchanged);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(doc.writes(), 1);
}

#[tokio::test]
async fn test_search_matches_tag() {
    let (mut page, _) = controller(Some(articles(10)));
    let mut doc = document();

    let outcome = page.set_search("KEYBOARD", &mut doc).await;
    assert!(matches!(outcome, LoadOutcome::Rendered(s) if s.total == 1));
    assert!(doc.inner_html(GRID).unwrap().contains("Article 7"));
}

#[tokio::test]
async fn test_load_more_extends_the_window() {
    let (mut page, _) = controller(Some(articles(10)));
    let mut doc = document();
    page.reload(&mut doc).await;

    let outcome = page.load_more(&mut doc).await;
    assert!(matches!(outcome, LoadOutcome::Rendered(s) if s.shown == 10 && !s.has_more));
    assert_eq!(page.state().page(), 2);
}

#[tokio::test]
async fn test_failing_source_renders_empty_state() {
    let (mut page, _) = controller(None);
    let mut doc = document();

    let outcome = page.reload(&mut doc).await;
    assert!(matches!(outcome, LoadOutcome::Rendered(s) if s.source_failed && s.shown == 0));
    assert_eq!(
        doc.inner_html(GRID),
        Some(empty_state(&ListingConfig::default().empty_message).as_str())
    );
}

#[tokio::test]
async fn test_missing_container_is_skipped() {
    let (mut page, _) = controller(Some(articles(2)));
    let mut doc = MemoryDocument::new();

    let outcome = page.reload(&mut doc).await;
    assert!(matches!(outcome, LoadOutcome::Rendered(s) if s.total == 2));
    assert_eq!(doc.writes(), 0);
}

#[test]
fn test_loading_guard_and_stale_generation() {
    let (mut page, _) = controller(Some(articles(10)));
    let mut doc = document();

    let ticket = page.begin_load().expect("first load starts");
    assert!(page.begin_load().is_none());

    assert!(page.apply(&PageEvent::FilterSelected("guide".to_string())));
    assert_ne!(ticket.generation(), page.state().generation());

    let outcome = page.complete_load(ticket, Ok(articles(10)), &mut doc);
    assert_eq!(outcome, LoadOutcome::Discarded { reload_pending: true });
    assert_eq!(doc.writes(), 0);
    assert!(page.take_reload_pending());
    assert!(!page.take_reload_pending());

    let ticket = page.begin_load().expect("guard released");
    let outcome = page.complete_load(ticket, Ok(articles(10)), &mut doc);
    assert!(matches!(outcome, LoadOutcome::Rendered(s) if s.total == 7));
}

#[test]
fn test_filter_during_load_rerenders_loaded_records() {
    let (mut page, _) = controller(Some(articles(10)));
    let mut doc = document();

    let ticket = page.begin_load().expect("first load starts");
    page.complete_load(ticket, Ok(articles(10)), &mut doc);
    assert_eq!(doc.inner_html(GRID).unwrap().matches("<article ").count(), 6);

    let ticket = page.begin_load().expect("guard released");
    assert!(page.apply(&PageEvent::FilterSelected("review".to_string())));
    let outcome = page.complete_load(ticket, Ok(articles(10)), &mut doc);
    assert_eq!(outcome, LoadOutcome::Discarded { reload_pending: true });

    let html = doc.inner_html(GRID).unwrap();
    assert_eq!(html.matches("<article ").count(), 3);
    assert_eq!(html.matches(">レビュー</span>").count(), 3);
}

#[tokio::test]
async fn test_dispatch_while_loading_renders_now_and_refetches_after() {
    let (mut page, calls) = controller(Some(articles(10)));
    let mut doc = document();
    page.reload(&mut doc).await;

    let ticket = page.begin_load().expect("guard released");
    let review = PageEvent::FilterSelected("review".to_string());
    assert!(matches!(
        page.dispatch(&review, &mut doc),
        Dispatch::Deferred { rendered: Some(s) } if s.shown == 3 && !s.has_more
    ));
    assert_eq!(doc.inner_html(GRID).unwrap().matches("<article ").count(), 3);
    assert_eq!(page.dispatch(&review, &mut doc), Dispatch::Unchanged);

    let outcome = page.complete_load(ticket, Ok(articles(4)), &mut doc);
    assert_eq!(outcome, LoadOutcome::Discarded { reload_pending: true });
    assert!(page.take_reload_pending());

    let outcome = page.reload(&mut doc).await;
    assert!(matches!(outcome, LoadOutcome::Rendered(s) if s.total == 3));
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    match page.dispatch(&PageEvent::FilterSelected("guide".to_string()), &mut doc) {
        Dispatch::Start(ticket) => {
            let outcome = page.complete_load(ticket, Ok(articles(10)), &mut doc);
            assert!(matches!(outcome, LoadOutcome::Rendered(s) if s.total == 7));
        }
        other => panic!("expected a fetch to start, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn test_event_loop_settles_search_keystrokes() {
    let (mut page, calls) = controller(Some(articles(10)));
    let mut doc = document();
    let (tx, rx) = mpsc::channel(16);

    let typing = tokio::spawn(async move {
        tx.send(PageEvent::Refresh).await.unwrap();
        for term in ["k", "ke", "key"] {
            tx.send(PageEvent::SearchInput(term.to_string())).await.unwrap();
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
        tx.send(PageEvent::SearchInput("keyboard".to_string()))
            .await
            .unwrap();
    });

    let last = page.run(rx, &mut doc).await;
    typing.await.unwrap();

    // Refresh, the settled "key", then "keyboard" settled on close.
    assert_eq!(calls.load(Ordering::SeqCst), 3);
    assert_eq!(page.state().search(), "keyboard");
    assert_eq!(page.pending_search(), None);
    assert!(matches!(last, Some(s) if s.total == 1));
    assert!(doc.inner_html(GRID).unwrap().contains("Article 7"));
}

#[tokio::test(start_paused = true)]
async fn test_event_loop_settles_search_before_later_events() {
    let (mut page, _) = controller(Some(articles(10)));
    let mut doc = document();
    let (tx, rx) = mpsc::channel(16);

    tx.send(PageEvent::SearchInput("Keyboard".to_string()))
        .await
        .unwrap();
    tx.send(PageEvent::FilterSelected("guide".to_string()))
        .await
        .unwrap();
    drop(tx);

    let last = page.run(rx, &mut doc).await;
    assert_eq!(page.state().search(), "keyboard");
    assert_eq!(page.state().filter(), "guide");
    assert!(matches!(last, Some(s) if s.total == 1 && s.shown == 1));
}

#[tokio::test]
async fn test_hash_selects_known_categories_only() {
    let (mut page, calls) = controller(Some(articles(10)));
    let mut doc = document();

    assert_eq!(
        page.handle(PageEvent::HashChanged("#unknown".to_string()), &mut doc).await,
        LoadOutcome::Unchanged
    );
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    page.handle(PageEvent::HashChanged("#review".to_string()), &mut doc).await;
    assert_eq!(page.state().filter(), "review");
}

#[tokio::test]
async fn test_duplicate_ids_keep_the_last_record() {
    let records = RawRecord::from_results(&json!([
        {"id": "dup", "title": "Old", "published": true, "date": "2024-01-01"},
        {"id": "dup", "title": "New", "published": true, "date": "2024-01-01"}
    ]));
    let (mut page, _) = controller(Some(records));
    let mut doc = document();

    page.reload(&mut doc).await;
    assert_eq!(page.records().len(), 1);
    assert!(doc.inner_html(GRID).unwrap().contains("New"));
}
