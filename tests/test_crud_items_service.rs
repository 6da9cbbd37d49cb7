// Items service paging against the in-memory backend

use crud_grid::data::crud_item::UpdateCrudItemInput;
use crud_grid::data::memory_backend::InMemoryBackend;
use crud_grid::data::query::{CrudFilters, SortOption, StatusFilter};
use crud_grid::services::{CrudItemsService, ServiceEvent};
use std::sync::Arc;
use std::time::Duration;

fn service(count: usize, page_size: usize) -> CrudItemsService {
    let backend = Arc::new(InMemoryBackend::seeded("user-1", count));
    CrudItemsService::new(backend, "user-1").with_page_size(page_size)
}

fn loaded_rows(events: &[ServiceEvent]) -> usize {
    events
        .iter()
        .map(|e| match e {
            ServiceEvent::PageLoaded { rows, .. } => rows.len(),
            ServiceEvent::Failed(_) => 0,
        })
        .sum()
}

#[test]
fn test_pages_until_exhausted() {
    let mut svc = service(45, 20);
    svc.start();
    svc.poll();

    let mut pages = 1;
    while svc.load_more() {
        let events = svc.poll();
        assert!(loaded_rows(&events) > 0);
        pages += 1;
    }

    assert_eq!(pages, 3);
    assert_eq!(svc.items().len(), 45);
    assert!(!svc.has_more());
    assert_eq!(svc.offset(), 45);
    assert!(!svc.load_more());
}

#[test]
fn test_load_more_ignored_while_in_flight() {
    let mut svc = service(45, 20);
    svc.start();
    // First page not applied yet
    assert!(!svc.load_more());
    svc.poll();

    assert!(svc.load_more());
    assert!(!svc.load_more());
    let events = svc.poll();
    assert_eq!(events.len(), 1);
    assert_eq!(svc.items().len(), 40);
}

#[test]
fn test_sort_change_reloads_from_start() {
    let mut svc = service(30, 10);
    svc.start();
    svc.poll();
    svc.load_more();
    svc.poll();
    assert_eq!(svc.items().len(), 20);
    assert_eq!(svc.items()[0].id, "30");

    svc.set_sort(SortOption::Oldest);
    let events = svc.poll();
    assert!(matches!(
        events.first(),
        Some(ServiceEvent::PageLoaded { replace: true, .. })
    ));
    assert_eq!(svc.items().len(), 10);
    assert_eq!(svc.items()[0].id, "1");
}

#[test]
fn test_same_sort_does_not_reload() {
    let mut svc = service(10, 5);
    svc.start();
    svc.poll();
    svc.set_sort(SortOption::Newest);
    assert!(svc.poll().is_empty());
}

#[test]
fn test_search_and_status_filters() {
    let mut svc = service(45, 50);
    svc.start();
    svc.poll();
    assert_eq!(svc.total(), 45);

    svc.set_search(Some("roadmap".to_string()));
    svc.poll();
    assert_eq!(svc.total(), 6);

    // Blank search clears the filter
    svc.set_search(Some("   ".to_string()));
    svc.poll();
    assert_eq!(svc.total(), 45);
    assert_eq!(svc.filters().search, None);

    svc.set_filters(CrudFilters {
        status: vec![StatusFilter::Draft],
        ..Default::default()
    });
    svc.poll();
    assert_eq!(svc.total(), 15);
}

#[test]
fn test_refresh_keeps_items_until_reload_lands() {
    let mut svc = service(12, 5);
    svc.start();
    svc.poll();

    svc.refresh();
    assert!(svc.is_refreshing());
    assert!(!svc.is_loading());
    assert_eq!(svc.items().len(), 5);

    svc.poll();
    assert!(!svc.is_refreshing());
    assert_eq!(svc.items().len(), 5);
}

#[test]
fn test_refresh_discards_queued_page_from_older_load() {
    let mut svc = service(30, 10);
    svc.start();
    svc.poll();

    // Inline fetch: the next page is already queued
    assert!(svc.load_more());
    svc.refresh();

    let events = svc.poll();
    assert_eq!(events.len(), 1);
    match &events[0] {
        ServiceEvent::PageLoaded { replace, rows, .. } => {
            assert!(*replace);
            assert_eq!(rows.len(), 10);
        }
        other => panic!("unexpected event {:?}", other),
    }
    assert_eq!(svc.items().len(), 10);
    assert_eq!(svc.offset(), 10);
    assert!(!svc.is_refreshing());

    // Nothing left in flight, so the next page can be requested
    assert!(svc.load_more());
    svc.poll();
    assert_eq!(svc.items().len(), 20);
    assert_eq!(svc.items()[10].id, "20");
}

#[test]
fn test_delete_adjusts_counts() {
    let mut svc = service(12, 5);
    svc.start();
    svc.poll();
    assert_eq!(svc.total(), 12);

    svc.delete("12").unwrap();
    assert_eq!(svc.items().len(), 4);
    assert_eq!(svc.total(), 11);
    assert_eq!(svc.offset(), 4);

    // Next page continues without skipping an item
    svc.load_more();
    svc.poll();
    let ids: Vec<&str> = svc.items().iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["11", "10", "9", "8", "7", "6", "5", "4", "3"]);
}

#[test]
fn test_update_replaces_loaded_item() {
    let mut svc = service(5, 5);
    svc.start();
    svc.poll();

    let item = svc
        .update(
            "3",
            &UpdateCrudItemInput {
                title: Some("Renamed".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(item.title, "Renamed");
    assert_eq!(svc.item("3").map(|i| i.title.as_str()), Some("Renamed"));

    assert!(svc.update("3", &UpdateCrudItemInput::default()).is_err());
}

#[test]
fn test_fetch_on_runtime_delivers_through_poll() {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .unwrap();
    let mut svc = service(25, 10).with_runtime(runtime.handle().clone());
    svc.start();

    let mut events = Vec::new();
    for _ in 0..200 {
        events.extend(svc.poll());
        if !events.is_empty() {
            break;
        }
        std::thread::sleep(Duration::from_millis(10));
    }

    assert_eq!(loaded_rows(&events), 10);
    assert_eq!(svc.items().len(), 10);
    assert!(svc.has_more());
}
