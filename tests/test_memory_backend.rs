// In-memory backend: filtering, ordering and range semantics

use crud_grid::data::backend::CrudBackend;
use crud_grid::data::crud_item::{CreateCrudItemInput, ItemStatus, UpdateCrudItemInput};
use crud_grid::data::memory_backend::InMemoryBackend;
use crud_grid::data::query::{CrudFilters, PaginationOptions, SortOption, StatusFilter};

const USER: &str = "user-1";

fn options(page_size: usize, sort: SortOption, filters: CrudFilters) -> PaginationOptions {
    PaginationOptions {
        page_size,
        order_by: sort.order_by(),
        filters,
    }
}

#[test]
fn test_newest_first_by_default() {
    let backend = InMemoryBackend::seeded(USER, 45);
    let page = backend
        .fetch_page(USER, 0, &PaginationOptions::default())
        .unwrap();

    assert_eq!(page.data.len(), 20);
    assert_eq!(page.total, Some(45));
    assert!(page.has_more);
    assert_eq!(page.data[0].id, "45");
    assert!(page
        .data
        .windows(2)
        .all(|w| w[0].created_at >= w[1].created_at));
}

#[test]
fn test_last_page_has_no_more() {
    let backend = InMemoryBackend::seeded(USER, 45);
    let page = backend
        .fetch_page(USER, 40, &options(10, SortOption::Oldest, CrudFilters::default()))
        .unwrap();

    assert_eq!(page.data.len(), 5);
    assert!(!page.has_more);
    assert_eq!(page.data.last().map(|i| i.id.as_str()), Some("45"));
}

#[test]
fn test_alphabetical_order() {
    let backend = InMemoryBackend::seeded(USER, 30);
    let page = backend
        .fetch_page(USER, 0, &options(30, SortOption::Alphabetical, CrudFilters::default()))
        .unwrap();

    let titles: Vec<&str> = page.data.iter().map(|i| i.title.as_str()).collect();
    let mut sorted = titles.clone();
    sorted.sort();
    assert_eq!(titles, sorted);
}

#[test]
fn test_status_filter() {
    let backend = InMemoryBackend::seeded(USER, 45);
    let filters = CrudFilters {
        status: vec![StatusFilter::Active],
        ..Default::default()
    };
    let page = backend
        .fetch_page(USER, 0, &options(50, SortOption::Newest, filters))
        .unwrap();

    assert_eq!(page.total, Some(15));
    assert!(page.data.iter().all(|i| i.status == ItemStatus::Active));
}

#[test]
fn test_all_status_filter_matches_everything() {
    let backend = InMemoryBackend::seeded(USER, 12);
    let filters = CrudFilters {
        status: vec![StatusFilter::All],
        ..Default::default()
    };
    let page = backend
        .fetch_page(USER, 0, &options(50, SortOption::Newest, filters))
        .unwrap();
    assert_eq!(page.total, Some(12));
}

#[test]
fn test_search_is_case_insensitive() {
    let backend = InMemoryBackend::seeded(USER, 45);
    let filters = CrudFilters {
        search: Some("ROADMAP".to_string()),
        ..Default::default()
    };
    let page = backend
        .fetch_page(USER, 0, &options(50, SortOption::Newest, filters))
        .unwrap();

    assert_eq!(page.total, Some(6));
    assert!(page.data.iter().all(|i| i.title.contains("Roadmap")));
}

#[test]
fn test_items_scoped_to_user() {
    let backend = InMemoryBackend::seeded(USER, 5);
    let page = backend
        .fetch_page("someone-else", 0, &PaginationOptions::default())
        .unwrap();
    assert!(page.data.is_empty());
    assert_eq!(page.total, Some(0));
    assert!(backend.get_item("1", "someone-else").unwrap().is_none());
    assert!(backend.get_item("1", USER).unwrap().is_some());
}

#[test]
fn test_create_update_delete() {
    let backend = InMemoryBackend::seeded(USER, 3);

    let created = backend
        .create_item(
            USER,
            &CreateCrudItemInput {
                title: "Launch plan".to_string(),
                subtitle: Some(String::new()),
                description: None,
                category: "Marketing".to_string(),
                status: None,
                image_url: None,
            },
        )
        .unwrap();
    assert_eq!(created.id, "4");
    assert_eq!(created.status, ItemStatus::Draft);
    assert_eq!(created.subtitle, None);
    assert_eq!(backend.len(), 4);

    let updated = backend
        .update_item(
            "4",
            USER,
            &UpdateCrudItemInput {
                status: Some(ItemStatus::Active),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(updated.status, ItemStatus::Active);
    assert_eq!(updated.title, "Launch plan");

    backend.delete_item("4", USER).unwrap();
    assert!(backend.delete_item("4", USER).is_err());
    assert_eq!(backend.len(), 3);
}

#[test]
fn test_create_rejects_blank_title() {
    let backend = InMemoryBackend::new();
    let result = backend.create_item(
        USER,
        &CreateCrudItemInput {
            title: "   ".to_string(),
            subtitle: None,
            description: None,
            category: "General".to_string(),
            status: None,
            image_url: None,
        },
    );
    assert!(result.is_err());
    assert!(backend.is_empty());
}

#[test]
fn test_update_missing_item_fails() {
    let backend = InMemoryBackend::seeded(USER, 2);
    let result = backend.update_item(
        "99",
        USER,
        &UpdateCrudItemInput {
            title: Some("x".to_string()),
            ..Default::default()
        },
    );
    assert!(result.is_err());
}
