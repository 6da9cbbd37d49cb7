// SyncedGridView behaviour: sorting, paging, pinned column sync

use crud_grid::data::row::Row;
use crud_grid::grid::sort::SortDirection;
use crud_grid::grid::{ColumnDescriptor, GridCallbacks, GridFrame, SyncedGridView};
use std::cell::Cell;
use std::rc::Rc;

fn columns() -> Vec<ColumnDescriptor> {
    vec![
        ColumnDescriptor::field("title", "Title").width(16).sticky(),
        ColumnDescriptor::field("rank", "Rank").width(6),
        ColumnDescriptor::field("status", "Status").width(10),
        ColumnDescriptor::render("actions", "Actions", |r| format!("edit {}", r.id)).width(12),
    ]
}

fn numbered(range: std::ops::RangeInclusive<usize>) -> Vec<Row> {
    range
        .map(|i| {
            Row::new(i.to_string())
                .with("title", format!("Item {:03}", i))
                .with("rank", i as i64)
        })
        .collect()
}

fn ids(grid: &SyncedGridView) -> Vec<&str> {
    grid.rows().iter().map(|r| r.id.as_str()).collect()
}

fn counting_load_more(count: &Rc<Cell<usize>>) -> GridCallbacks {
    let c = count.clone();
    GridCallbacks::new().on_load_more(move || c.set(c.get() + 1))
}

#[test]
fn test_sort_by_title_ascending() {
    let mut grid = SyncedGridView::new(columns());
    grid.replace_rows(
        vec![
            Row::new("1").with("title", "B"),
            Row::new("2").with("title", "A"),
        ],
        false,
    );

    // First press sorts descending, second flips to ascending
    assert!(grid.press_header("title"));
    assert_eq!(grid.sort_direction_for("title"), Some(SortDirection::Desc));
    assert!(grid.press_header("title"));
    assert_eq!(grid.sort_direction_for("title"), Some(SortDirection::Asc));

    assert_eq!(ids(&grid), vec!["2", "1"]);
}

#[test]
fn test_pages_merge_without_duplicates() {
    let mut grid = SyncedGridView::new(columns());
    grid.replace_rows(vec![Row::new("1"), Row::new("2")], true);
    let added = grid.append_page(vec![Row::new("2"), Row::new("3")], false);

    assert_eq!(added, 1);
    assert_eq!(ids(&grid), vec!["1", "2", "3"]);
}

#[test]
fn test_render_column_press_is_ignored() {
    let mut grid = SyncedGridView::new(columns());
    grid.replace_rows(numbered(1..=3), false);

    assert!(!grid.press_header("actions"));
    assert_eq!(grid.sort_state().selected_column_id, None);
    assert_eq!(grid.sort_state().direction, None);
    assert_eq!(ids(&grid), vec!["1", "2", "3"]);
}

#[test]
fn test_render_column_press_keeps_prior_sort() {
    let mut grid = SyncedGridView::new(columns());
    grid.replace_rows(numbered(1..=3), false);
    grid.press_header("rank");

    assert!(!grid.press_header("actions"));
    assert_eq!(grid.sort_state().selected_column_id.as_deref(), Some("rank"));
    assert_eq!(grid.sort_state().direction, Some(SortDirection::Desc));
    assert_eq!(ids(&grid), vec!["3", "2", "1"]);
}

#[test]
fn test_toggle_never_reaches_third_state() {
    let mut grid = SyncedGridView::new(columns());
    grid.replace_rows(numbered(1..=4), false);

    let directions: Vec<Option<SortDirection>> = (0..5)
        .map(|_| {
            grid.press_header("rank");
            grid.sort_state().direction
        })
        .collect();

    assert_eq!(
        directions,
        vec![
            Some(SortDirection::Desc),
            Some(SortDirection::Asc),
            Some(SortDirection::Desc),
            Some(SortDirection::Asc),
            Some(SortDirection::Desc),
        ]
    );
}

#[test]
fn test_switching_column_resets_to_desc() {
    let mut grid = SyncedGridView::new(columns());
    grid.replace_rows(numbered(1..=4), false);

    grid.press_header("rank");
    grid.press_header("rank");
    assert_eq!(grid.sort_direction_for("rank"), Some(SortDirection::Asc));

    grid.press_header("title");
    assert_eq!(grid.sort_direction_for("title"), Some(SortDirection::Desc));
    assert_eq!(grid.sort_direction_for("rank"), None);

    // Coming back does not remember Asc
    grid.press_header("rank");
    assert_eq!(grid.sort_direction_for("rank"), Some(SortDirection::Desc));
}

#[test]
fn test_equal_keys_keep_relative_order() {
    let rows: Vec<Row> = (1..=6)
        .map(|i| {
            let status = if i % 2 == 0 { "draft" } else { "active" };
            Row::new(i.to_string()).with("status", status)
        })
        .collect();
    let mut grid = SyncedGridView::new(columns());
    grid.replace_rows(rows, false);

    grid.press_header("status");
    assert_eq!(ids(&grid), vec!["2", "4", "6", "1", "3", "5"]);

    grid.press_header("status");
    assert_eq!(ids(&grid), vec!["1", "3", "5", "2", "4", "6"]);
}

#[test]
fn test_numeric_sort_is_not_lexicographic() {
    let mut grid = SyncedGridView::new(columns());
    grid.replace_rows(
        vec![
            Row::new("a").with("rank", 10i64),
            Row::new("b").with("rank", 9i64),
            Row::new("c").with("rank", 100i64),
        ],
        false,
    );
    grid.press_header("rank");
    grid.press_header("rank");
    assert_eq!(ids(&grid), vec!["b", "a", "c"]);
}

#[test]
fn test_sort_applies_to_appended_pages() {
    let mut grid = SyncedGridView::new(columns());
    grid.replace_rows(numbered(1..=3), true);
    grid.press_header("rank");
    grid.append_page(numbered(4..=5), false);
    assert_eq!(ids(&grid), vec!["5", "4", "3", "2", "1"]);
}

#[test]
fn test_pinned_translation_matches_offset() {
    let mut grid = SyncedGridView::new(columns()).with_pinned_column("title");
    grid.on_resize(10, 80);
    grid.replace_rows(numbered(1..=100), false);

    for offset in [0u32, 1, 7, 42, 90] {
        grid.on_scroll(offset);
        assert_eq!(grid.scroll_offset(), offset);
        assert_eq!(grid.pinned_translation(), -(offset as i64));

        let frame = grid.frame();
        let table = frame.as_table().expect("table frame");
        let pinned = table.pinned.as_ref().expect("pinned overlay");
        assert_eq!(pinned.translate_y, -(offset as i64));
    }
}

#[test]
fn test_scroll_past_end_clamps_and_overlay_follows() {
    let mut grid = SyncedGridView::new(columns()).with_pinned_column("title");
    grid.on_resize(10, 80);
    grid.replace_rows(numbered(1..=100), false);

    grid.on_scroll(500);
    assert_eq!(grid.scroll_offset(), 90);
    assert_eq!(grid.pinned_translation(), -90);
}

#[test]
fn test_pinned_overlay_rows_line_up_with_body() {
    let mut grid = SyncedGridView::new(columns()).with_pinned_column("title");
    grid.on_resize(10, 80);
    grid.replace_rows(numbered(1..=100), false);
    grid.on_scroll(33);

    let frame = grid.frame();
    let table = frame.as_table().expect("table frame");
    let pinned = table.pinned.as_ref().expect("pinned overlay");

    let body: Vec<(&str, i64)> = table.rows.iter().map(|r| (r.id.as_str(), r.top)).collect();
    let overlay: Vec<(&str, i64)> = pinned.rows.iter().map(|r| (r.id.as_str(), r.top)).collect();
    assert_eq!(body, overlay);
    assert_eq!(table.rows.len(), 10);
    assert_eq!(table.rows[0].id, "34");
    assert_eq!(pinned.rows[0].cells, vec!["Item 034".to_string()]);
}

#[test]
fn test_pinned_column_not_in_scrollable_header() {
    let mut grid = SyncedGridView::new(columns()).with_pinned_column("title");
    grid.on_resize(10, 120);
    grid.replace_rows(numbered(1..=3), false);

    let frame = grid.frame();
    let table = frame.as_table().expect("table frame");
    let header_ids: Vec<&str> = table.header.iter().map(|h| h.column_id.as_str()).collect();
    assert_eq!(header_ids, vec!["rank", "status", "actions"]);
    assert_eq!(table.pinned.as_ref().map(|p| p.header.column_id.as_str()), Some("title"));
}

#[test]
fn test_horizontal_scroll_keeps_pinned_column() {
    let mut grid = SyncedGridView::new(columns()).with_pinned_column("title");
    grid.on_resize(10, 30);
    grid.replace_rows(numbered(1..=3), false);

    grid.scroll_horizontal(1);
    let frame = grid.frame();
    let table = frame.as_table().expect("table frame");
    assert_eq!(table.h_offset, grid.h_offset());
    assert!(table.header.iter().all(|h| h.column_id != "title"));
    assert!(table.pinned.is_some());
}

#[test]
fn test_load_more_not_called_without_more_data() {
    let count = Rc::new(Cell::new(0));
    let mut grid = SyncedGridView::new(columns()).with_callbacks(counting_load_more(&count));
    grid.on_resize(10, 80);
    grid.replace_rows(numbered(1..=3), false);
    grid.scroll_by(5);
    grid.on_scroll(0);

    assert_eq!(count.get(), 0);
}

#[test]
fn test_load_more_once_until_rows_arrive() {
    let count = Rc::new(Cell::new(0));
    let mut grid = SyncedGridView::new(columns()).with_callbacks(counting_load_more(&count));
    grid.on_resize(10, 80);

    // Five rows fill half the viewport, so the first page already reaches the end
    grid.replace_rows(numbered(1..=5), true);
    assert_eq!(count.get(), 1);
    assert!(grid.is_load_more_pending());

    grid.scroll_by(1);
    grid.on_scroll(0);
    grid.set_loading(false);
    assert_eq!(count.get(), 1);

    grid.append_page(numbered(6..=10), true);
    assert_eq!(count.get(), 2);

    grid.append_page(numbered(11..=12), false);
    assert_eq!(count.get(), 2);
    assert!(!grid.is_load_more_pending());
}

#[test]
fn test_load_more_waits_for_scroll_near_end() {
    let count = Rc::new(Cell::new(0));
    let mut grid = SyncedGridView::new(columns()).with_callbacks(counting_load_more(&count));
    grid.on_resize(10, 80);
    grid.replace_rows(numbered(1..=40), true);
    assert_eq!(count.get(), 0);

    // 40 rows + footer = 41 lines; near end once within 5 lines of the bottom
    grid.on_scroll(20);
    assert_eq!(count.get(), 0);
    grid.on_scroll(26);
    assert_eq!(count.get(), 1);
    grid.on_scroll(31);
    assert_eq!(count.get(), 1);
}

#[test]
fn test_failed_load_rearms_gate() {
    let count = Rc::new(Cell::new(0));
    let mut grid = SyncedGridView::new(columns()).with_callbacks(counting_load_more(&count));
    grid.on_resize(10, 80);
    grid.replace_rows(numbered(1..=40), true);
    grid.on_scroll(31);
    assert_eq!(count.get(), 1);

    grid.on_load_failed();
    assert!(!grid.is_load_more_pending());
    assert_eq!(count.get(), 1);

    grid.on_scroll(30);
    assert_eq!(count.get(), 2);
}

#[test]
fn test_pull_to_refresh_fires_refresh() {
    let refreshes = Rc::new(Cell::new(0));
    let r = refreshes.clone();
    let mut grid = SyncedGridView::new(columns())
        .with_callbacks(GridCallbacks::new().on_refresh(move || r.set(r.get() + 1)));
    grid.on_resize(10, 80);
    grid.replace_rows(numbered(1..=30), false);

    grid.scroll_by(-1);
    grid.scroll_by(-1);
    assert_eq!(refreshes.get(), 0);
    grid.scroll_by(-1);
    assert_eq!(refreshes.get(), 1);
}

#[test]
fn test_loading_indicator_only_without_rows() {
    let mut grid = SyncedGridView::new(columns());
    grid.set_loading(true);
    assert_eq!(grid.frame(), GridFrame::Loading);

    grid.replace_rows(numbered(1..=3), false);
    grid.set_refreshing(true);
    grid.set_loading(true);
    let frame = grid.frame();
    let table = frame.as_table().expect("rows stay visible while loading");
    assert_eq!(table.total_rows, 3);
}

#[test]
fn test_empty_state_message_and_action() {
    let mut grid = SyncedGridView::new(columns())
        .with_empty_state("Nothing here", Some("Create one".to_string()));
    grid.set_loading(false);
    assert_eq!(
        grid.frame(),
        GridFrame::Empty {
            message: "Nothing here".to_string(),
            action: Some("Create one".to_string()),
        }
    );
}

#[test]
fn test_missing_cell_renders_empty() {
    let mut grid = SyncedGridView::new(columns()).with_pinned_column("title");
    grid.on_resize(10, 120);
    grid.replace_rows(vec![Row::new("x").with("title", "Only title")], false);

    let frame = grid.frame();
    let table = frame.as_table().expect("table frame");
    assert_eq!(table.rows[0].cells[0], "");
    assert_eq!(table.rows[0].cells[2], "edit x");
}

#[test]
fn test_row_hooks_receive_rows() {
    let pressed = Rc::new(Cell::new(0usize));
    let deleted = Rc::new(Cell::new(0usize));
    let (p, d) = (pressed.clone(), deleted.clone());
    let mut grid = SyncedGridView::new(columns()).with_callbacks(
        GridCallbacks::new()
            .on_row_press(move |row| p.set(row.id.parse().unwrap_or(0)))
            .on_row_delete(move |row| d.set(row.id.parse().unwrap_or(0))),
    );
    grid.replace_rows(numbered(1..=5), false);

    grid.press_row(3);
    assert_eq!(pressed.get(), 4);
    assert_eq!(grid.selected_index(), 3);

    // Delete only forwards; the row stays until the host removes it
    grid.delete_row(1);
    assert_eq!(deleted.get(), 2);
    assert_eq!(grid.row_count(), 5);
    assert!(grid.remove_row("2").is_some());
    assert_eq!(grid.row_count(), 4);
}
