/// SyncedGridView - column-structured rows with one pinned column
///
/// Architecture:
/// rows (pages from the host)
///     → RowSet (de-duplicated, locally sorted)
///         → ScrollSync (single owner of the vertical offset)
///             → GridFrame (scrollable block + pinned overlay following -offset)
///
/// The scrollable region owns vertical position. The pinned column is a pure
/// follower: its body is translated by exactly minus the tracked offset and
/// it never writes scroll state back.
use tracing::{debug, info, warn};

use crate::data::row::Row;
use crate::data::row_set::RowSet;
use crate::grid::column::ColumnDescriptor;
use crate::grid::frame::{BodyRow, GridFrame, HeaderCell, PinnedOverlay, TableFrame};
use crate::grid::layout::GridLayout;
use crate::grid::scroll::{LoadMoreGate, ScrollOutcome, ScrollSync};
use crate::grid::sort::{SortDirection, SortState};

/// Default trailing-edge threshold, in viewports
pub const DEFAULT_LOAD_MORE_THRESHOLD: f32 = 0.5;
/// Lines taken by the "loading more" footer
pub const FOOTER_LINES: u32 = 1;

type Callback = Box<dyn FnMut()>;
type RowCallback = Box<dyn FnMut(&Row)>;

/// Hooks the host wires into the grid. All run on the UI thread.
#[derive(Default)]
pub struct GridCallbacks {
    pub on_load_more: Option<Callback>,
    pub on_refresh: Option<Callback>,
    pub on_row_press: Option<RowCallback>,
    pub on_row_edit: Option<RowCallback>,
    pub on_row_delete: Option<RowCallback>,
}

impl GridCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_load_more(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_load_more = Some(Box::new(f));
        self
    }

    pub fn on_refresh(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_refresh = Some(Box::new(f));
        self
    }

    pub fn on_row_press(mut self, f: impl FnMut(&Row) + 'static) -> Self {
        self.on_row_press = Some(Box::new(f));
        self
    }

    pub fn on_row_edit(mut self, f: impl FnMut(&Row) + 'static) -> Self {
        self.on_row_edit = Some(Box::new(f));
        self
    }

    pub fn on_row_delete(mut self, f: impl FnMut(&Row) + 'static) -> Self {
        self.on_row_delete = Some(Box::new(f));
        self
    }
}

pub struct SyncedGridView {
    columns: Vec<ColumnDescriptor>,
    pinned_column_id: Option<String>,
    rows: RowSet,
    sort: SortState,
    scroll: ScrollSync,
    gate: LoadMoreGate,
    callbacks: GridCallbacks,

    loading: bool,
    refreshing: bool,
    has_more: bool,

    /// Scrollable columns shifted out to the left
    h_offset: usize,
    /// Cursor row (index into the row set)
    selected: usize,
    viewport_width: u16,
    load_more_threshold: f32,

    empty_message: String,
    empty_action: Option<String>,
}

impl SyncedGridView {
    pub fn new(columns: Vec<ColumnDescriptor>) -> Self {
        Self {
            columns,
            pinned_column_id: None,
            rows: RowSet::new(),
            sort: SortState::new(),
            scroll: ScrollSync::new(1),
            gate: LoadMoreGate::new(),
            callbacks: GridCallbacks::new(),
            loading: false,
            refreshing: false,
            has_more: false,
            h_offset: 0,
            selected: 0,
            viewport_width: 0,
            load_more_threshold: DEFAULT_LOAD_MORE_THRESHOLD,
            empty_message: "No items found".to_string(),
            empty_action: None,
        }
    }

    pub fn with_pinned_column(mut self, column_id: impl Into<String>) -> Self {
        self.pinned_column_id = Some(column_id.into());
        self.check_pinned_column();
        self
    }

    pub fn with_callbacks(mut self, callbacks: GridCallbacks) -> Self {
        self.callbacks = callbacks;
        self
    }

    pub fn with_row_height(mut self, row_height: u16) -> Self {
        let viewport = self.scroll.viewport_height();
        self.scroll = ScrollSync::new(row_height);
        self.scroll.set_viewport_height(viewport);
        self.sync_scroll_content();
        self
    }

    pub fn with_load_more_threshold(mut self, threshold: f32) -> Self {
        self.load_more_threshold = threshold;
        self
    }

    pub fn with_empty_state(mut self, message: impl Into<String>, action: Option<String>) -> Self {
        self.empty_message = message.into();
        self.empty_action = action;
        self
    }

    pub fn set_columns(&mut self, columns: Vec<ColumnDescriptor>) {
        self.columns = columns;
        self.h_offset = 0;
        self.check_pinned_column();
        if let Some(id) = self.sort.selected_column_id.clone() {
            if !self.columns.iter().any(|c| c.id == id) {
                self.sort.clear();
            }
        }
    }

    fn check_pinned_column(&self) {
        if let Some(id) = &self.pinned_column_id {
            if !self.columns.iter().any(|c| &c.id == id) {
                warn!(target: "grid", "Pinned column {} does not exist, pinning disabled", id);
            }
        }
    }

    pub fn set_empty_state(&mut self, message: impl Into<String>, action: Option<String>) {
        self.empty_message = message.into();
        self.empty_action = action;
    }

    // ========== Data arrival ==========

    /// Initial load or refresh: replace the loaded set
    pub fn replace_rows(&mut self, rows: Vec<Row>, has_more: bool) {
        self.rows.replace(rows);
        self.sort.apply(&mut self.rows, &self.columns);
        self.has_more = has_more;
        self.selected = self.selected.min(self.rows.len().saturating_sub(1));
        self.scroll.reset();
        self.after_data_arrival();
    }

    /// Load-more page: append, dropping ids already present
    pub fn append_page(&mut self, rows: Vec<Row>, has_more: bool) -> usize {
        let added = self.rows.append(rows);
        self.sort.apply(&mut self.rows, &self.columns);
        self.has_more = has_more;
        self.after_data_arrival();
        added
    }

    pub fn remove_row(&mut self, id: &str) -> Option<Row> {
        let removed = self.rows.remove(id);
        if removed.is_some() {
            self.selected = self.selected.min(self.rows.len().saturating_sub(1));
            self.sync_scroll_content();
        }
        removed
    }

    pub fn update_row(&mut self, row: Row) -> bool {
        let updated = self.rows.update(row);
        if updated {
            self.sort.apply(&mut self.rows, &self.columns);
        }
        updated
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
        if !loading {
            self.maybe_load_more();
        }
    }

    pub fn set_refreshing(&mut self, refreshing: bool) {
        self.refreshing = refreshing;
    }

    pub fn set_has_more(&mut self, has_more: bool) {
        self.has_more = has_more;
        self.sync_scroll_content();
    }

    /// A requested page failed. Re-arms the gate without firing again;
    /// the next scroll near the end retries.
    pub fn on_load_failed(&mut self) {
        self.gate.on_data_arrived();
    }

    fn after_data_arrival(&mut self) {
        self.gate.on_data_arrived();
        self.sync_scroll_content();
        debug!(target: "grid", "rows={} has_more={}", self.rows.len(), self.has_more);
        self.maybe_load_more();
    }

    fn sync_scroll_content(&mut self) {
        let footer = if self.has_more && !self.rows.is_empty() {
            FOOTER_LINES
        } else {
            0
        };
        self.scroll.set_content(self.rows.len(), footer);
    }

    // ========== Events ==========

    /// Viewport measured: body height in lines and total width in cells
    pub fn on_resize(&mut self, body_height: u32, width: u16) {
        self.scroll.set_viewport_height(body_height);
        self.viewport_width = width;
        let max = self.layout().max_h_offset(width);
        self.h_offset = self.h_offset.min(max);
        self.maybe_load_more();
    }

    /// Scroll event from the scrollable region with an absolute offset
    pub fn on_scroll(&mut self, offset: u32) {
        let outcome = self.scroll.on_scroll(offset);
        self.handle_outcome(outcome);
    }

    /// Relative scroll in lines. Pulling up at the top triggers a refresh.
    pub fn scroll_by(&mut self, delta: i32) {
        let outcome = self.scroll.scroll_by(delta);
        self.handle_outcome(outcome);
    }

    fn handle_outcome(&mut self, outcome: ScrollOutcome) {
        match outcome {
            ScrollOutcome::Moved(_) => self.maybe_load_more(),
            ScrollOutcome::PullRefresh => self.refresh(),
            ScrollOutcome::Unchanged => {}
        }
    }

    /// Shift the scrollable block by whole columns; the pinned column stays put
    pub fn scroll_horizontal(&mut self, delta: isize) {
        let max = self.layout().max_h_offset(self.viewport_width);
        let next = if delta < 0 {
            self.h_offset.saturating_sub(delta.unsigned_abs())
        } else {
            self.h_offset.saturating_add(delta as usize)
        };
        self.h_offset = next.min(max);
    }

    /// Move the cursor row, keeping it on screen
    pub fn move_selection(&mut self, delta: isize) {
        if self.rows.is_empty() {
            return;
        }
        let last = self.rows.len() - 1;
        let next = if delta < 0 {
            self.selected.saturating_sub(delta.unsigned_abs())
        } else {
            self.selected.saturating_add(delta as usize).min(last)
        };
        self.selected = next;
        let outcome = self.scroll.ensure_visible(next);
        self.handle_outcome(outcome);
    }

    pub fn select_first(&mut self) {
        self.move_selection(-(self.selected as isize));
    }

    pub fn select_last(&mut self) {
        let remaining = self.rows.len().saturating_sub(1 + self.selected);
        self.move_selection(remaining as isize);
    }

    /// Header press. Returns true if the sort changed.
    pub fn press_header(&mut self, column_id: &str) -> bool {
        let Some(column) = self.columns.iter().find(|c| c.id == column_id) else {
            warn!(target: "grid", "Header press on unknown column {}", column_id);
            return false;
        };

        match self.sort.press(column) {
            Some(direction) => {
                let selected_id = self.selected_row().map(|r| r.id.clone());
                self.sort.apply(&mut self.rows, &self.columns);
                if let Some(id) = selected_id {
                    self.selected = self.rows.position(&id).unwrap_or(0);
                }
                info!(target: "grid", "Sorted by {} {:?}", column_id, direction);
                true
            }
            None => {
                debug!(target: "grid", "Column {} is not sortable, ignoring", column_id);
                false
            }
        }
    }

    /// Drop the local sort; rows keep their current order until the next load
    pub fn clear_sort(&mut self) {
        self.sort.clear();
    }

    /// Header press on the column under the cursor's visual position
    /// (0 = pinned column when one exists, then visible scrollable columns).
    pub fn press_header_at(&mut self, visual_index: usize) -> bool {
        let layout = self.layout();
        let visible = layout.visible_scrollable(self.h_offset, self.viewport_width);
        let mut ids: Vec<String> = Vec::new();
        if let Some(p) = layout.pinned {
            ids.push(self.columns[p].id.clone());
        }
        for pos in visible {
            ids.push(self.columns[layout.scrollable[pos]].id.clone());
        }
        match ids.get(visual_index) {
            Some(id) => self.press_header(id),
            None => false,
        }
    }

    pub fn press_row(&mut self, index: usize) {
        self.selected = index.min(self.rows.len().saturating_sub(1));
        if let (Some(row), Some(cb)) = (self.rows.get(index), self.callbacks.on_row_press.as_mut()) {
            cb(row);
        }
    }

    pub fn edit_row(&mut self, index: usize) {
        if let (Some(row), Some(cb)) = (self.rows.get(index), self.callbacks.on_row_edit.as_mut()) {
            cb(row);
        }
    }

    /// Forward a delete request; the host removes the row once it is gone
    pub fn delete_row(&mut self, index: usize) {
        if let (Some(row), Some(cb)) = (self.rows.get(index), self.callbacks.on_row_delete.as_mut()) {
            cb(row);
        }
    }

    /// Explicit refresh trigger
    pub fn refresh(&mut self) {
        if self.refreshing {
            return;
        }
        if let Some(cb) = self.callbacks.on_refresh.as_mut() {
            info!(target: "grid", "Refresh requested");
            cb();
        }
    }

    fn maybe_load_more(&mut self) {
        if !self.scroll.is_near_end(self.load_more_threshold) {
            return;
        }
        let busy = self.loading || self.refreshing;
        if self.callbacks.on_load_more.is_none() {
            return;
        }
        if self.gate.try_request(self.has_more, busy) {
            debug!(target: "grid", "Load more at {} rows", self.rows.len());
            if let Some(cb) = self.callbacks.on_load_more.as_mut() {
                cb();
            }
        }
    }

    // ========== Queries ==========

    pub fn rows(&self) -> &[Row] {
        self.rows.rows()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_row(&self) -> Option<&Row> {
        self.rows.get(self.selected)
    }

    pub fn sort_state(&self) -> &SortState {
        &self.sort
    }

    pub fn scroll_offset(&self) -> u32 {
        self.scroll.offset()
    }

    pub fn pinned_translation(&self) -> i64 {
        self.scroll.pinned_translation()
    }

    /// Body height in lines, as last measured
    pub fn viewport_height(&self) -> u32 {
        self.scroll.viewport_height()
    }

    pub fn row_height(&self) -> u16 {
        self.scroll.row_height()
    }

    pub fn h_offset(&self) -> usize {
        self.h_offset
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_load_more_pending(&self) -> bool {
        self.gate.is_pending()
    }

    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    /// Index of the pinned column, if pinning is enabled.
    /// An explicit id wins; otherwise the first `sticky` column is used.
    pub fn pinned_index(&self) -> Option<usize> {
        match &self.pinned_column_id {
            Some(id) => self.columns.iter().position(|c| &c.id == id),
            None => self.columns.iter().position(|c| c.sticky),
        }
    }

    pub fn pinned_column(&self) -> Option<&ColumnDescriptor> {
        self.pinned_index().map(|i| &self.columns[i])
    }

    pub fn layout(&self) -> GridLayout {
        GridLayout::compute(&self.columns, self.pinned_index(), self.viewport_width)
    }

    fn header_cell(&self, column: &ColumnDescriptor, width: u16) -> HeaderCell {
        HeaderCell {
            column_id: column.id.clone(),
            label: column.label.clone(),
            width,
            align: column.align,
            sortable: column.is_sortable(),
            sort: self.sort.direction_for(&column.id),
        }
    }

    /// Build the render model for the current state
    pub fn frame(&self) -> GridFrame {
        if self.rows.is_empty() {
            if self.loading {
                return GridFrame::Loading;
            }
            return GridFrame::Empty {
                message: self.empty_message.clone(),
                action: self.empty_action.clone(),
            };
        }

        let layout = self.layout();
        let visible_cols = layout.visible_scrollable(self.h_offset, self.viewport_width);
        let row_range = self.scroll.visible_rows();

        let header: Vec<HeaderCell> = visible_cols
            .clone()
            .map(|pos| {
                let column = &self.columns[layout.scrollable[pos]];
                self.header_cell(column, layout.scrollable_widths[pos])
            })
            .collect();

        let rows: Vec<BodyRow> = row_range
            .clone()
            .filter_map(|i| self.rows.get(i).map(|row| (i, row)))
            .map(|(i, row)| BodyRow {
                index: i,
                id: row.id.clone(),
                top: self.scroll.row_top(i),
                selected: i == self.selected,
                cells: visible_cols
                    .clone()
                    .map(|pos| self.columns[layout.scrollable[pos]].cell_text(row))
                    .collect(),
            })
            .collect();

        let show_footer = self.has_more;

        // The overlay is windowed with the same row range as the body
        let pinned = layout.pinned.map(|p| {
            let column = &self.columns[p];
            PinnedOverlay {
                header: self.header_cell(column, layout.pinned_width),
                translate_y: self.scroll.pinned_translation(),
                rows: row_range
                    .clone()
                    .filter_map(|i| self.rows.get(i).map(|row| (i, row)))
                    .map(|(i, row)| BodyRow {
                        index: i,
                        id: row.id.clone(),
                        top: self.scroll.row_top(i),
                        selected: i == self.selected,
                        cells: vec![column.cell_text(row)],
                    })
                    .collect(),
                footer_lines: if show_footer { FOOTER_LINES } else { 0 },
            }
        });

        GridFrame::Table(TableFrame {
            header,
            rows,
            row_range,
            total_rows: self.rows.len(),
            row_height: self.scroll.row_height(),
            scroll_offset: self.scroll.offset(),
            pinned,
            show_footer,
            refreshing: self.refreshing,
            h_offset: self.h_offset,
            hidden_right: layout.scrollable.len().saturating_sub(visible_cols.end),
        })
    }

    /// Direction shown for a column, for renderers outside the frame model
    pub fn sort_direction_for(&self, column_id: &str) -> Option<SortDirection> {
        self.sort.direction_for(column_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn columns() -> Vec<ColumnDescriptor> {
        vec![
            ColumnDescriptor::field("title", "Title").width(12),
            ColumnDescriptor::field("status", "Status").width(8),
            ColumnDescriptor::render("actions", "", |r| format!("#{}", r.id)),
        ]
    }

    fn rows(n: usize) -> Vec<Row> {
        (1..=n)
            .map(|i| Row::new(i.to_string()).with("title", format!("Item {:03}", i)))
            .collect()
    }

    #[test]
    fn test_missing_pinned_column_falls_back() {
        let mut grid = SyncedGridView::new(columns()).with_pinned_column("nope");
        grid.replace_rows(rows(3), false);
        grid.on_resize(10, 80);
        assert!(grid.pinned_column().is_none());
        let frame = grid.frame();
        let table = frame.as_table().unwrap();
        assert!(table.pinned.is_none());
        assert_eq!(table.header.len(), 3);
    }

    #[test]
    fn test_sticky_column_used_without_explicit_id() {
        let mut cols = columns();
        cols[1] = cols[1].clone().sticky();
        let grid = SyncedGridView::new(cols);
        assert_eq!(grid.pinned_column().map(|c| c.id.as_str()), Some("status"));
    }

    #[test]
    fn test_refresh_callback_not_fired_while_refreshing() {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        let mut grid = SyncedGridView::new(columns())
            .with_callbacks(GridCallbacks::new().on_refresh(move || c.set(c.get() + 1)));
        grid.refresh();
        grid.set_refreshing(true);
        grid.refresh();
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_footer_present_only_with_more() {
        let mut grid = SyncedGridView::new(columns()).with_pinned_column("title");
        grid.on_resize(5, 80);
        grid.replace_rows(rows(3), true);
        let frame = grid.frame();
        let table = frame.as_table().unwrap();
        assert!(table.show_footer);
        assert_eq!(table.pinned.as_ref().unwrap().footer_lines, FOOTER_LINES);
    }
}
