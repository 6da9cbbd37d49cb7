// List and card views of the items. They share the grid's scroll model
// and load-more gate but have no columns, sorting or pinned region.

use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tracing::debug;

use crate::data::crud_item::ItemStatus;
use crate::data::row::Row;
use crate::data::row_set::RowSet;
use crate::grid::column::Align;
use crate::grid::scroll::{LoadMoreGate, ScrollOutcome, ScrollSync};
use crate::grid::synced_grid::DEFAULT_LOAD_MORE_THRESHOLD;
use crate::ui::grid_renderer::GridRenderStyle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListLayout {
    /// One item per entry: title line and detail line
    List,
    /// Cards, `CARDS_PER_LINE` side by side
    Cards,
}

pub const CARDS_PER_LINE: usize = 2;
const LIST_ENTRY_HEIGHT: u16 = 2;
const CARD_HEIGHT: u16 = 4;

/// What the host should do after an input event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListRequest {
    LoadMore,
    Refresh,
}

pub struct ItemListView {
    layout: ListLayout,
    rows: RowSet,
    scroll: ScrollSync,
    gate: LoadMoreGate,
    selected: usize,
    has_more: bool,
    loading: bool,
    refreshing: bool,
    load_more_threshold: f32,
}

impl ItemListView {
    pub fn new(layout: ListLayout) -> Self {
        let height = match layout {
            ListLayout::List => LIST_ENTRY_HEIGHT,
            ListLayout::Cards => CARD_HEIGHT,
        };
        Self {
            layout,
            rows: RowSet::new(),
            scroll: ScrollSync::new(height),
            gate: LoadMoreGate::new(),
            selected: 0,
            has_more: false,
            loading: false,
            refreshing: false,
            load_more_threshold: DEFAULT_LOAD_MORE_THRESHOLD,
        }
    }

    pub fn with_load_more_threshold(mut self, threshold: f32) -> Self {
        self.load_more_threshold = threshold;
        self
    }

    pub fn layout(&self) -> ListLayout {
        self.layout
    }

    fn per_line(&self) -> usize {
        match self.layout {
            ListLayout::List => 1,
            ListLayout::Cards => CARDS_PER_LINE,
        }
    }

    fn line_count(&self) -> usize {
        self.rows.len().div_ceil(self.per_line())
    }

    fn sync_content(&mut self) {
        let footer = if self.has_more && !self.rows.is_empty() { 1 } else { 0 };
        self.scroll.set_content(self.line_count(), footer);
    }

    pub fn replace_rows(&mut self, rows: Vec<Row>, has_more: bool) -> Option<ListRequest> {
        self.rows.replace(rows);
        self.has_more = has_more;
        self.selected = self.selected.min(self.rows.len().saturating_sub(1));
        self.scroll.reset();
        self.after_data_arrival()
    }

    pub fn append_page(&mut self, rows: Vec<Row>, has_more: bool) -> Option<ListRequest> {
        self.rows.append(rows);
        self.has_more = has_more;
        self.after_data_arrival()
    }

    fn after_data_arrival(&mut self) -> Option<ListRequest> {
        self.gate.on_data_arrived();
        self.sync_content();
        self.check_load_more()
    }

    pub fn on_load_failed(&mut self) {
        self.gate.on_data_arrived();
    }

    pub fn remove_row(&mut self, id: &str) {
        if self.rows.remove(id).is_some() {
            self.selected = self.selected.min(self.rows.len().saturating_sub(1));
            self.sync_content();
        }
    }

    pub fn update_row(&mut self, row: Row) {
        self.rows.update(row);
    }

    /// Finishing a load re-checks the trailing edge
    pub fn set_loading(&mut self, loading: bool) -> Option<ListRequest> {
        self.loading = loading;
        if loading {
            None
        } else {
            self.check_load_more()
        }
    }

    pub fn set_refreshing(&mut self, refreshing: bool) {
        self.refreshing = refreshing;
    }

    pub fn on_resize(&mut self, body_height: u32) -> Option<ListRequest> {
        self.scroll.set_viewport_height(body_height);
        self.check_load_more()
    }

    pub fn scroll_by(&mut self, delta: i32) -> Option<ListRequest> {
        let outcome = self.scroll.scroll_by(delta);
        self.handle_outcome(outcome)
    }

    pub fn move_selection(&mut self, delta: isize) -> Option<ListRequest> {
        if self.rows.is_empty() {
            return None;
        }
        let last = self.rows.len() - 1;
        self.selected = if delta < 0 {
            self.selected.saturating_sub(delta.unsigned_abs())
        } else {
            self.selected.saturating_add(delta as usize).min(last)
        };
        let outcome = self.scroll.ensure_visible(self.selected / self.per_line());
        self.handle_outcome(outcome)
    }

    /// Move one visual line (a full row of cards in card layout)
    pub fn move_line(&mut self, delta: isize) -> Option<ListRequest> {
        self.move_selection(delta * self.per_line() as isize)
    }

    fn handle_outcome(&mut self, outcome: ScrollOutcome) -> Option<ListRequest> {
        match outcome {
            ScrollOutcome::PullRefresh if !self.refreshing => Some(ListRequest::Refresh),
            ScrollOutcome::Moved(_) => self.check_load_more(),
            _ => None,
        }
    }

    fn check_load_more(&mut self) -> Option<ListRequest> {
        if !self.scroll.is_near_end(self.load_more_threshold) {
            return None;
        }
        if self
            .gate
            .try_request(self.has_more, self.loading || self.refreshing)
        {
            debug!(target: "list_view", "Load more at {} rows", self.rows.len());
            Some(ListRequest::LoadMore)
        } else {
            None
        }
    }

    pub fn rows(&self) -> &[Row] {
        self.rows.rows()
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_row(&self) -> Option<&Row> {
        self.rows.get(self.selected)
    }

    pub fn viewport_height(&self) -> u32 {
        self.scroll.viewport_height()
    }

    /// Items per visual line
    pub fn items_per_line(&self) -> usize {
        self.per_line()
    }

    pub fn entry_height(&self) -> u16 {
        self.scroll.row_height()
    }

    pub fn scroll_offset(&self) -> u32 {
        self.scroll.offset()
    }

    pub fn is_load_more_pending(&self) -> bool {
        self.gate.is_pending()
    }

    pub fn render(
        &self,
        f: &mut Frame,
        area: Rect,
        title: &str,
        empty_message: &str,
        style: &GridRenderStyle,
    ) {
        let palette = style.palette;
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(palette.border())
            .title(title.to_string())
            .style(palette.base());

        if self.rows.is_empty() {
            let text = if self.loading {
                format!("{} {}", style.icons.loading, style.translator.t("common.loading"))
            } else {
                format!("{} {}", style.icons.empty, empty_message)
            };
            let paragraph = Paragraph::new(text)
                .alignment(Alignment::Center)
                .style(palette.dim())
                .block(block);
            f.render_widget(paragraph, area);
            return;
        }

        let inner_width = area.width.saturating_sub(2) as usize;
        let range = self.scroll.visible_rows();
        let first_top = self.scroll.row_top(range.start);
        let mut lines: Vec<Line> = Vec::new();

        for line_index in range {
            let start = line_index * self.per_line();
            let end = (start + self.per_line()).min(self.rows.len());
            match self.layout {
                ListLayout::List => {
                    if let Some(row) = self.rows.get(start) {
                        lines.extend(self.list_entry(row, start, inner_width, style));
                    }
                }
                ListLayout::Cards => {
                    lines.extend(self.card_line(start..end, inner_width, style));
                }
            }
        }
        if self.has_more {
            lines.push(Line::styled(
                style.translator.t("common.loadingMore"),
                palette.dim(),
            ));
        }

        let skip = (self.scroll.offset() as i64 - first_top).max(0) as u16;
        f.render_widget(Paragraph::new(lines).block(block).scroll((skip, 0)), area);
    }

    fn list_entry(
        &self,
        row: &Row,
        index: usize,
        width: usize,
        style: &GridRenderStyle,
    ) -> Vec<Line<'static>> {
        let palette = style.palette;
        let selected = index == self.selected;
        let status_text = row.text("status");
        let status_style = status_text
            .parse::<ItemStatus>()
            .map(|s| palette.status_style(s))
            .unwrap_or_else(|_| palette.dim());
        let title_width = width.saturating_sub(status_text.chars().count() + 1);

        let title_style = if selected { palette.selected() } else { palette.base() };
        let first = Line::from(vec![
            Span::styled(Align::Left.fit(&row.text("title"), title_width), title_style),
            Span::raw(" "),
            Span::styled(status_text, status_style),
        ]);

        let detail = match row.text("subtitle") {
            s if s.is_empty() => row.text("category"),
            s => format!("{} · {}", s, row.text("category")),
        };
        let second = Line::styled(format!("  {}", detail), palette.dim());
        vec![first, second]
    }

    fn card_line(
        &self,
        indices: std::ops::Range<usize>,
        width: usize,
        style: &GridRenderStyle,
    ) -> Vec<Line<'static>> {
        let palette = style.palette;
        let card_width = (width / CARDS_PER_LINE).saturating_sub(1).max(4);
        let inner = card_width.saturating_sub(2);

        let mut top = Vec::new();
        let mut title = Vec::new();
        let mut meta = Vec::new();
        let mut bottom = Vec::new();

        for index in indices {
            let Some(row) = self.rows.get(index) else {
                continue;
            };
            let border = if index == self.selected {
                palette.selected()
            } else {
                palette.border()
            };
            let status = row.text("status");
            let status_style = status
                .parse::<ItemStatus>()
                .map(|s| palette.status_style(s))
                .unwrap_or_else(|_| palette.dim());

            top.push(Span::styled(format!("┌{}┐ ", "─".repeat(inner)), border));
            title.push(Span::styled("│", border));
            title.push(Span::styled(Align::Left.fit(&row.text("title"), inner), palette.base()));
            title.push(Span::styled("│ ", border));
            meta.push(Span::styled("│", border));
            meta.push(Span::styled(
                Align::Left.fit(&format!("{} · {}", status, row.text("category")), inner),
                status_style,
            ));
            meta.push(Span::styled("│ ", border));
            bottom.push(Span::styled(format!("└{}┘ ", "─".repeat(inner)), border));
        }

        vec![
            Line::from(top),
            Line::from(title),
            Line::from(meta),
            Line::from(bottom),
        ]
    }
}
