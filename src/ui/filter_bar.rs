// Query controls above the item views: view mode, sort, status filter, search

use crossterm::event::Event;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tui_input::{backend::crossterm::EventHandler, Input};

use crate::data::query::{SortOption, StatusFilter, ViewMode};
use crate::i18n::Translator;
use crate::ui::theme::Palette;

/// Status filter order when cycling with a single key
pub fn next_status_filter(current: StatusFilter) -> StatusFilter {
    match current {
        StatusFilter::All => StatusFilter::Active,
        StatusFilter::Active => StatusFilter::Draft,
        StatusFilter::Draft => StatusFilter::Archived,
        StatusFilter::Archived => StatusFilter::All,
    }
}

fn status_key(filter: StatusFilter) -> &'static str {
    match filter {
        StatusFilter::All => "crud.statuses.all",
        StatusFilter::Active => "crud.statuses.active",
        StatusFilter::Archived => "crud.statuses.archived",
        StatusFilter::Draft => "crud.statuses.draft",
    }
}

/// Label for a sort option, falling back to the column id for column sorts
pub fn sort_label(sort: &SortOption, t: &Translator) -> String {
    let key = format!("crud.sortOptions.{}", sort.id());
    if t.has(&key) {
        t.t(&key)
    } else {
        sort.id().to_string()
    }
}

pub struct FilterBar {
    search: Input,
    /// Search text before editing started, restored on cancel
    committed: String,
    pub editing: bool,
    pub status: StatusFilter,
}

impl Default for FilterBar {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterBar {
    pub fn new() -> Self {
        Self {
            search: Input::default(),
            committed: String::new(),
            editing: false,
            status: StatusFilter::All,
        }
    }

    pub fn with_search(mut self, search: &str) -> Self {
        self.search = Input::new(search.to_string());
        self.committed = search.to_string();
        self
    }

    pub fn start_search(&mut self) {
        self.editing = true;
        let len = self.search.value().chars().count();
        self.search = Input::new(self.search.value().to_string()).with_cursor(len);
    }

    pub fn handle_event(&mut self, event: &Event) {
        if self.editing {
            self.search.handle_event(event);
        }
    }

    /// Finish editing. Returns the new search text if it changed.
    pub fn commit_search(&mut self) -> Option<Option<String>> {
        self.editing = false;
        let value = self.search.value().trim().to_string();
        if value == self.committed {
            return None;
        }
        self.committed = value.clone();
        Some((!value.is_empty()).then_some(value))
    }

    pub fn cancel_search(&mut self) {
        self.editing = false;
        self.search = Input::new(self.committed.clone());
    }

    pub fn search_text(&self) -> &str {
        self.search.value()
    }

    pub fn cycle_status(&mut self) -> StatusFilter {
        self.status = next_status_filter(self.status);
        self.status
    }

    pub fn render(
        &self,
        f: &mut Frame,
        area: Rect,
        view: ViewMode,
        sort: &SortOption,
        palette: &Palette,
        t: &Translator,
    ) {
        let label = |text: String| Span::styled(text, palette.dim());
        let value = |text: String| Span::styled(text, palette.accent());

        let mut spans = vec![
            label(format!("{}: ", t.t("crud.view"))),
            value(view.as_str().to_string()),
            Span::raw("  "),
            label(format!("{}: ", t.t("crud.sort"))),
            value(sort_label(sort, t)),
            Span::raw("  "),
            label(format!("{}: ", t.t("crud.status"))),
            value(t.t(status_key(self.status))),
            Span::raw("  "),
            label(format!("{}: ", t.t("crud.search"))),
        ];

        let search = self.search.value();
        if search.is_empty() && !self.editing {
            spans.push(Span::styled(t.t("crud.searchPlaceholder"), palette.dim()));
        } else {
            spans.push(Span::styled(search.to_string(), palette.base()));
        }

        let border = if self.editing {
            palette.accent()
        } else {
            palette.border()
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .style(palette.base());

        if self.editing {
            // Cursor sits after the fixed prefix spans
            let prefix: usize = spans[..spans.len() - 1]
                .iter()
                .map(|s| s.content.chars().count())
                .sum();
            let x = area.x + 1 + (prefix + self.search.visual_cursor()) as u16;
            f.set_cursor_position((x.min(area.right().saturating_sub(2)), area.y + 1));
        }

        f.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
    }
}
