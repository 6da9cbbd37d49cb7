// Terminal front end for the item list: table/list/card views, detail page,
// create/edit form, delete prompt and the theme/tint/language toggles.

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyEvent, KeyEventKind,
        MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame, Terminal,
};
use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::data::crud_item::CrudItem;
use crate::data::query::{StatusFilter, ViewMode};
use crate::data::row::Row;
use crate::grid::column::Align;
use crate::grid::frame::HeaderCell;
use crate::grid::{ColumnDescriptor, GridCallbacks, SyncedGridView};
use crate::i18n::Translator;
use crate::preferences::language_context::LanguageContext;
use crate::preferences::theme_context::ThemeContext;
use crate::services::{CrudItemsService, ServiceEvent};
use crate::ui::actions::{Action, AppMode, NavigateAction};
use crate::ui::detail_view::{render_detail, FormMode, ItemForm};
use crate::ui::filter_bar::{sort_label, FilterBar};
use crate::ui::grid_renderer::{body_height, body_width, header_label, render_grid, GridRenderStyle};
use crate::ui::key_mapper::KeyMapper;
use crate::ui::list_view::{ItemListView, ListLayout, ListRequest};
use crate::ui::theme::Palette;
use crate::utils::logging::get_log_buffer;

/// Lines moved per mouse wheel notch
const WHEEL_LINES: i32 = 3;
/// Upper bound on follow-up request rounds handled per input
const MAX_REQUEST_ROUNDS: usize = 8;

/// Requests raised by the item views, handled after the triggering input
#[derive(Debug, Clone, PartialEq, Eq)]
enum ViewRequest {
    LoadMore,
    Refresh,
    Open(String),
    Edit(String),
    Delete(String),
}

type RequestQueue = Rc<RefCell<Vec<ViewRequest>>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

struct PendingDelete {
    id: String,
    title: String,
}

struct Areas {
    filter: Rect,
    body: Rect,
    status: Rect,
}

fn split_areas(area: Rect) -> Areas {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);
    Areas {
        filter: chunks[0],
        body: chunks[1],
        status: chunks[2],
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

/// Columns of the table view. Title is sticky so it pins even without config.
pub fn item_columns(t: &Translator) -> Vec<ColumnDescriptor> {
    let actions = format!("e {}  d {}", t.t("common.edit"), t.t("common.delete"));
    vec![
        ColumnDescriptor::field("title", t.t("crud.fields.title"))
            .width(24)
            .sticky(),
        ColumnDescriptor::field("status", t.t("crud.fields.status")).width(10),
        ColumnDescriptor::field("category", t.t("crud.fields.category")).width(13),
        ColumnDescriptor::field("subtitle", t.t("crud.fields.subtitle"))
            .min_width(16)
            .flex(1),
        ColumnDescriptor::field("created_at", t.t("crud.fields.created_at")).width(20),
        ColumnDescriptor::field("updated_at", t.t("crud.fields.updated_at")).width(20),
        ColumnDescriptor::render("actions", t.t("crud.fields.actions"), move |_| actions.clone())
            .width(18)
            .align(Align::Center),
    ]
}

fn grid_callbacks(queue: &RequestQueue) -> GridCallbacks {
    let load_more = Rc::clone(queue);
    let refresh = Rc::clone(queue);
    let press = Rc::clone(queue);
    let edit = Rc::clone(queue);
    let delete = Rc::clone(queue);
    GridCallbacks::new()
        .on_load_more(move || load_more.borrow_mut().push(ViewRequest::LoadMore))
        .on_refresh(move || refresh.borrow_mut().push(ViewRequest::Refresh))
        .on_row_press(move |row: &Row| press.borrow_mut().push(ViewRequest::Open(row.id.clone())))
        .on_row_edit(move |row: &Row| edit.borrow_mut().push(ViewRequest::Edit(row.id.clone())))
        .on_row_delete(move |row: &Row| {
            delete
                .borrow_mut()
                .push(ViewRequest::Delete(row.id.clone()))
        })
}

pub struct CrudApp {
    config: Config,
    theme: ThemeContext,
    language: LanguageContext,
    translator: Translator,
    service: CrudItemsService,

    /// Table view
    grid: SyncedGridView,
    /// List and card views
    list: ItemListView,
    requests: RequestQueue,
    view_mode: ViewMode,

    filter_bar: FilterBar,
    key_mapper: KeyMapper,
    mode: AppMode,
    /// Mode to go back to when help or debug closes
    return_mode: AppMode,
    /// Visual index of the header under the sort cursor (table view)
    header_cursor: usize,

    detail: Option<CrudItem>,
    form: Option<ItemForm>,
    pending_delete: Option<PendingDelete>,
    status: Option<StatusMessage>,
    screen: Rect,
}

impl CrudApp {
    pub fn new(
        config: Config,
        service: CrudItemsService,
        theme: ThemeContext,
        language: LanguageContext,
    ) -> Self {
        let translator = language.translator();
        let requests: RequestQueue = Rc::new(RefCell::new(Vec::new()));

        let mut grid = SyncedGridView::new(item_columns(&translator))
            .with_row_height(config.grid.row_height)
            .with_load_more_threshold(config.grid.load_more_threshold)
            .with_empty_state(
                translator.t("crud.empty"),
                Some(translator.t("crud.emptyAction")),
            )
            .with_callbacks(grid_callbacks(&requests));
        if let Some(pinned) = &config.grid.pinned_column {
            grid = grid.with_pinned_column(pinned.clone());
        }

        let view_mode = config.display.default_view;
        let list = Self::new_list_view(view_mode, &config);

        let mut filter_bar = FilterBar::new()
            .with_search(service.filters().search_text().unwrap_or_default());
        if let Some(status) = service.filters().status.first() {
            filter_bar.status = *status;
        }

        Self {
            config,
            theme,
            language,
            translator,
            service,
            grid,
            list,
            requests,
            view_mode,
            filter_bar,
            key_mapper: KeyMapper::new(),
            mode: AppMode::Browse,
            return_mode: AppMode::Browse,
            header_cursor: 0,
            detail: None,
            form: None,
            pending_delete: None,
            status: None,
            screen: Rect::default(),
        }
    }

    fn new_list_view(view_mode: ViewMode, config: &Config) -> ItemListView {
        let layout = match view_mode {
            ViewMode::Grid => ListLayout::Cards,
            _ => ListLayout::List,
        };
        ItemListView::new(layout).with_load_more_threshold(config.grid.load_more_threshold)
    }

    // ========== Lifecycle ==========

    pub fn run(mut self) -> Result<()> {
        if let Err(e) = enable_raw_mode() {
            return Err(anyhow::anyhow!("Failed to enable raw mode: {}", e));
        }

        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen, EnableMouseCapture) {
            let _ = disable_raw_mode();
            return Err(anyhow::anyhow!("Failed to setup terminal: {}", e));
        }

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = match Terminal::new(backend) {
            Ok(t) => t,
            Err(e) => {
                let _ = disable_raw_mode();
                return Err(anyhow::anyhow!("Failed to create terminal: {}", e));
            }
        };

        let res = self.run_app(&mut terminal);

        // Always restore terminal, even on error
        let _ = disable_raw_mode();
        let _ = execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        );
        let _ = terminal.show_cursor();

        res.map_err(|e| anyhow::anyhow!("TUI error: {}", e))
    }

    fn run_app<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        let size = terminal.size()?;
        self.resize(Rect::new(0, 0, size.width, size.height));
        self.start();
        terminal.draw(|f| self.ui(f))?;

        loop {
            let mut dirty = self.tick();

            if event::poll(Duration::from_millis(50))? {
                match event::read()? {
                    Event::Key(key) => {
                        // Windows reports releases too
                        if key.kind != KeyEventKind::Press {
                            continue;
                        }
                        if self.handle_key(key)? {
                            break;
                        }
                        dirty = true;
                    }
                    Event::Mouse(mouse) => {
                        dirty |= self.handle_mouse(mouse.kind);
                    }
                    Event::Resize(width, height) => {
                        self.resize(Rect::new(0, 0, width, height));
                        dirty = true;
                    }
                    _ => {}
                }
            }

            if dirty {
                terminal.draw(|f| self.ui(f))?;
            }
        }

        info!(target: "app", "Exiting");
        Ok(())
    }

    /// Kick off the first page
    pub fn start(&mut self) {
        self.service.start();
        self.sync_loading_flags();
    }

    /// Apply completed fetches and queued view requests.
    /// Returns true when something changed on screen.
    pub fn tick(&mut self) -> bool {
        let events = self.service.poll();
        let changed = !events.is_empty();
        for event in events {
            self.apply_service_event(event);
        }
        self.process_requests();
        changed
    }

    /// Measure the views for a terminal of `area`
    pub fn resize(&mut self, area: Rect) {
        self.screen = area;
        let body = split_areas(area).body;
        match self.view_mode {
            ViewMode::Table => self.grid.on_resize(body_height(body), body_width(body)),
            ViewMode::List | ViewMode::Grid => {
                let request = self.list.on_resize(body.height.saturating_sub(2) as u32);
                self.queue_list_request(request);
            }
        }
    }

    // ========== Service and view plumbing ==========

    fn apply_service_event(&mut self, event: ServiceEvent) {
        match event {
            ServiceEvent::PageLoaded {
                replace,
                rows,
                has_more,
            } => {
                debug!(target: "app", "Page loaded: replace={} rows={} has_more={}", replace, rows.len(), has_more);
                match self.view_mode {
                    ViewMode::Table => {
                        if replace {
                            self.grid.replace_rows(rows, has_more);
                        } else {
                            self.grid.append_page(rows, has_more);
                        }
                    }
                    ViewMode::List | ViewMode::Grid => {
                        let request = if replace {
                            self.list.replace_rows(rows, has_more)
                        } else {
                            self.list.append_page(rows, has_more)
                        };
                        self.queue_list_request(request);
                    }
                }
                self.sync_loading_flags();
            }
            ServiceEvent::Failed(message) => {
                self.sync_loading_flags();
                match self.view_mode {
                    ViewMode::Table => self.grid.on_load_failed(),
                    ViewMode::List | ViewMode::Grid => self.list.on_load_failed(),
                }
                self.set_error(format!("{}: {}", self.translator.t("common.error"), message));
            }
        }
    }

    /// Mirror the service's loading state into the active view
    fn sync_loading_flags(&mut self) {
        let loading = self.service.is_loading();
        let refreshing = self.service.is_refreshing();
        match self.view_mode {
            ViewMode::Table => {
                self.grid.set_refreshing(refreshing);
                self.grid.set_loading(loading);
            }
            ViewMode::List | ViewMode::Grid => {
                self.list.set_refreshing(refreshing);
                let request = self.list.set_loading(loading);
                self.queue_list_request(request);
            }
        }
    }

    fn queue_list_request(&mut self, request: Option<ListRequest>) {
        if let Some(request) = request {
            let request = match request {
                ListRequest::LoadMore => ViewRequest::LoadMore,
                ListRequest::Refresh => ViewRequest::Refresh,
            };
            self.requests.borrow_mut().push(request);
        }
    }

    fn process_requests(&mut self) {
        // Handling a request can queue another (e.g. a row press opening the detail)
        for _ in 0..MAX_REQUEST_ROUNDS {
            let pending: Vec<ViewRequest> = self.requests.borrow_mut().drain(..).collect();
            if pending.is_empty() {
                return;
            }
            for request in pending {
                self.handle_request(request);
            }
        }
        warn!(target: "app", "View requests still queued after {} rounds", MAX_REQUEST_ROUNDS);
    }

    fn handle_request(&mut self, request: ViewRequest) {
        debug!(target: "app", "View request {:?}", request);
        match request {
            ViewRequest::LoadMore => {
                // Refused requests leave nothing to arrive, so re-arm the view
                if !self.service.load_more() {
                    match self.view_mode {
                        ViewMode::Table => self.grid.on_load_failed(),
                        ViewMode::List | ViewMode::Grid => self.list.on_load_failed(),
                    }
                }
            }
            ViewRequest::Refresh => {
                self.service.refresh();
                self.sync_loading_flags();
            }
            ViewRequest::Open(id) => self.open_detail(&id),
            ViewRequest::Edit(id) => self.open_edit(&id),
            ViewRequest::Delete(id) => self.request_delete(&id),
        }
    }

    fn set_view_mode(&mut self, view_mode: ViewMode) {
        self.view_mode = view_mode;
        self.header_cursor = 0;
        let rows = self.service.rows();
        let has_more = self.service.has_more();

        match view_mode {
            ViewMode::Table => self.grid.replace_rows(rows, has_more),
            ViewMode::List | ViewMode::Grid => {
                self.list = Self::new_list_view(view_mode, &self.config);
                let request = self.list.replace_rows(rows, has_more);
                self.queue_list_request(request);
            }
        }
        self.resize(self.screen);
        self.sync_loading_flags();
        info!(target: "app", "View mode {}", view_mode.as_str());
    }

    fn find_item(&mut self, id: &str) -> Option<CrudItem> {
        if let Some(item) = self.service.item(id) {
            return Some(item.clone());
        }
        match self.service.get(id) {
            Ok(item) => item,
            Err(e) => {
                error!(target: "app", "Failed to load item {}: {}", id, e);
                self.set_error(e.to_string());
                None
            }
        }
    }

    // ========== Input ==========

    /// Handle one key press. Returns true when the app should exit.
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        let exit = match self.key_mapper.map_key(key, self.mode) {
            Some(action) => {
                debug!(target: "app", "{:?} -> {:?}", self.mode, action);
                self.handle_action(action)
            }
            None => {
                self.forward_key(key);
                false
            }
        };
        self.process_requests();
        Ok(exit)
    }

    /// Mouse wheel scrolls the active view
    pub fn handle_mouse(&mut self, kind: MouseEventKind) -> bool {
        if self.mode != AppMode::Browse {
            return false;
        }
        let delta = match kind {
            MouseEventKind::ScrollDown => WHEEL_LINES,
            MouseEventKind::ScrollUp => -WHEEL_LINES,
            _ => return false,
        };
        self.scroll_active_view(delta);
        self.process_requests();
        true
    }

    fn forward_key(&mut self, key: KeyEvent) {
        let event = Event::Key(key);
        match self.mode {
            AppMode::Search => self.filter_bar.handle_event(&event),
            AppMode::Form => {
                if let Some(form) = self.form.as_mut() {
                    form.error = None;
                    form.handle_event(&event);
                }
            }
            _ => {}
        }
    }

    fn handle_action(&mut self, action: Action) -> bool {
        match action {
            Action::Quit | Action::ForceQuit => return true,
            Action::Navigate(nav) => self.navigate(nav),
            Action::HeaderCursorLeft => {
                self.header_cursor = self.header_cursor.saturating_sub(1);
            }
            Action::HeaderCursorRight => {
                let last = self.visible_headers().len().saturating_sub(1);
                self.header_cursor = (self.header_cursor + 1).min(last);
            }
            Action::PressHeader => self.press_header(),
            Action::OpenSelected => self.open_selected(),
            Action::EditSelected => self.edit_selected(),
            Action::DeleteSelected => self.delete_selected(),
            Action::CreateItem => {
                self.form = Some(ItemForm::create());
                self.mode = AppMode::Form;
            }
            Action::StartSearch => {
                self.filter_bar.start_search();
                self.mode = AppMode::Search;
            }
            Action::CycleSort => {
                let next = self.service.sort().next();
                self.grid.clear_sort();
                self.service.set_sort(next);
                self.sync_loading_flags();
                let label = sort_label(self.service.sort(), &self.translator);
                self.set_info(format!("{}: {}", self.translator.t("crud.sort"), label));
            }
            Action::CycleStatusFilter => {
                let status = self.filter_bar.cycle_status();
                let mut filters = self.service.filters().clone();
                filters.status = match status {
                    StatusFilter::All => Vec::new(),
                    other => vec![other],
                };
                self.service.set_filters(filters);
                self.sync_loading_flags();
            }
            Action::CycleViewMode => self.set_view_mode(self.view_mode.cycle()),
            Action::Refresh => self.refresh_active_view(),
            Action::CycleTheme => self.cycle_theme(),
            Action::CycleTint => self.cycle_tint(),
            Action::ToggleLanguage => self.toggle_language(),
            Action::NextField => {
                if let Some(form) = self.form.as_mut() {
                    form.next_field();
                }
            }
            Action::PreviousField => {
                if let Some(form) = self.form.as_mut() {
                    form.previous_field();
                }
            }
            Action::Submit => match self.mode {
                AppMode::Search => self.submit_search(),
                AppMode::Form => self.submit_form(),
                _ => {}
            },
            Action::Confirm => self.confirm_delete(),
            Action::Cancel => self.cancel(),
            Action::ShowHelp => self.show_overlay(AppMode::Help),
            Action::ShowDebugInfo => self.show_overlay(AppMode::Debug),
            Action::ExitCurrentMode => self.exit_current_mode(),
        }
        false
    }

    fn show_overlay(&mut self, overlay: AppMode) {
        if self.mode != AppMode::Help && self.mode != AppMode::Debug {
            self.return_mode = self.mode;
        }
        self.mode = overlay;
    }

    /// Where to land after a form or prompt closes
    fn base_mode(&self) -> AppMode {
        if self.detail.is_some() {
            AppMode::Detail
        } else {
            AppMode::Browse
        }
    }

    fn exit_current_mode(&mut self) {
        match self.mode {
            AppMode::Help | AppMode::Debug => self.mode = self.return_mode,
            AppMode::Detail => {
                self.detail = None;
                self.mode = AppMode::Browse;
            }
            _ => self.status = None,
        }
    }

    fn cancel(&mut self) {
        match self.mode {
            AppMode::Search => {
                self.filter_bar.cancel_search();
                self.mode = AppMode::Browse;
            }
            AppMode::Form => {
                self.form = None;
                self.mode = self.base_mode();
            }
            AppMode::ConfirmDelete => {
                self.pending_delete = None;
                self.mode = self.base_mode();
            }
            _ => {}
        }
    }

    fn navigate(&mut self, nav: NavigateAction) {
        use NavigateAction::*;

        if self.mode != AppMode::Browse {
            return;
        }

        match self.view_mode {
            ViewMode::Table => match nav {
                Up(n) => self.grid.move_selection(-(n as isize)),
                Down(n) => self.grid.move_selection(n as isize),
                Left(n) => self.grid.scroll_horizontal(-(n as isize)),
                Right(n) => self.grid.scroll_horizontal(n as isize),
                PageUp => self.page_grid(-1),
                PageDown => self.page_grid(1),
                Home => self.grid.select_first(),
                End => self.grid.select_last(),
            },
            ViewMode::List | ViewMode::Grid => {
                let cards = self.list.layout() == ListLayout::Cards;
                let len = self.list.rows().len() as isize;
                let request = match nav {
                    Up(n) => self.list.move_line(-(n as isize)),
                    Down(n) => self.list.move_line(n as isize),
                    Left(n) if cards => self.list.move_selection(-(n as isize)),
                    Right(n) if cards => self.list.move_selection(n as isize),
                    Left(_) | Right(_) => None,
                    PageUp => self.page_list(-1),
                    PageDown => self.page_list(1),
                    Home => self.list.move_selection(-len),
                    End => self.list.move_selection(len),
                };
                self.queue_list_request(request);
            }
        }
    }

    /// Scroll a page and move the cursor with it. Paging up at the top
    /// overscrolls, which pulls to refresh.
    fn page_grid(&mut self, direction: i32) {
        let lines = self.grid.viewport_height().max(1) as i32;
        let rows = (lines / self.grid.row_height().max(1) as i32).max(1);
        self.grid.scroll_by(direction * lines);
        self.grid.move_selection((direction * rows) as isize);
    }

    fn page_list(&mut self, direction: i32) -> Option<ListRequest> {
        let lines = self.list.viewport_height().max(1) as i32;
        let entries = (lines / self.list.entry_height().max(1) as i32).max(1);
        let scrolled = self.list.scroll_by(direction * lines);
        let moved = self.list.move_line((direction * entries) as isize);
        scrolled.or(moved)
    }

    fn scroll_active_view(&mut self, delta: i32) {
        match self.view_mode {
            ViewMode::Table => self.grid.scroll_by(delta),
            ViewMode::List | ViewMode::Grid => {
                let request = self.list.scroll_by(delta);
                self.queue_list_request(request);
            }
        }
    }

    fn refresh_active_view(&mut self) {
        match self.view_mode {
            ViewMode::Table => self.grid.refresh(),
            ViewMode::List | ViewMode::Grid => {
                self.queue_list_request(Some(ListRequest::Refresh));
            }
        }
    }

    /// Headers in visual order: pinned first, then the visible scrollable ones
    fn visible_headers(&self) -> Vec<HeaderCell> {
        if self.view_mode != ViewMode::Table {
            return Vec::new();
        }
        let frame = self.grid.frame();
        let Some(table) = frame.as_table() else {
            return Vec::new();
        };
        let mut headers = Vec::with_capacity(table.header.len() + 1);
        if let Some(pinned) = &table.pinned {
            headers.push(pinned.header.clone());
        }
        headers.extend(table.header.iter().cloned());
        headers
    }

    fn press_header(&mut self) {
        let Some(cell) = self.visible_headers().into_iter().nth(self.header_cursor) else {
            return;
        };
        if self.grid.press_header_at(self.header_cursor) {
            let mut sorted = cell;
            sorted.sort = self.grid.sort_direction_for(&sorted.column_id);
            let label = header_label(&sorted, &self.config.display.icons);
            self.set_info(format!("{}: {}", self.translator.t("crud.sort"), label));
        }
    }

    fn selected_row_id(&self) -> Option<String> {
        match self.view_mode {
            ViewMode::Table => self.grid.selected_row().map(|r| r.id.clone()),
            ViewMode::List | ViewMode::Grid => self.list.selected_row().map(|r| r.id.clone()),
        }
    }

    fn open_selected(&mut self) {
        match self.view_mode {
            ViewMode::Table => self.grid.press_row(self.grid.selected_index()),
            ViewMode::List | ViewMode::Grid => {
                if let Some(id) = self.selected_row_id() {
                    self.requests.borrow_mut().push(ViewRequest::Open(id));
                }
            }
        }
    }

    fn edit_selected(&mut self) {
        if self.mode == AppMode::Detail {
            if let Some(id) = self.detail.as_ref().map(|d| d.id.clone()) {
                self.open_edit(&id);
            }
            return;
        }
        match self.view_mode {
            ViewMode::Table => self.grid.edit_row(self.grid.selected_index()),
            ViewMode::List | ViewMode::Grid => {
                if let Some(id) = self.selected_row_id() {
                    self.requests.borrow_mut().push(ViewRequest::Edit(id));
                }
            }
        }
    }

    fn delete_selected(&mut self) {
        if self.mode == AppMode::Detail {
            if let Some(id) = self.detail.as_ref().map(|d| d.id.clone()) {
                self.request_delete(&id);
            }
            return;
        }
        match self.view_mode {
            ViewMode::Table => self.grid.delete_row(self.grid.selected_index()),
            ViewMode::List | ViewMode::Grid => {
                if let Some(id) = self.selected_row_id() {
                    self.requests.borrow_mut().push(ViewRequest::Delete(id));
                }
            }
        }
    }

    fn open_detail(&mut self, id: &str) {
        if let Some(item) = self.find_item(id) {
            self.detail = Some(item);
            self.mode = AppMode::Detail;
        } else {
            warn!(target: "app", "Item {} not found", id);
        }
    }

    fn open_edit(&mut self, id: &str) {
        if let Some(item) = self.find_item(id) {
            self.form = Some(ItemForm::edit(&item));
            self.mode = AppMode::Form;
        }
    }

    fn request_delete(&mut self, id: &str) {
        let title = self
            .find_item(id)
            .map(|item| item.title)
            .unwrap_or_else(|| id.to_string());
        self.pending_delete = Some(PendingDelete {
            id: id.to_string(),
            title,
        });
        self.mode = AppMode::ConfirmDelete;
    }

    fn confirm_delete(&mut self) {
        let Some(pending) = self.pending_delete.take() else {
            self.mode = self.base_mode();
            return;
        };

        match self.service.delete(&pending.id) {
            Ok(()) => {
                self.grid.remove_row(&pending.id);
                self.list.remove_row(&pending.id);
                if self.detail.as_ref().is_some_and(|d| d.id == pending.id) {
                    self.detail = None;
                }
                let text = self
                    .translator
                    .t_with("crud.deleted", &[("title", pending.title.as_str())]);
                self.set_info(text);
            }
            Err(e) => {
                error!(target: "app", "Delete failed: {}", e);
                self.set_error(e.to_string());
            }
        }
        self.mode = self.base_mode();
    }

    fn submit_search(&mut self) {
        if let Some(search) = self.filter_bar.commit_search() {
            self.service.set_search(search);
            self.sync_loading_flags();
        }
        self.mode = AppMode::Browse;
    }

    fn submit_form(&mut self) {
        let Some(mut form) = self.form.take() else {
            return;
        };

        match form.mode.clone() {
            FormMode::Create => {
                match form
                    .to_create_input()
                    .and_then(|input| self.service.create(&input))
                {
                    Ok(item) => {
                        let text = self
                            .translator
                            .t_with("crud.created", &[("title", item.title.as_str())]);
                        self.set_info(text);
                        self.mode = self.base_mode();
                        // New items land in server order on the next page 0
                        self.service.refresh();
                        self.sync_loading_flags();
                    }
                    Err(e) => {
                        form.error = Some(e.to_string());
                        self.form = Some(form);
                    }
                }
            }
            FormMode::Edit(id) => {
                let update = match form.to_update_input() {
                    Ok(update) => update,
                    Err(e) => {
                        form.error = Some(e.to_string());
                        self.form = Some(form);
                        return;
                    }
                };
                if update.is_empty() {
                    self.mode = self.base_mode();
                    return;
                }
                match self.service.update(&id, &update) {
                    Ok(item) => {
                        let text = self
                            .translator
                            .t_with("crud.updated", &[("title", item.title.as_str())]);
                        self.apply_updated_item(item);
                        self.set_info(text);
                        self.mode = self.base_mode();
                    }
                    Err(e) => {
                        form.error = Some(e.to_string());
                        self.form = Some(form);
                    }
                }
            }
        }
    }

    fn apply_updated_item(&mut self, item: CrudItem) {
        let row = item.to_row();
        self.grid.update_row(row.clone());
        self.list.update_row(row);
        if self.detail.as_ref().is_some_and(|d| d.id == item.id) {
            self.detail = Some(item);
        }
    }

    // ========== Preferences ==========

    fn cycle_theme(&mut self) {
        let next = self.theme.mode().next();
        if let Err(e) = self.theme.set_theme(next) {
            warn!(target: "app", "Theme not saved: {}", e);
        }
        let key = if self.theme.read().is_dark {
            "settings.usingDarkTheme"
        } else {
            "settings.usingLightTheme"
        };
        let mode = self.translator.t(&format!("settings.{}", next.as_str()));
        self.set_info(format!("{} ({})", self.translator.t(key), mode));
    }

    fn cycle_tint(&mut self) {
        let next = self.theme.tint().next();
        if let Err(e) = self.theme.set_tint(next) {
            warn!(target: "app", "Tint not saved: {}", e);
        }
        self.set_info(format!(
            "{}: {} {}",
            self.translator.t("settings.accentColor"),
            next.swatch(),
            next.label()
        ));
    }

    fn toggle_language(&mut self) {
        let next = self.language.language().next();
        if let Err(e) = self.language.set_language(next) {
            warn!(target: "app", "Language not saved: {}", e);
        }
        self.translator = self.language.translator();
        self.grid.set_columns(item_columns(&self.translator));
        self.grid.set_empty_state(
            self.translator.t("crud.empty"),
            Some(self.translator.t("crud.emptyAction")),
        );
        self.set_info(format!(
            "{}: {}",
            self.translator.t("settings.language"),
            next.native_name()
        ));
    }

    fn set_info(&mut self, text: String) {
        info!(target: "app", "{}", text);
        self.status = Some(StatusMessage {
            text,
            is_error: false,
        });
    }

    fn set_error(&mut self, text: String) {
        self.status = Some(StatusMessage {
            text,
            is_error: true,
        });
    }

    // ========== State ==========

    pub fn mode(&self) -> AppMode {
        self.mode
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    pub fn grid(&self) -> &SyncedGridView {
        &self.grid
    }

    pub fn list(&self) -> &ItemListView {
        &self.list
    }

    pub fn service(&self) -> &CrudItemsService {
        &self.service
    }

    pub fn detail(&self) -> Option<&CrudItem> {
        self.detail.as_ref()
    }

    pub fn form(&self) -> Option<&ItemForm> {
        self.form.as_ref()
    }

    pub fn status_message(&self) -> Option<&StatusMessage> {
        self.status.as_ref()
    }

    pub fn translator(&self) -> &Translator {
        &self.translator
    }

    pub fn header_cursor(&self) -> usize {
        self.header_cursor
    }

    // ========== Rendering ==========

    pub fn ui(&self, f: &mut Frame) {
        let palette = self.theme.palette();
        let area = f.area();
        let areas = split_areas(area);
        f.render_widget(Block::default().style(palette.base()), area);

        self.filter_bar.render(
            f,
            areas.filter,
            self.view_mode,
            self.service.sort(),
            &palette,
            &self.translator,
        );

        match &self.detail {
            Some(item) => render_detail(f, areas.body, item, &palette, &self.translator),
            None => self.render_items(f, areas.body, &palette),
        }

        self.render_status_line(f, areas.status, &palette);

        match self.mode {
            AppMode::Form => {
                if let Some(form) = &self.form {
                    form.render(f, centered_rect(60, 80, area), &palette, &self.translator);
                }
            }
            AppMode::ConfirmDelete => self.render_confirm(f, area, &palette),
            AppMode::Help => self.render_help(f, area, &palette),
            AppMode::Debug => self.render_debug(f, area, &palette),
            _ => {}
        }
    }

    fn items_title(&self) -> String {
        let count = match self.view_mode {
            ViewMode::Table => self.grid.row_count(),
            ViewMode::List | ViewMode::Grid => self.list.rows().len(),
        };
        let count = count.to_string();
        let total = self.service.total().to_string();
        format!(
            "{} ({})",
            self.translator.t("crud.title"),
            self.translator.t_with(
                "crud.count",
                &[("count", count.as_str()), ("total", total.as_str())]
            )
        )
    }

    fn render_items(&self, f: &mut Frame, area: Rect, palette: &Palette) {
        let style = GridRenderStyle {
            palette,
            icons: &self.config.display.icons,
            translator: &self.translator,
        };
        let title = self.items_title();
        match self.view_mode {
            ViewMode::Table => render_grid(f, area, &self.grid.frame(), &title, &style),
            ViewMode::List | ViewMode::Grid => {
                self.list
                    .render(f, area, &title, &self.translator.t("crud.empty"), &style)
            }
        }
    }

    fn render_status_line(&self, f: &mut Frame, area: Rect, palette: &Palette) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(10), Constraint::Length(40)])
            .split(area);

        let left = match (&self.status, self.service.error()) {
            (Some(status), _) => {
                let style = if status.is_error {
                    palette.error()
                } else {
                    palette.accent()
                };
                Line::styled(status.text.clone(), style)
            }
            (None, Some(error)) => Line::styled(
                format!("{} {}", self.config.display.icons.error, error),
                palette.error(),
            ),
            (None, None) => Line::styled("F1 help  q quit", palette.dim()),
        };
        f.render_widget(Paragraph::new(left), chunks[0]);

        let mut right = vec![Span::styled(format!("{:?}", self.mode), palette.dim())];
        if self.mode == AppMode::Browse && self.view_mode == ViewMode::Table {
            if let Some(cell) = self.visible_headers().get(self.header_cursor) {
                right.push(Span::styled(format!("  [{}]", cell.label), palette.accent()));
            }
        }
        let count = self.key_mapper.pending_count();
        if !count.is_empty() {
            right.push(Span::styled(format!("  {}", count), palette.accent()));
        }
        let tint = self.theme.tint();
        right.push(Span::styled(format!("  {}", tint.swatch()), palette.accent()));
        f.render_widget(
            Paragraph::new(Line::from(right)).alignment(Alignment::Right),
            chunks[1],
        );
    }

    fn render_confirm(&self, f: &mut Frame, area: Rect, palette: &Palette) {
        let Some(pending) = &self.pending_delete else {
            return;
        };
        let popup = centered_rect(50, 20, area);
        f.render_widget(Clear, popup);
        let text = self
            .translator
            .t_with("crud.confirmDelete", &[("title", pending.title.as_str())]);
        let paragraph = Paragraph::new(vec![Line::from(""), Line::styled(text, palette.base())])
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(palette.error())
                    .title(self.translator.t("common.delete"))
                    .style(palette.base()),
            );
        f.render_widget(paragraph, popup);
    }

    fn render_help(&self, f: &mut Frame, area: Rect, palette: &Palette) {
        let popup = centered_rect(70, 70, area);
        f.render_widget(Clear, popup);
        let lines: Vec<Line> = self
            .translator
            .t("help.keys")
            .split("  ")
            .map(|entry| Line::styled(entry.to_string(), palette.base()))
            .collect();
        let help = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(palette.accent())
                .title("Help")
                .style(palette.base()),
        );
        f.render_widget(help, popup);
    }

    fn render_debug(&self, f: &mut Frame, area: Rect, palette: &Palette) {
        let popup = centered_rect(90, 90, area);
        f.render_widget(Clear, popup);

        let state = self.theme.read();
        let mut lines = vec![
            Line::styled(
                format!(
                    "backend={} user={} view={} mode={:?}",
                    self.service.backend_name(),
                    self.service.user_id(),
                    self.view_mode.as_str(),
                    self.mode
                ),
                palette.accent(),
            ),
            Line::from(format!(
                "items={} offset={} total={} page_size={} has_more={} loading={} refreshing={}",
                self.service.items().len(),
                self.service.offset(),
                self.service.total(),
                self.service.page_size(),
                self.service.has_more(),
                self.service.is_loading(),
                self.service.is_refreshing()
            )),
            Line::from(format!(
                "grid rows={} selected={} scroll_offset={} pinned_translation={} h_offset={} load_more_pending={}",
                self.grid.row_count(),
                self.grid.selected_index(),
                self.grid.scroll_offset(),
                self.grid.pinned_translation(),
                self.grid.h_offset(),
                self.grid.is_load_more_pending()
            )),
            Line::from(format!(
                "theme={} scheme={:?} tint={} language={}",
                state.mode,
                state.scheme,
                state.tint,
                self.language.language().code()
            )),
            Line::from(""),
        ];

        if let Some(buffer) = get_log_buffer() {
            let room = popup.height.saturating_sub(2 + lines.len() as u16) as usize;
            for entry in buffer.get_recent(room) {
                lines.push(Line::styled(entry.format_for_display(), palette.dim()));
            }
        }

        let debug = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(palette.accent())
                .title("Debug (F5)")
                .style(palette.base()),
        );
        f.render_widget(debug, popup);
    }
}
