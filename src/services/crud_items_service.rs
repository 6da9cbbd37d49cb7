use anyhow::{anyhow, Result};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, warn};

use crate::data::backend::CrudBackend;
use crate::data::crud_item::{CreateCrudItemInput, CrudItem, UpdateCrudItemInput};
use crate::data::query::{CrudFilters, Page, PaginationOptions, SortOption, DEFAULT_PAGE_SIZE};
use crate::data::row::Row;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FetchKind {
    /// Offset 0, replaces the loaded items
    Reload,
    /// Next page, appended
    LoadMore,
}

struct FetchResult {
    generation: u64,
    kind: FetchKind,
    result: Result<Page<CrudItem>>,
}

/// What changed after [`CrudItemsService::poll`] applied a completed fetch
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceEvent {
    PageLoaded {
        /// True for an initial load or refresh, false for an appended page
        replace: bool,
        /// The page's rows (only the ones not already loaded when appending)
        rows: Vec<Row>,
        has_more: bool,
    },
    Failed(String),
}

/// Paged loading state for the item list.
///
/// Fetches run on the tokio blocking pool when a runtime handle is given and
/// inline otherwise. Either way the result is delivered through a channel and
/// only applied by `poll`, so state changes happen on the caller's thread.
pub struct CrudItemsService {
    backend: Arc<dyn CrudBackend>,
    user_id: String,
    runtime: Option<Handle>,
    tx: UnboundedSender<FetchResult>,
    rx: UnboundedReceiver<FetchResult>,

    items: Vec<CrudItem>,
    loading: bool,
    refreshing: bool,
    error: Option<String>,
    has_more: bool,
    total: usize,
    offset: usize,

    page_size: usize,
    sort: SortOption,
    filters: CrudFilters,

    /// Bumped on every reload; completions from older generations are dropped
    generation: u64,
    in_flight: Option<FetchKind>,
}

impl CrudItemsService {
    pub fn new(backend: Arc<dyn CrudBackend>, user_id: impl Into<String>) -> Self {
        let (tx, rx) = unbounded_channel();
        Self {
            backend,
            user_id: user_id.into(),
            runtime: None,
            tx,
            rx,
            items: Vec::new(),
            loading: true,
            refreshing: false,
            error: None,
            has_more: true,
            total: 0,
            offset: 0,
            page_size: DEFAULT_PAGE_SIZE,
            sort: SortOption::default(),
            filters: CrudFilters::default(),
            generation: 0,
            in_flight: None,
        }
    }

    /// Run fetches on this runtime instead of inline
    pub fn with_runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_sort(mut self, sort: SortOption) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_filters(mut self, filters: CrudFilters) -> Self {
        self.filters = filters;
        self
    }

    // ========== Paging ==========

    /// First load: clears the items and fetches offset 0
    pub fn start(&mut self) {
        self.items.clear();
        self.offset = 0;
        self.has_more = true;
        self.loading = true;
        self.spawn_fetch(FetchKind::Reload, 0);
    }

    /// Pull-to-refresh: keeps the current items visible until the new page lands
    pub fn refresh(&mut self) {
        if self.items.is_empty() {
            self.loading = true;
        } else {
            self.refreshing = true;
        }
        self.spawn_fetch(FetchKind::Reload, 0);
    }

    /// Request the next page. Returns false when the request was ignored.
    pub fn load_more(&mut self) -> bool {
        if !self.has_more || self.loading || self.refreshing || self.in_flight.is_some() {
            debug!(
                target: "crud_service",
                "load_more ignored (has_more={}, loading={}, refreshing={}, in_flight={:?})",
                self.has_more, self.loading, self.refreshing, self.in_flight
            );
            return false;
        }
        self.spawn_fetch(FetchKind::LoadMore, self.offset);
        true
    }

    pub fn set_sort(&mut self, sort: SortOption) {
        if self.sort == sort {
            return;
        }
        info!(target: "crud_service", "Sort changed to {}", sort);
        self.sort = sort;
        self.start();
    }

    pub fn set_filters(&mut self, filters: CrudFilters) {
        if self.filters == filters {
            return;
        }
        info!(target: "crud_service", "Filters changed: {:?}", filters);
        self.filters = filters;
        self.start();
    }

    pub fn set_search(&mut self, search: Option<String>) {
        let mut filters = self.filters.clone();
        filters.search = search.filter(|s| !s.trim().is_empty());
        self.set_filters(filters);
    }

    fn pagination_options(&self) -> PaginationOptions {
        PaginationOptions {
            page_size: self.page_size,
            order_by: self.sort.order_by(),
            filters: self.filters.clone(),
        }
    }

    fn spawn_fetch(&mut self, kind: FetchKind, offset: usize) {
        if kind == FetchKind::Reload {
            self.generation += 1;
        }
        self.in_flight = Some(kind);
        self.error = None;

        let generation = self.generation;
        let backend = Arc::clone(&self.backend);
        let user_id = self.user_id.clone();
        let options = self.pagination_options();
        let tx = self.tx.clone();

        debug!(
            target: "crud_service",
            "Fetching {:?} gen={} offset={} order={:?}",
            kind, generation, offset, options.order_by
        );

        let job = move || {
            let result = backend.fetch_page(&user_id, offset, &options);
            // Receiver gone means the service was dropped
            let _ = tx.send(FetchResult {
                generation,
                kind,
                result,
            });
        };

        match &self.runtime {
            Some(handle) => {
                handle.spawn_blocking(job);
            }
            None => job(),
        }
    }

    /// Apply every completed fetch. Call once per UI tick.
    pub fn poll(&mut self) -> Vec<ServiceEvent> {
        let mut events = Vec::new();
        while let Ok(done) = self.rx.try_recv() {
            if let Some(event) = self.apply(done) {
                events.push(event);
            }
        }
        events
    }

    fn apply(&mut self, done: FetchResult) -> Option<ServiceEvent> {
        if done.generation != self.generation {
            debug!(
                target: "crud_service",
                "Dropping stale {:?} result (gen {} != {})",
                done.kind, done.generation, self.generation
            );
            return None;
        }

        self.in_flight = None;
        self.loading = false;
        self.refreshing = false;

        match done.result {
            Ok(page) => {
                self.has_more = page.has_more;
                self.total = page.total.unwrap_or(0);
                let page_len = page.data.len();

                let (replace, added) = match done.kind {
                    FetchKind::Reload => {
                        self.items = page.data;
                        self.offset = page_len;
                        (true, self.items.iter().collect::<Vec<_>>())
                    }
                    FetchKind::LoadMore => {
                        let start = self.items.len();
                        for item in page.data {
                            if self.items.iter().any(|i| i.id == item.id) {
                                continue;
                            }
                            self.items.push(item);
                        }
                        self.offset += page_len;
                        (false, self.items[start..].iter().collect())
                    }
                };

                info!(
                    target: "crud_service",
                    "Loaded {} items (offset={}, total={}, has_more={})",
                    page_len, self.offset, self.total, self.has_more
                );

                Some(ServiceEvent::PageLoaded {
                    replace,
                    rows: added.into_iter().map(CrudItem::to_row).collect(),
                    has_more: self.has_more,
                })
            }
            Err(e) => {
                error!(target: "crud_service", "Error fetching items: {}", e);
                let message = e.to_string();
                self.error = Some(message.clone());
                Some(ServiceEvent::Failed(message))
            }
        }
    }

    // ========== Item operations ==========

    pub fn get(&self, item_id: &str) -> Result<Option<CrudItem>> {
        self.backend.get_item(item_id, &self.user_id)
    }

    /// Create an item; the caller refreshes to show it in order
    pub fn create(&mut self, input: &CreateCrudItemInput) -> Result<CrudItem> {
        input.validate()?;
        let item = self.backend.create_item(&self.user_id, input)?;
        info!(target: "crud_service", "Created item {}", item.id);
        Ok(item)
    }

    pub fn update(&mut self, item_id: &str, updates: &UpdateCrudItemInput) -> Result<CrudItem> {
        if updates.is_empty() {
            return Err(anyhow!("Nothing to update"));
        }
        let item = self.backend.update_item(item_id, &self.user_id, updates)?;
        if let Some(existing) = self.items.iter_mut().find(|i| i.id == item.id) {
            *existing = item.clone();
        }
        info!(target: "crud_service", "Updated item {}", item.id);
        Ok(item)
    }

    pub fn delete(&mut self, item_id: &str) -> Result<()> {
        self.backend.delete_item(item_id, &self.user_id)?;
        let before = self.items.len();
        self.items.retain(|i| i.id != item_id);
        if self.items.len() < before {
            self.total = self.total.saturating_sub(1);
            self.offset = self.offset.saturating_sub(1);
        } else {
            warn!(target: "crud_service", "Deleted item {} was not loaded", item_id);
        }
        info!(target: "crud_service", "Deleted item {}", item_id);
        Ok(())
    }

    // ========== State ==========

    pub fn items(&self) -> &[CrudItem] {
        &self.items
    }

    pub fn item(&self, item_id: &str) -> Option<&CrudItem> {
        self.items.iter().find(|i| i.id == item_id)
    }

    pub fn rows(&self) -> Vec<Row> {
        self.items.iter().map(CrudItem::to_row).collect()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn sort(&self) -> &SortOption {
        &self.sort
    }

    pub fn filters(&self) -> &CrudFilters {
        &self.filters
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }
}
