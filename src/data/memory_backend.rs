use anyhow::{anyhow, Result};
use chrono::{Duration, SecondsFormat, TimeZone, Utc};
use std::sync::RwLock;
use tracing::{debug, info};

use crate::data::backend::CrudBackend;
use crate::data::crud_item::{
    CreateCrudItemInput, CrudItem, ItemStatus, UpdateCrudItemInput, CRUD_CATEGORIES,
};
use crate::data::query::{Page, PaginationOptions};
use crate::data::row::CellValue;
use crate::data::value_compare::compare_optional_cell_values;

struct Store {
    items: Vec<CrudItem>,
    next_id: u64,
}

/// A backend that keeps items in memory.
///
/// Used for the demo mode and for tests. It implements the same filter,
/// ordering and range semantics as the hosted query builder.
pub struct InMemoryBackend {
    store: RwLock<Store>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(Store {
                items: Vec::new(),
                next_id: 1,
            }),
        }
    }

    /// Build a backend pre-loaded with items
    pub fn with_items(items: Vec<CrudItem>) -> Self {
        let next_id = items
            .iter()
            .filter_map(|i| i.id.parse::<u64>().ok())
            .max()
            .unwrap_or(0)
            + 1;
        Self {
            store: RwLock::new(Store { items, next_id }),
        }
    }

    /// Deterministic demo data for `user_id`
    pub fn seeded(user_id: &str, count: usize) -> Self {
        let base = Utc
            .with_ymd_and_hms(2024, 1, 1, 9, 0, 0)
            .single()
            .unwrap_or_else(Utc::now);
        let adjectives = ["Quarterly", "Weekly", "Draft", "Final", "Shared", "Team"];
        let nouns = ["Report", "Roadmap", "Budget", "Review", "Campaign", "Brief", "Audit"];

        let items = (0..count)
            .map(|i| {
                let created = base + Duration::hours(i as i64 * 7);
                let ts = created.to_rfc3339_opts(SecondsFormat::Secs, true);
                CrudItem {
                    id: (i + 1).to_string(),
                    user_id: user_id.to_string(),
                    title: format!(
                        "{} {} {}",
                        adjectives[i % adjectives.len()],
                        nouns[(i / adjectives.len()) % nouns.len()],
                        i + 1
                    ),
                    subtitle: if i % 3 == 0 {
                        None
                    } else {
                        Some(format!("Owned by team {}", (i % 5) + 1))
                    },
                    description: Some(format!("Demo item number {}", i + 1)),
                    category: CRUD_CATEGORIES[i % CRUD_CATEGORIES.len()].to_string(),
                    status: ItemStatus::ALL[i % ItemStatus::ALL.len()],
                    image_url: None,
                    created_at: ts.clone(),
                    updated_at: ts,
                }
            })
            .collect();

        info!(target: "backend", "Seeded in-memory backend with {} items", count);
        Self::with_items(items)
    }

    pub fn len(&self) -> usize {
        self.store.read().map(|s| s.items.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn now() -> String {
        Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Order items by one column, extracting each sort key once
fn sort_items<'a>(items: &mut Vec<&'a CrudItem>, column: &str, ascending: bool) {
    let mut keyed: Vec<(Option<CellValue>, &'a CrudItem)> = items
        .iter()
        .map(|item| (item.field_value(column), *item))
        .collect();

    keyed.sort_by(|(a, _), (b, _)| {
        let cmp = compare_optional_cell_values(a.as_ref(), b.as_ref());
        if ascending {
            cmp
        } else {
            cmp.reverse()
        }
    });

    *items = keyed.into_iter().map(|(_, item)| item).collect();
}

impl CrudBackend for InMemoryBackend {
    fn fetch_page(
        &self,
        user_id: &str,
        offset: usize,
        options: &PaginationOptions,
    ) -> Result<Page<CrudItem>> {
        let store = self
            .store
            .read()
            .map_err(|_| anyhow!("In-memory store lock poisoned"))?;

        let statuses = options.filters.active_statuses();
        let search = options.filters.search_text();

        let mut matching: Vec<&CrudItem> = store
            .items
            .iter()
            .filter(|item| item.user_id == user_id)
            .filter(|item| {
                statuses
                    .as_ref()
                    .map(|s| s.contains(&item.status))
                    .unwrap_or(true)
            })
            .filter(|item| {
                options.filters.category.is_empty()
                    || options.filters.category.contains(&item.category)
            })
            .filter(|item| search.map(|s| item.matches_search(s)).unwrap_or(true))
            .collect();

        let order = &options.order_by;
        sort_items(&mut matching, &order.column, order.ascending);

        let total = matching.len();
        let data: Vec<CrudItem> = matching
            .into_iter()
            .skip(offset)
            .take(options.page_size)
            .cloned()
            .collect();

        debug!(target: "backend",
               "fetch_page offset={} size={} order={}:{} -> {} of {}",
               offset, options.page_size, order.column, order.ascending, data.len(), total);

        Ok(Page::from_range(data, offset, total))
    }

    fn get_item(&self, item_id: &str, user_id: &str) -> Result<Option<CrudItem>> {
        let store = self
            .store
            .read()
            .map_err(|_| anyhow!("In-memory store lock poisoned"))?;
        Ok(store
            .items
            .iter()
            .find(|i| i.id == item_id && i.user_id == user_id)
            .cloned())
    }

    fn create_item(&self, user_id: &str, input: &CreateCrudItemInput) -> Result<CrudItem> {
        input.validate()?;
        let mut store = self
            .store
            .write()
            .map_err(|_| anyhow!("In-memory store lock poisoned"))?;

        let now = Self::now();
        let item = CrudItem {
            id: store.next_id.to_string(),
            user_id: user_id.to_string(),
            title: input.title.clone(),
            subtitle: input.subtitle.clone().filter(|s| !s.is_empty()),
            description: input.description.clone().filter(|s| !s.is_empty()),
            category: input.category.clone(),
            status: input.status.unwrap_or_default(),
            image_url: input.image_url.clone().filter(|s| !s.is_empty()),
            created_at: now.clone(),
            updated_at: now,
        };
        store.next_id += 1;
        store.items.push(item.clone());

        info!(target: "backend", "Created item {} for user {}", item.id, user_id);
        Ok(item)
    }

    fn update_item(
        &self,
        item_id: &str,
        user_id: &str,
        updates: &UpdateCrudItemInput,
    ) -> Result<CrudItem> {
        let mut store = self
            .store
            .write()
            .map_err(|_| anyhow!("In-memory store lock poisoned"))?;

        let item = store
            .items
            .iter_mut()
            .find(|i| i.id == item_id && i.user_id == user_id)
            .ok_or_else(|| anyhow!("Item {} not found", item_id))?;

        item.apply_update(updates);
        item.updated_at = Self::now();
        Ok(item.clone())
    }

    fn delete_item(&self, item_id: &str, user_id: &str) -> Result<()> {
        let mut store = self
            .store
            .write()
            .map_err(|_| anyhow!("In-memory store lock poisoned"))?;

        let before = store.items.len();
        store
            .items
            .retain(|i| !(i.id == item_id && i.user_id == user_id));

        if store.items.len() == before {
            return Err(anyhow!("Item {} not found", item_id));
        }
        info!(target: "backend", "Deleted item {}", item_id);
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
