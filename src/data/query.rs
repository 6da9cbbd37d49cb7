use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::data::crud_item::ItemStatus;

pub const DEFAULT_PAGE_SIZE: usize = 20;

/// How items are presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    List,
    Grid,
    Table,
}

impl ViewMode {
    pub fn cycle(&self) -> Self {
        match self {
            ViewMode::List => ViewMode::Grid,
            ViewMode::Grid => ViewMode::Table,
            ViewMode::Table => ViewMode::List,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::List => "list",
            ViewMode::Grid => "grid",
            ViewMode::Table => "table",
        }
    }
}

impl Default for ViewMode {
    fn default() -> Self {
        ViewMode::Table
    }
}

/// Server-side ordering selected from the sort menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortOption {
    Newest,
    Oldest,
    Alphabetical,
    /// Any other column, always descending
    Column(String),
}

impl SortOption {
    pub fn order_by(&self) -> OrderBy {
        match self {
            SortOption::Newest => OrderBy::new("created_at", false),
            SortOption::Oldest => OrderBy::new("created_at", true),
            SortOption::Alphabetical => OrderBy::new("title", true),
            SortOption::Column(column) => OrderBy::new(column.clone(), false),
        }
    }

    pub fn id(&self) -> &str {
        match self {
            SortOption::Newest => "newest",
            SortOption::Oldest => "oldest",
            SortOption::Alphabetical => "alphabetical",
            SortOption::Column(column) => column,
        }
    }

    /// Cycle through the built-in options
    pub fn next(&self) -> Self {
        match self {
            SortOption::Newest => SortOption::Oldest,
            SortOption::Oldest => SortOption::Alphabetical,
            SortOption::Alphabetical | SortOption::Column(_) => SortOption::Newest,
        }
    }
}

impl Default for SortOption {
    fn default() -> Self {
        SortOption::Newest
    }
}

impl fmt::Display for SortOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for SortOption {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "newest" => SortOption::Newest,
            "oldest" => SortOption::Oldest,
            "alphabetical" => SortOption::Alphabetical,
            other => SortOption::Column(other.to_string()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub column: String,
    pub ascending: bool,
}

impl OrderBy {
    pub fn new(column: impl Into<String>, ascending: bool) -> Self {
        Self {
            column: column.into(),
            ascending,
        }
    }
}

impl Default for OrderBy {
    fn default() -> Self {
        SortOption::Newest.order_by()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    All,
    Active,
    Archived,
    Draft,
}

impl StatusFilter {
    pub fn status(&self) -> Option<ItemStatus> {
        match self {
            StatusFilter::All => None,
            StatusFilter::Active => Some(ItemStatus::Active),
            StatusFilter::Archived => Some(ItemStatus::Archived),
            StatusFilter::Draft => Some(ItemStatus::Draft),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(StatusFilter::All);
        }
        Ok(match s.parse::<ItemStatus>()? {
            ItemStatus::Active => StatusFilter::Active,
            ItemStatus::Archived => StatusFilter::Archived,
            ItemStatus::Draft => StatusFilter::Draft,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrudFilters {
    #[serde(default)]
    pub status: Vec<StatusFilter>,
    #[serde(default)]
    pub category: Vec<String>,
    #[serde(default)]
    pub search: Option<String>,
}

impl CrudFilters {
    /// Statuses to restrict to, or None when the status filter is inactive
    pub fn active_statuses(&self) -> Option<Vec<ItemStatus>> {
        if self.status.is_empty() || self.status.contains(&StatusFilter::All) {
            return None;
        }
        Some(self.status.iter().filter_map(|s| s.status()).collect())
    }

    /// Search text, ignoring blank input
    pub fn search_text(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationOptions {
    pub page_size: usize,
    pub order_by: OrderBy,
    pub filters: CrudFilters,
}

impl Default for PaginationOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            order_by: OrderBy::default(),
            filters: CrudFilters::default(),
        }
    }
}

/// One page of results from a backend
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub has_more: bool,
    pub total: Option<usize>,
}

impl<T> Page<T> {
    /// Build a page for `offset` given the exact total count
    pub fn from_range(data: Vec<T>, offset: usize, total: usize) -> Self {
        let has_more = offset + data.len() < total;
        Self {
            data,
            has_more,
            total: Some(total),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            has_more: self.has_more,
            total: self.total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_option_order_by() {
        assert_eq!(SortOption::Newest.order_by(), OrderBy::new("created_at", false));
        assert_eq!(SortOption::Oldest.order_by(), OrderBy::new("created_at", true));
        assert_eq!(SortOption::Alphabetical.order_by(), OrderBy::new("title", true));
        assert_eq!(
            "category".parse::<SortOption>().unwrap().order_by(),
            OrderBy::new("category", false)
        );
    }

    #[test]
    fn test_status_filter_all_disables_filter() {
        let filters = CrudFilters {
            status: vec![StatusFilter::Active, StatusFilter::All],
            ..Default::default()
        };
        assert_eq!(filters.active_statuses(), None);

        let filters = CrudFilters {
            status: vec![StatusFilter::Draft],
            ..Default::default()
        };
        assert_eq!(filters.active_statuses(), Some(vec![ItemStatus::Draft]));
    }

    #[test]
    fn test_blank_search_ignored() {
        let filters = CrudFilters {
            search: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(filters.search_text(), None);
    }

    #[test]
    fn test_page_has_more() {
        let page = Page::from_range(vec![1, 2], 0, 5);
        assert!(page.has_more);
        let page = Page::from_range(vec![5], 4, 5);
        assert!(!page.has_more);
        let page: Page<i32> = Page::from_range(vec![], 0, 0);
        assert!(!page.has_more);
    }

    #[test]
    fn test_view_mode_cycle() {
        assert_eq!(ViewMode::List.cycle(), ViewMode::Grid);
        assert_eq!(ViewMode::Table.cycle(), ViewMode::List);
    }
}
