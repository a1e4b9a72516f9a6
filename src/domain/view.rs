//! List Projections
//!
//! Read-only views derived from the item list on every render: search,
//! category filter, ordering and counters. Nothing here is stored.

use serde::{Deserialize, Serialize};

use super::category::CategoryFilter;
use super::item::ShoppingItem;

/// Ordering applied within items of equal completion status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    /// By category tag, ascending
    #[default]
    Category,
    /// Keep store order (newest first)
    Store,
}

impl SortMode {
    pub fn from_str(s: &str) -> Self {
        match s.trim() {
            "store" => SortMode::Store,
            _ => SortMode::Category,
        }
    }
}

/// Search text plus category filter
#[derive(Debug, Clone, Default)]
pub struct ItemQuery {
    pub search: String,
    pub category: CategoryFilter,
    pub sort: SortMode,
}

impl ItemQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = text.into();
        self
    }

    pub fn category(mut self, filter: CategoryFilter) -> Self {
        self.category = filter;
        self
    }

    pub fn sort(mut self, sort: SortMode) -> Self {
        self.sort = sort;
        self
    }

    /// Case-insensitive substring on name AND category filter
    pub fn matches(&self, item: &ShoppingItem) -> bool {
        let needle = self.search.to_lowercase();
        let name_ok = needle.is_empty() || item.name.to_lowercase().contains(&needle);
        name_ok && self.category.matches(item.category)
    }
}

/// Filter then sort. Incomplete items come first; the sort is stable so
/// ties keep store order.
pub fn visible_items<'a>(items: &'a [ShoppingItem], query: &ItemQuery) -> Vec<&'a ShoppingItem> {
    let mut visible: Vec<&ShoppingItem> = items.iter().filter(|item| query.matches(item)).collect();
    sort_items(&mut visible, query.sort);
    visible
}

pub fn sort_items(items: &mut [&ShoppingItem], mode: SortMode) {
    match mode {
        SortMode::Category => items.sort_by(|a, b| {
            a.completed
                .cmp(&b.completed)
                .then_with(|| a.category.as_str().cmp(b.category.as_str()))
        }),
        SortMode::Store => items.sort_by_key(|item| item.completed),
    }
}

/// Counters shown in the list header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ListStats {
    pub total: usize,
    pub completed: usize,
    pub remaining: usize,
}

impl ListStats {
    pub fn of(items: &[ShoppingItem]) -> Self {
        let total = items.len();
        let completed = items.iter().filter(|item| item.completed).count();
        Self {
            total,
            completed,
            remaining: total - completed,
        }
    }
}
