//! Commands for the shopping list screen

use serde::Serialize;

use super::AppState;
use crate::domain::{Category, CategoryFilter, ItemId, ItemQuery, ListStats, ShoppingItem, SortMode};
use crate::store::ClearScope;

/// Category entry for pickers and filter chips
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryInfo {
    pub id: &'static str,
    pub label: &'static str,
    pub color: &'static str,
}

/// Quantity typed into the add form; anything that is not a positive
/// integer counts as 1.
pub fn parse_quantity(text: Option<&str>) -> u32 {
    text.and_then(|t| t.trim().parse::<u32>().ok())
        .filter(|q| *q >= 1)
        .unwrap_or(1)
}

/// (Re)load the list for the signed-in user
pub async fn load_items(state: &AppState) -> Result<Vec<ShoppingItem>, String> {
    let session = state.sessions.lock().await.current().cloned();
    let mut store = state.store.lock().await;
    Ok(store.load(session.as_ref()).await.to_vec())
}

/// Add an item from the add form
pub async fn add_item(
    state: &AppState,
    name: String,
    quantity: Option<String>,
    category: Option<String>,
) -> Result<ShoppingItem, String> {
    let session = state.require_session().await?;
    let quantity = parse_quantity(quantity.as_deref());
    let category = category.map(|c| Category::from_str(&c));

    let mut store = state.store.lock().await;
    store
        .add(&session, &name, Some(quantity), category)
        .await
        .map_err(|e| e.to_string())
}

/// Toggle item checked state
pub async fn toggle_item(state: &AppState, id: String) -> Result<Option<ShoppingItem>, String> {
    let session = state.require_session().await?;
    let mut store = state.store.lock().await;
    store
        .toggle(&session, &ItemId::from(id))
        .await
        .map_err(|e| e.to_string())
}

/// Step the quantity up or down
pub async fn update_quantity(
    state: &AppState,
    id: String,
    delta: i64,
) -> Result<Option<ShoppingItem>, String> {
    let session = state.require_session().await?;
    let mut store = state.store.lock().await;
    store
        .update_quantity(&session, &ItemId::from(id), delta)
        .await
        .map_err(|e| e.to_string())
}

/// Delete item (the UI asks for confirmation first)
pub async fn delete_item(state: &AppState, id: String) -> Result<bool, String> {
    let session = state.require_session().await?;
    let mut store = state.store.lock().await;
    store
        .delete(&session, &ItemId::from(id))
        .await
        .map_err(|e| e.to_string())
}

pub async fn clear_completed(state: &AppState) -> Result<usize, String> {
    clear(state, ClearScope::Completed).await
}

pub async fn clear_all(state: &AppState) -> Result<usize, String> {
    clear(state, ClearScope::All).await
}

async fn clear(state: &AppState, scope: ClearScope) -> Result<usize, String> {
    let session = state.require_session().await?;
    let mut store = state.store.lock().await;
    store.clear(&session, scope).await.map_err(|e| e.to_string())
}

/// Filtered, sorted list for rendering.
///
/// `category` is a tag or `"all"`; `sort` is `"category"` or `"store"` and
/// defaults to the configured ordering.
pub async fn list_visible(
    state: &AppState,
    search: Option<String>,
    category: Option<String>,
    sort: Option<String>,
) -> Vec<ShoppingItem> {
    let query = ItemQuery::new()
        .search(search.unwrap_or_default())
        .category(category.as_deref().map(CategoryFilter::from_str).unwrap_or_default())
        .sort(sort.as_deref().map(SortMode::from_str).unwrap_or(state.sort));

    let store = state.store.lock().await;
    store.visible(&query).into_iter().cloned().collect()
}

pub async fn list_stats(state: &AppState) -> ListStats {
    state.store.lock().await.stats()
}

pub fn list_categories() -> Vec<CategoryInfo> {
    Category::ALL
        .iter()
        .map(|c| CategoryInfo {
            id: c.as_str(),
            label: c.label(),
            color: c.color(),
        })
        .collect()
}
