//! Item Store
//!
//! Authoritative in-memory list for the signed-in user, kept in sync with
//! an `ItemRepository`.
//!
//! Updates are confirmed: the backing store is written first and the
//! in-memory list only changes once that write succeeds. A failed write is
//! logged and returned, leaving the list at its last known-good state.

use std::sync::Arc;

use crate::domain::{
    visible_items, Category, DomainError, DomainResult, ItemId, ItemQuery, ListStats, Session,
    ShoppingItem, UserId,
};
use crate::repository::ItemRepository;

/// Which items `ItemStore::clear` removes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearScope {
    All,
    Completed,
}

pub struct ItemStore {
    repo: Arc<dyn ItemRepository>,
    owner: Option<UserId>,
    items: Vec<ShoppingItem>,
}

fn log_failure(action: &str, err: DomainError) -> DomainError {
    log::error!("Failed to {}: {}", action, err);
    err
}

impl ItemStore {
    pub fn new(repo: Arc<dyn ItemRepository>) -> Self {
        Self {
            repo,
            owner: None,
            items: Vec::new(),
        }
    }

    /// Items in store order (newest first)
    pub fn items(&self) -> &[ShoppingItem] {
        &self.items
    }

    /// User the list was loaded for
    pub fn owner(&self) -> Option<&UserId> {
        self.owner.as_ref()
    }

    pub fn get(&self, id: &ItemId) -> Option<&ShoppingItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    pub fn stats(&self) -> ListStats {
        ListStats::of(&self.items)
    }

    /// Filtered and sorted view for rendering
    pub fn visible(&self, query: &ItemQuery) -> Vec<&ShoppingItem> {
        visible_items(&self.items, query)
    }

    /// Replace the in-memory list with the persisted one.
    ///
    /// Never fails: without a session, or when the backing store cannot be
    /// read, the list is empty and the problem is logged.
    pub async fn load(&mut self, session: Option<&Session>) -> &[ShoppingItem] {
        self.items.clear();

        let Some(session) = session else {
            log::warn!("No active session, showing an empty list");
            self.owner = None;
            return &self.items;
        };

        self.owner = Some(session.user_id.clone());
        match self.repo.list(session).await {
            Ok(items) => {
                log::info!("Loaded {} item(s) for {}", items.len(), session.user_id);
                self.items = items;
            }
            Err(e) => {
                log::error!("Failed to load items for {}: {}", session.user_id, e);
            }
        }
        &self.items
    }

    /// Forget the list, e.g. after sign-out
    pub fn reset(&mut self) {
        self.owner = None;
        self.items.clear();
    }

    fn authorize(&self, session: &Session) -> DomainResult<()> {
        match &self.owner {
            Some(owner) if *owner == session.user_id => Ok(()),
            Some(_) => Err(DomainError::Unauthorized(
                "Session does not own this list".to_string(),
            )),
            None => Err(DomainError::Unauthorized("List not loaded".to_string())),
        }
    }

    fn position(&self, id: &ItemId) -> Option<usize> {
        self.items.iter().position(|item| &item.id == id)
    }

    /// Validate and add a new item at the head of the list.
    pub async fn add(
        &mut self,
        session: &Session,
        name: &str,
        quantity: Option<u32>,
        category: Option<Category>,
    ) -> DomainResult<ShoppingItem> {
        let mut item = ShoppingItem::new(name, quantity, category)?;
        self.authorize(session)?;

        while self.position(&item.id).is_some() {
            item.id = ItemId::generate();
        }

        self.repo
            .create(session, &item)
            .await
            .map_err(|e| log_failure("add item", e))?;

        log::debug!("Added item {} ({})", item.id, item.name);
        self.items.insert(0, item.clone());
        Ok(item)
    }

    /// Flip the checked state. `Ok(None)` when the id is unknown.
    pub async fn toggle(&mut self, session: &Session, id: &ItemId) -> DomainResult<Option<ShoppingItem>> {
        self.authorize(session)?;
        let Some(index) = self.position(id) else {
            return Ok(None);
        };

        let mut updated = self.items[index].clone();
        updated.completed = !updated.completed;

        self.repo
            .update(session, &updated)
            .await
            .map_err(|e| log_failure("toggle item", e))?;

        self.items[index] = updated.clone();
        Ok(Some(updated))
    }

    /// Change the quantity by `delta`.
    ///
    /// A change that would leave the quantity below 1 is ignored and the
    /// unchanged item is returned. `Ok(None)` when the id is unknown.
    pub async fn update_quantity(
        &mut self,
        session: &Session,
        id: &ItemId,
        delta: i64,
    ) -> DomainResult<Option<ShoppingItem>> {
        self.authorize(session)?;
        let Some(index) = self.position(id) else {
            return Ok(None);
        };

        let current = &self.items[index];
        let quantity = match current.adjusted_quantity(delta) {
            Some(quantity) if delta != 0 => quantity,
            _ => return Ok(Some(current.clone())),
        };

        let mut updated = current.clone();
        updated.quantity = Some(quantity);

        self.repo
            .update(session, &updated)
            .await
            .map_err(|e| log_failure("update quantity", e))?;

        self.items[index] = updated.clone();
        Ok(Some(updated))
    }

    /// Remove one item. Returns whether anything was removed.
    pub async fn delete(&mut self, session: &Session, id: &ItemId) -> DomainResult<bool> {
        self.authorize(session)?;
        let Some(index) = self.position(id) else {
            return Ok(false);
        };

        self.repo
            .delete(session, id)
            .await
            .map_err(|e| log_failure("delete item", e))?;

        self.items.remove(index);
        Ok(true)
    }

    /// Bulk removal. Returns how many items were removed.
    pub async fn clear(&mut self, session: &Session, scope: ClearScope) -> DomainResult<usize> {
        self.authorize(session)?;

        match scope {
            ClearScope::All => {
                if self.items.is_empty() {
                    return Ok(0);
                }
                self.repo
                    .delete_all(session)
                    .await
                    .map_err(|e| log_failure("clear list", e))?;

                let removed = self.items.len();
                self.items.clear();
                Ok(removed)
            }
            ClearScope::Completed => {
                let ids: Vec<ItemId> = self
                    .items
                    .iter()
                    .filter(|item| item.completed)
                    .map(|item| item.id.clone())
                    .collect();
                if ids.is_empty() {
                    return Ok(0);
                }
                self.repo
                    .delete_many(session, &ids)
                    .await
                    .map_err(|e| log_failure("clear completed items", e))?;

                self.items.retain(|item| !item.completed);
                Ok(ids.len())
            }
        }
    }
}
