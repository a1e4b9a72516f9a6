//! Repository Layer - Core Traits
//!
//! Defines the abstract interfaces for data access.
//! Implementations persist to on-device key-value storage or a remote table.

use async_trait::async_trait;

use crate::domain::{DomainResult, ItemId, Session, ShoppingItem};

/// Persistence contract for a user's shopping list.
///
/// Every call is scoped to the session's user. All operations are async to
/// support both local and remote backends.
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// All items of the session user, newest first
    async fn list(&self, session: &Session) -> DomainResult<Vec<ShoppingItem>>;

    /// Insert a new item at the head of the list
    async fn create(&self, session: &Session, item: &ShoppingItem) -> DomainResult<()>;

    /// Replace an existing item, matched by id
    async fn update(&self, session: &Session, item: &ShoppingItem) -> DomainResult<()>;

    /// Delete one item by id
    async fn delete(&self, session: &Session, id: &ItemId) -> DomainResult<()>;

    /// Delete several items in one step
    async fn delete_many(&self, session: &Session, ids: &[ItemId]) -> DomainResult<()>;

    /// Delete every item of the session user
    async fn delete_all(&self, session: &Session) -> DomainResult<()>;
}

/// On-device string storage addressed by key
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> DomainResult<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> DomainResult<()>;

    async fn remove(&self, key: &str) -> DomainResult<()>;
}
