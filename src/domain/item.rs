//! Shopping Item Entity
//!
//! Represents one line on the shopping list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::category::Category;
use super::error::{DomainError, DomainResult};

/// Opaque item identifier.
///
/// New ids are random UUIDs; ids written by older builds (millisecond
/// timestamps) are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A shopping list entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShoppingItem {
    /// Unique identifier
    pub id: ItemId,
    /// Display name, trimmed and never empty
    pub name: String,
    /// How many to buy; at least 1 when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    /// Checked off
    #[serde(default, alias = "isChecked")]
    pub completed: bool,
    #[serde(default)]
    pub category: Category,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl ShoppingItem {
    /// Validate user input and build a fresh, unchecked item.
    pub fn new(name: &str, quantity: Option<u32>, category: Option<Category>) -> DomainResult<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::InvalidInput("Please enter an item name".to_string()));
        }
        if quantity == Some(0) {
            return Err(DomainError::InvalidInput("Quantity must be at least 1".to_string()));
        }

        Ok(Self {
            id: ItemId::generate(),
            name: name.to_string(),
            quantity,
            completed: false,
            category: category.unwrap_or_default(),
            created_at: Utc::now(),
        })
    }

    /// Quantity with a missing value read as 1
    pub fn effective_quantity(&self) -> u32 {
        self.quantity.unwrap_or(1)
    }

    /// Quantity after applying `delta`, or `None` when the result would drop below 1.
    pub fn adjusted_quantity(&self, delta: i64) -> Option<u32> {
        let next = i64::from(self.effective_quantity()).checked_add(delta)?;
        if next < 1 {
            return None;
        }
        u32::try_from(next).ok()
    }
}
