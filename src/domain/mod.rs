//! Domain Layer
//!
//! Contains all domain entities and core abstractions.
//! No I/O happens here.

mod category;
mod error;
mod item;
mod user;
mod view;

pub use category::{Category, CategoryFilter};
pub use error::{DomainError, DomainResult};
pub use item::{ItemId, ShoppingItem};
pub use user::{Session, UserId};
pub use view::{sort_items, visible_items, ItemQuery, ListStats, SortMode};
