//! Repository Layer
//!
//! Data access abstractions and implementations.

mod traits;
mod kv;
mod local;
mod remote;


pub use traits::{ItemRepository, KeyValueStore};
pub use kv::{FileKvStore, MemoryKvStore};
pub use local::{LocalItemRepository, DEFAULT_ITEMS_KEY};
pub use remote::{RemoteItemRepository, RemoteTable};
