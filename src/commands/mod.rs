//! Commands Layer
//!
//! Handlers the UI calls on user input. Each returns `Result<T, String>`
//! so errors can be shown to the user as-is.

mod item_cmd;
mod session_cmd;

pub use item_cmd::*;
pub use session_cmd::*;

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::config::{AppConfig, BackendConfig};
use crate::domain::{Session, SortMode};
use crate::repository::{
    FileKvStore, ItemRepository, KeyValueStore, LocalItemRepository, MemoryKvStore,
    RemoteItemRepository,
};
use crate::session::SessionManager;
use crate::store::ItemStore;

/// Application state shared across commands
pub struct AppState {
    pub store: Mutex<ItemStore>,
    pub sessions: Mutex<SessionManager>,
    /// Default ordering for `list_visible`
    pub sort: SortMode,
}

impl AppState {
    pub fn new(repo: Arc<dyn ItemRepository>, device_kv: Arc<dyn KeyValueStore>, sort: SortMode) -> Self {
        Self {
            store: Mutex::new(ItemStore::new(repo)),
            sessions: Mutex::new(SessionManager::new(device_kv)),
            sort,
        }
    }

    /// Compose the state for the configured backend
    pub fn from_config(config: &AppConfig) -> Result<Self, String> {
        let (repo, device_kv): (Arc<dyn ItemRepository>, Arc<dyn KeyValueStore>) = match &config.backend {
            BackendConfig::Local { key } => {
                let kv: Arc<dyn KeyValueStore> = Arc::new(FileKvStore::new(&config.data_dir));
                (Arc::new(LocalItemRepository::with_key(kv.clone(), key.clone())), kv)
            }
            BackendConfig::Remote(table) => {
                let repo = RemoteItemRepository::new(table.clone()).map_err(|e| e.to_string())?;
                (Arc::new(repo), Arc::new(FileKvStore::new(&config.data_dir)))
            }
            BackendConfig::Memory => {
                let kv: Arc<dyn KeyValueStore> = Arc::new(MemoryKvStore::new());
                (Arc::new(LocalItemRepository::new(kv.clone())), kv)
            }
        };
        Ok(Self::new(repo, device_kv, config.list.sort))
    }

    /// Current session, or the error shown when nobody is signed in
    pub(crate) async fn require_session(&self) -> Result<Session, String> {
        self.sessions
            .lock()
            .await
            .current()
            .cloned()
            .ok_or_else(|| "Not signed in".to_string())
    }
}
