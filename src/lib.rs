//! Shopping List Backend
//!
//! Layered architecture:
//! - domain: Core entities and business rules
//! - repository: Data access abstractions and implementations
//! - store / session: In-memory list and signed-in user
//! - commands: Handlers the UI calls

pub mod commands;
pub mod config;
pub mod domain;
pub mod repository;
pub mod session;
pub mod store;

pub use commands::AppState;
pub use config::{AppConfig, BackendConfig, ConfigError};

fn stamp() -> String {
    chrono::Local::now().format("%H:%M:%S%.3f").to_string()
}

/// Start the backend: logger, persistence, remembered session, first load.
pub async fn start(config: AppConfig) -> Result<AppState, String> {
    eprintln!("[{}] App setup starting", stamp());

    match rolling_logger::init_logger(&config.log_dir, &config.app_name) {
        Ok(()) => {}
        Err(rolling_logger::LoggerError::AlreadyInitialized) => {
            eprintln!("[{}] Logger already initialized", stamp());
        }
        Err(e) => return Err(format!("failed to init rolling logger: {}", e)),
    }

    let state = AppState::from_config(&config)?;
    log::info!("Backend ready: {}", backend_name(&config.backend));

    match commands::restore_session(&state).await {
        Some(session) => log::info!("Restored session for {}", session.user_id),
        None => log::info!("No remembered session"),
    }

    eprintln!("[{}] State ready", stamp());
    Ok(state)
}

fn backend_name(backend: &BackendConfig) -> &'static str {
    match backend {
        BackendConfig::Local { .. } => "local",
        BackendConfig::Remote(_) => "remote",
        BackendConfig::Memory => "memory",
    }
}
