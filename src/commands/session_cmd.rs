//! Commands for signing in and out

use super::AppState;
use crate::domain::{Session, UserId};

/// Sign in and load that user's list
pub async fn sign_in(state: &AppState, email: String, password: String) -> Result<Session, String> {
    let session = state
        .sessions
        .lock()
        .await
        .sign_in(&email, &password)
        .await
        .map_err(|e| e.to_string())?;

    state.store.lock().await.load(Some(&session)).await;
    Ok(session)
}

/// Adopt a session issued by the auth provider and load that user's list
pub async fn sign_in_with_token(
    state: &AppState,
    user_id: String,
    email: Option<String>,
    access_token: String,
) -> Result<Session, String> {
    let session = state
        .sessions
        .lock()
        .await
        .sign_in_with_token(UserId::new(user_id), email, &access_token)
        .await
        .map_err(|e| e.to_string())?;

    state.store.lock().await.load(Some(&session)).await;
    Ok(session)
}

/// Restore the remembered session on startup, if there is one
pub async fn restore_session(state: &AppState) -> Option<Session> {
    let session = state.sessions.lock().await.restore().await.cloned();
    state.store.lock().await.load(session.as_ref()).await;
    session
}

pub async fn current_user(state: &AppState) -> Option<Session> {
    state.sessions.lock().await.current().cloned()
}

/// Sign out and drop the in-memory list
pub async fn sign_out(state: &AppState) -> Result<(), String> {
    state.store.lock().await.reset();
    state
        .sessions
        .lock()
        .await
        .sign_out()
        .await
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{add_item, load_items};
    use crate::domain::SortMode;
    use crate::repository::{LocalItemRepository, MemoryKvStore};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_sign_in_sign_out_restore() {
        let kv = Arc::new(MemoryKvStore::new());
        let state = AppState::new(
            Arc::new(LocalItemRepository::new(kv.clone())),
            kv.clone(),
            SortMode::Category,
        );

        assert!(sign_in(&state, String::new(), "pw".to_string()).await.is_err());
        let session = sign_in(&state, "kim@example.com".to_string(), "pw".to_string())
            .await
            .unwrap();
        assert_eq!(current_user(&state).await, Some(session.clone()));
        add_item(&state, "Tea".to_string(), None, None).await.unwrap();

        // Same device, fresh process
        let restarted = AppState::new(
            Arc::new(LocalItemRepository::new(kv.clone())),
            kv.clone(),
            SortMode::Category,
        );
        let restored = restore_session(&restarted).await.unwrap();
        assert_eq!(restored.user_id, session.user_id);
        assert_eq!(load_items(&restarted).await.unwrap().len(), 1);

        sign_out(&restarted).await.unwrap();
        assert_eq!(current_user(&restarted).await, None);
        assert!(load_items(&restarted).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_provider_sign_in_is_restored_with_token() {
        let kv = Arc::new(MemoryKvStore::new());
        let state = AppState::new(
            Arc::new(LocalItemRepository::new(kv.clone())),
            kv.clone(),
            SortMode::Category,
        );

        let err = sign_in_with_token(&state, "uuid-7".to_string(), None, String::new())
            .await
            .unwrap_err();
        assert!(err.contains("access token"));

        sign_in_with_token(&state, "uuid-7".to_string(), None, "jwt".to_string())
            .await
            .unwrap();
        add_item(&state, "Rice".to_string(), None, None).await.unwrap();

        let restarted = AppState::new(
            Arc::new(LocalItemRepository::new(kv.clone())),
            kv,
            SortMode::Category,
        );
        let restored = restore_session(&restarted).await.unwrap();
        assert_eq!(restored.user_id.as_str(), "uuid-7");
        assert_eq!(restored.access_token.as_deref(), Some("jwt"));
        assert_eq!(load_items(&restarted).await.unwrap().len(), 1);
    }
}
