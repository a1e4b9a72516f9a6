//! Session Manager
//!
//! Tracks the signed-in user and remembers it on the device so the session
//! survives a restart. Verifying credentials is the auth provider's job;
//! this only records who is signed in.
//!
//! Email sign-in remembers the email under `userEmail`. A provider session
//! (user id plus access token) is remembered as JSON under `authSession`
//! and takes precedence on restore.

use std::sync::Arc;

use crate::domain::{DomainError, DomainResult, Session, UserId};
use crate::repository::KeyValueStore;

/// Key under which the signed-in email is remembered
pub const USER_EMAIL_KEY: &str = "userEmail";
/// Key under which a provider-issued session is remembered
pub const AUTH_SESSION_KEY: &str = "authSession";

pub struct SessionManager {
    kv: Arc<dyn KeyValueStore>,
    current: Option<Session>,
}

/// Local accounts are identified by their normalized email
fn local_user_id(email: &str) -> UserId {
    UserId::new(email.trim().to_lowercase())
}

impl SessionManager {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv, current: None }
    }

    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    /// Start a local session. Both fields must be filled in.
    pub async fn sign_in(&mut self, email: &str, password: &str) -> DomainResult<Session> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(DomainError::InvalidInput("Please fill in all fields".to_string()));
        }

        self.kv.set(USER_EMAIL_KEY, email).await.map_err(|e| {
            log::error!("Failed to remember session: {}", e);
            e
        })?;
        if let Err(e) = self.kv.remove(AUTH_SESSION_KEY).await {
            log::warn!("Failed to drop previous provider session: {}", e);
        }

        let session = Session::new(local_user_id(email)).with_email(email);
        log::info!("Signed in as {}", session.user_id);
        self.current = Some(session.clone());
        Ok(session)
    }

    /// Adopt a session issued by an external auth provider and remember it.
    pub async fn sign_in_with_token(
        &mut self,
        user_id: UserId,
        email: Option<String>,
        token: &str,
    ) -> DomainResult<Session> {
        if user_id.as_str().trim().is_empty() || token.trim().is_empty() {
            return Err(DomainError::InvalidInput("Missing user id or access token".to_string()));
        }

        let mut session = Session::new(user_id).with_token(token);
        session.email = email.filter(|e| !e.trim().is_empty());

        let raw = serde_json::to_string(&session)?;
        self.kv.set(AUTH_SESSION_KEY, &raw).await.map_err(|e| {
            log::error!("Failed to remember session: {}", e);
            e
        })?;
        if let Some(email) = &session.email {
            self.kv.set(USER_EMAIL_KEY, email).await?;
        }

        log::info!("Signed in as {} via provider token", session.user_id);
        self.current = Some(session.clone());
        Ok(session)
    }

    /// Rebuild the remembered session, if any.
    pub async fn restore(&mut self) -> Option<&Session> {
        match self.restore_provider_session().await {
            Some(session) => self.current = Some(session),
            None => match self.kv.get(USER_EMAIL_KEY).await {
                Ok(Some(email)) if !email.trim().is_empty() => {
                    let email = email.trim();
                    self.current = Some(Session::new(local_user_id(email)).with_email(email));
                }
                Ok(_) => {}
                Err(e) => log::warn!("Could not restore session: {}", e),
            },
        }
        self.current.as_ref()
    }

    async fn restore_provider_session(&self) -> Option<Session> {
        let raw = match self.kv.get(AUTH_SESSION_KEY).await {
            Ok(raw) => raw?,
            Err(e) => {
                log::warn!("Could not restore provider session: {}", e);
                return None;
            }
        };
        match serde_json::from_str::<Session>(&raw) {
            Ok(session) if session.access_token.is_some() => Some(session),
            Ok(_) => None,
            Err(e) => {
                log::warn!("Ignoring unreadable provider session: {}", e);
                None
            }
        }
    }

    /// End the session. The in-memory session is dropped even if the
    /// remembered email cannot be removed.
    pub async fn sign_out(&mut self) -> DomainResult<()> {
        if let Some(session) = self.current.take() {
            log::info!("Signed out {}", session.user_id);
        }
        for key in [AUTH_SESSION_KEY, USER_EMAIL_KEY] {
            self.kv.remove(key).await.map_err(|e| {
                log::error!("Failed to forget session: {}", e);
                e
            })?;
        }
        Ok(())
    }
}
