//! The session store — single source of truth for "who is logged in".
//!
//! The store owns the in-memory [`Session`] exclusively; every other
//! component (route guard, API gateway) only reads it. All vault writes go
//! through `restore`/`login`/`logout`, which the UI thread serializes —
//! nothing here runs concurrently with itself.

use std::sync::RwLock;

use uis_core::{Session, TokenSource, UserProfile};

use crate::exchange::CredentialExchange;
use crate::vault::SessionVault;

/// Errors surfaced by session operations.
///
/// Persistence *corruption* is deliberately not here: a vault that fails to
/// read or parse degrades to the logged-out state and is only logged.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Missing or unusable login input. Never mutates session state.
    #[error("{0}")]
    Validation(String),

    /// The credential exchange rejected the login.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The vault refused a write during login. Prior state is untouched.
    #[error("Session could not be persisted: {0}")]
    Persistence(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

struct StoreState {
    session: Option<Session>,
    restoring: bool,
}

/// Holds the current session and mediates all access to the durable vault.
pub struct SessionStore<V: SessionVault, E: CredentialExchange> {
    vault: V,
    exchange: E,
    state: RwLock<StoreState>,
}

impl<V: SessionVault, E: CredentialExchange> SessionStore<V, E> {
    /// Create a store in the restoring state. Callers must run [`restore`]
    /// before the route guard evaluates for the first time.
    ///
    /// [`restore`]: SessionStore::restore
    pub fn new(vault: V, exchange: E) -> Self {
        Self {
            vault,
            exchange,
            state: RwLock::new(StoreState {
                session: None,
                restoring: true,
            }),
        }
    }

    /// Rehydrate the session from the durable vault.
    ///
    /// If either entry is missing, or the stored profile fails to parse,
    /// both entries are cleared and the session is left absent. Never
    /// returns an error: a corrupt or inaccessible vault degrades to the
    /// logged-out state.
    pub fn restore(&self) {
        let token = self.vault.read_token().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Vault token read failed, treating as no session");
            None
        });
        let profile_raw = self.vault.read_profile().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Vault profile read failed, treating as no session");
            None
        });

        let session = match (token, profile_raw) {
            (Some(token), Some(raw)) => match serde_json::from_str::<UserProfile>(&raw) {
                Ok(profile) => {
                    tracing::info!(email = %profile.email, "Session restored from vault");
                    Some(Session {
                        profile,
                        token,
                        issued_at: None,
                        expires_at: None,
                    })
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Stored profile corrupt, clearing vault");
                    self.clear_vault_quietly();
                    None
                }
            },
            (None, None) => None,
            // A token without a profile (or vice versa) is not a session.
            _ => {
                tracing::warn!("Partial session vault, clearing both entries");
                self.clear_vault_quietly();
                None
            }
        };

        let mut state = self.write_state();
        state.session = session;
        state.restoring = false;
    }

    /// Exchange credentials for a session, persist it, and make it current.
    ///
    /// Both inputs must be non-empty. On any failure the prior state — both
    /// in memory and in the vault — is left untouched; nothing is partially
    /// persisted.
    pub async fn login(&self, email: &str, secret: &str) -> Result<Session, SessionError> {
        if email.trim().is_empty() || secret.is_empty() {
            return Err(SessionError::Validation(
                "Email and password are required".to_string(),
            ));
        }

        let session = self.exchange.authenticate(email, secret).await?;

        let profile_json = serde_json::to_string(&session.profile)?;
        self.vault
            .store(&session.token, &profile_json)
            .map_err(|e| SessionError::Persistence(e.to_string()))?;

        let mut state = self.write_state();
        state.session = Some(session.clone());

        tracing::info!(email = %session.profile.email, "Login succeeded");
        Ok(session)
    }

    /// Clear the vault and in-memory state unconditionally.
    ///
    /// Idempotent: logging out while logged out is a no-op. A vault that
    /// refuses the clear is logged and the in-memory session is dropped
    /// regardless.
    pub fn logout(&self) {
        if let Err(e) = self.vault.clear() {
            tracing::warn!(error = %e, "Vault clear failed during logout");
        }
        let mut state = self.write_state();
        if state.session.take().is_some() {
            tracing::info!("Logged out");
        }
    }

    /// True until the first `restore` completes. Dependent components must
    /// suspend rendering decisions while this holds.
    pub fn is_loading(&self) -> bool {
        self.read_state().restoring
    }

    /// A session is authenticated when present with a non-empty token.
    pub fn is_authenticated(&self) -> bool {
        self.read_state()
            .session
            .as_ref()
            .is_some_and(|s| !s.token.is_empty())
    }

    /// Snapshot of the current session, if any.
    pub fn current(&self) -> Option<Session> {
        self.read_state().session.clone()
    }

    fn clear_vault_quietly(&self) {
        if let Err(e) = self.vault.clear() {
            tracing::warn!(error = %e, "Vault clear failed");
        }
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl<V: SessionVault, E: CredentialExchange> TokenSource for SessionStore<V, E> {
    fn bearer_token(&self) -> Option<String> {
        self.read_state().session.as_ref().map(|s| s.token.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::DemoExchange;
    use crate::vault::MemoryVault;

    fn fresh_store(vault: MemoryVault) -> SessionStore<MemoryVault, DemoExchange> {
        SessionStore::new(vault, DemoExchange)
    }

    #[test]
    fn loading_until_restore_completes() {
        let store = fresh_store(MemoryVault::new());
        assert!(store.is_loading());
        store.restore();
        assert!(!store.is_loading());
        assert!(!store.is_authenticated());
    }

    #[test]
    fn restore_reproduces_stored_pair_exactly() {
        let vault = MemoryVault::new();
        vault.seed(
            Some("tok-restore"),
            Some(
                r#"{"userId":"u1","email":"doc@example.com","practiceId":"p1","practiceName":"Main St Dental","roles":["admin"]}"#,
            ),
        );
        let store = fresh_store(vault);
        store.restore();

        let session = store.current().expect("session restored");
        assert_eq!(session.token, "tok-restore");
        assert_eq!(session.profile.email, "doc@example.com");
        assert_eq!(session.profile.practice_name, "Main St Dental");
        assert!(store.is_authenticated());
    }

    #[test]
    fn restore_malformed_profile_clears_both_entries() {
        let vault = MemoryVault::new();
        vault.seed(Some("tok"), Some("{not json"));
        let store = fresh_store(vault);
        store.restore();

        assert!(!store.is_authenticated());
        assert!(store.current().is_none());
        assert!(store.vault.read_token().unwrap().is_none());
        assert!(store.vault.read_profile().unwrap().is_none());
    }

    #[test]
    fn restore_token_without_profile_clears_both_entries() {
        let vault = MemoryVault::new();
        vault.seed(Some("tok"), None);
        let store = fresh_store(vault);
        store.restore();

        assert!(store.current().is_none());
        assert!(store.vault.read_token().unwrap().is_none());
    }

    #[test]
    fn restore_with_unreadable_vault_degrades_to_logged_out() {
        // Failing vault: writes (including the defensive clear) error out.
        // Restore must still complete and leave the session absent.
        let store = fresh_store(MemoryVault::failing());
        store.restore();
        assert!(!store.is_loading());
        assert!(!store.is_authenticated());
    }

    #[tokio::test]
    async fn login_persists_and_restore_reproduces_identity() {
        let store = fresh_store(MemoryVault::new());
        store.restore();

        let session = store.login("doc@example.com", "hunter2").await.unwrap();
        assert!(store.is_authenticated());

        // Simulate a page reload: new store over the same vault contents.
        let token = store.vault.read_token().unwrap();
        let profile = store.vault.read_profile().unwrap();
        let reloaded_vault = MemoryVault::new();
        reloaded_vault.seed(token.as_deref(), profile.as_deref());
        let reloaded = fresh_store(reloaded_vault);
        reloaded.restore();

        let restored = reloaded.current().expect("restored session");
        assert_eq!(restored.token, session.token);
        assert_eq!(restored.profile, session.profile);
    }

    #[tokio::test]
    async fn login_empty_password_is_validation_error_without_writes() {
        let store = fresh_store(MemoryVault::new());
        store.restore();

        let err = store.login("doc@example.com", "").await.unwrap_err();
        assert!(matches!(err, SessionError::Validation(_)));
        assert!(store.current().is_none());
        assert!(store.vault.read_token().unwrap().is_none());
        assert!(store.vault.read_profile().unwrap().is_none());
    }

    #[tokio::test]
    async fn login_empty_email_is_validation_error() {
        let store = fresh_store(MemoryVault::new());
        store.restore();
        let err = store.login("   ", "secret").await.unwrap_err();
        assert!(matches!(err, SessionError::Validation(_)));
    }

    #[tokio::test]
    async fn login_vault_failure_leaves_prior_state_untouched() {
        let store = fresh_store(MemoryVault::failing());
        store.restore();

        let err = store.login("doc@example.com", "secret").await.unwrap_err();
        assert!(matches!(err, SessionError::Persistence(_)));
        assert!(!store.is_authenticated());
        assert!(store.current().is_none());
    }

    #[tokio::test]
    async fn logout_is_idempotent() {
        let store = fresh_store(MemoryVault::new());
        store.restore();
        store.login("doc@example.com", "secret").await.unwrap();

        store.logout();
        let after_first = (store.current(), store.vault.read_token().unwrap());
        store.logout();
        let after_second = (store.current(), store.vault.read_token().unwrap());

        assert_eq!(after_first, after_second);
        assert!(after_second.0.is_none());
        assert!(after_second.1.is_none());
    }

    #[tokio::test]
    async fn guard_redirects_until_login_then_renders() {
        use crate::guard::{evaluate, RouteDecision};

        let store = fresh_store(MemoryVault::new());
        store.restore();
        assert_eq!(
            evaluate(store.is_loading(), store.is_authenticated()),
            RouteDecision::RedirectToLogin
        );

        store.login("doc@example.com", "secret").await.unwrap();
        assert_eq!(
            evaluate(store.is_loading(), store.is_authenticated()),
            RouteDecision::RenderProtected
        );
    }

    #[tokio::test]
    async fn token_source_reflects_logout_immediately() {
        let store = fresh_store(MemoryVault::new());
        store.restore();
        store.login("doc@example.com", "secret").await.unwrap();
        assert!(store.bearer_token().is_some());

        store.logout();
        assert!(store.bearer_token().is_none());
    }
}
