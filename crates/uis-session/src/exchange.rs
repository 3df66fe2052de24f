//! Credential exchange — the seam between the session store and an
//! authentication service.
//!
//! The session store validates inputs and owns persistence; the exchange
//! only turns credentials into a session. A production deployment plugs a
//! real authentication client in here.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use uuid::Uuid;

use uis_core::{PracticeId, Session, UserId, UserProfile};

use crate::store::SessionError;

/// Turns validated credentials into an authenticated session.
#[async_trait]
pub trait CredentialExchange: Send + Sync {
    /// Exchange credentials for a session. Inputs are already validated
    /// as non-empty by the store.
    async fn authenticate(&self, email: &str, secret: &str) -> Result<Session, SessionError>;
}

/// Demo credential exchange: fabricates a session locally.
///
/// This is a documented stand-in for a real credential exchange — it
/// contacts no server and accepts any non-empty credentials. The token is
/// an opaque random string with no structure and no verifiability; the
/// demo backend does not inspect it.
pub struct DemoExchange;

/// Token validity window the demo exchange stamps on new sessions.
const DEMO_SESSION_HOURS: i64 = 1;

#[async_trait]
impl CredentialExchange for DemoExchange {
    async fn authenticate(&self, email: &str, _secret: &str) -> Result<Session, SessionError> {
        let now = Utc::now();
        let profile = UserProfile {
            user_id: UserId("demo-user".to_string()),
            email: email.to_string(),
            practice_id: PracticeId("demo-practice".to_string()),
            practice_name: "Demo Dental Practice".to_string(),
            roles: vec!["admin".to_string()],
        };

        Ok(Session {
            profile,
            token: format!("uis-demo.{}", Uuid::new_v4().simple()),
            issued_at: Some(now),
            expires_at: Some(now + Duration::hours(DEMO_SESSION_HOURS)),
        })
    }
}
