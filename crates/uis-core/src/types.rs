//! Core session types for the UIS client.
//!
//! A [`Session`] is the authenticated identity and credential held by the
//! running client for the current user. It is owned exclusively by the
//! session store; the route guard and the API gateway only read it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── Identifiers ───────────────────────────────────────────────────

/// Server-minted user identifier. Opaque to the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct UserId(pub String);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Server-minted practice identifier. Opaque to the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PracticeId(pub String);

impl std::fmt::Display for PracticeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── Profile & Session ─────────────────────────────────────────────

/// The user profile attached to an authenticated session.
///
/// Serialized in camelCase: this is the exact shape persisted in the
/// durable vault and the shape the auth exchange returns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: UserId,
    pub email: String,
    pub practice_id: PracticeId,
    pub practice_name: String,
    pub roles: Vec<String>,
}

/// An authenticated session: profile + bearer credential + validity window.
///
/// A session is only considered valid when both the token and the profile
/// are present and parse successfully; a token without a resolvable profile
/// is treated as no session at all.
///
/// The validity window is known for sessions created by a live credential
/// exchange. The durable vault stores exactly two entries (token and
/// profile), so a session rehydrated on startup carries no window and is
/// never treated as expired by the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub profile: UserProfile,
    pub token: String,
    pub issued_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    /// The bearer credential for outgoing requests.
    pub fn bearer(&self) -> &str {
        &self.token
    }

    /// Whether the token's validity window has elapsed at `now`.
    ///
    /// Restore intentionally does not check this: a stored session is
    /// reproduced exactly as written, and callers decide what expiry means.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires| now >= expires)
    }
}

// ── Token source ──────────────────────────────────────────────────

/// Read-only view of the current bearer credential.
///
/// The gateway reads the token through this seam at request time, not at
/// construction time, so logout or token rotation is honored on the very
/// next request. The session store is the canonical implementation.
pub trait TokenSource: Send + Sync {
    /// The current bearer token, if a session is present.
    fn bearer_token(&self) -> Option<String>;
}

/// A fixed token source for tests and tooling.
pub struct StaticTokenSource(pub Option<String>);

impl TokenSource for StaticTokenSource {
    fn bearer_token(&self) -> Option<String> {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn demo_profile() -> UserProfile {
        UserProfile {
            user_id: UserId("demo-user".to_string()),
            email: "doc@example.com".to_string(),
            practice_id: PracticeId("demo-practice".to_string()),
            practice_name: "Demo Dental Practice".to_string(),
            roles: vec!["admin".to_string()],
        }
    }

    #[test]
    fn profile_serializes_camel_case() {
        let json = serde_json::to_value(demo_profile()).unwrap();
        assert_eq!(json["userId"], "demo-user");
        assert_eq!(json["practiceId"], "demo-practice");
        assert_eq!(json["practiceName"], "Demo Dental Practice");
        assert!(json.get("user_id").is_none());
    }

    #[test]
    fn session_roundtrip() {
        let now = Utc::now();
        let session = Session {
            profile: demo_profile(),
            token: "uis-demo.abc".to_string(),
            issued_at: Some(now),
            expires_at: Some(now + Duration::hours(1)),
        };
        let json = serde_json::to_string(&session).unwrap();
        let back: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(back, session);
    }

    #[test]
    fn expiry_window() {
        let now = Utc::now();
        let session = Session {
            profile: demo_profile(),
            token: "t".to_string(),
            issued_at: Some(now),
            expires_at: Some(now + Duration::hours(1)),
        };
        assert!(!session.is_expired(now));
        assert!(session.is_expired(now + Duration::hours(2)));
    }

    #[test]
    fn rehydrated_session_never_expires() {
        let session = Session {
            profile: demo_profile(),
            token: "t".to_string(),
            issued_at: None,
            expires_at: None,
        };
        assert!(!session.is_expired(Utc::now()));
    }
}
