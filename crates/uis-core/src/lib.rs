//! uis-core: Shared types, configuration, and error handling for the UIS client core.
//!
//! This crate provides the foundational pieces used across all UIS client components:
//! - Session and user-profile types held by the session store
//! - The `TokenSource` seam the gateway reads bearer credentials through
//! - Configuration management (endpoints, chat model, state directory)
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use config::ApiConfig;
pub use error::UisError;
pub use types::{PracticeId, Session, TokenSource, UserId, UserProfile};
