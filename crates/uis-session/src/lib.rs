//! uis-session — Session state for the UIS client.
//!
//! This crate is the single source of truth for "who is logged in":
//! - [`store::SessionStore`] owns the in-memory session and serializes all
//!   writes to the durable vault (restore, login, logout)
//! - [`vault`] holds the two durable entries (token + serialized profile)
//!   behind a backend trait
//! - [`exchange`] is the seam a credential exchange plugs into; the shipped
//!   implementation fabricates a demo session and is a documented stand-in
//! - [`guard`] is the pure route-guard decision table consulted before any
//!   protected view renders

pub mod exchange;
pub mod guard;
pub mod store;
pub mod vault;

pub use exchange::{CredentialExchange, DemoExchange};
pub use guard::{evaluate, RouteDecision};
pub use store::{SessionError, SessionStore};
pub use vault::{FileVault, MemoryVault, SessionVault, VaultError};
