//! uis-gateway — API gateway client for the UIS dashboard.
//!
//! This crate is the single channel to the external GraphQL endpoint. All
//! data operations flow through it to ensure consistent request
//! authentication (bearer token read at request time) and response caching
//! (normalized cache with per-operation merge policies).
//!
//! - [`client`] — the configured HTTP transport and error taxonomy
//! - [`cache`] — normalized response cache keyed by operation + variables
//! - [`operations`] — the typed operation catalog for the dashboard queries
//! - [`binding`] — per-view query bindings: the {data, loading, error,
//!   refetch} lifecycle with sequence-numbered stale-response discard

pub mod binding;
pub mod cache;
pub mod client;
pub mod operations;

pub use binding::{BindingView, Phase, QueryBinding};
pub use cache::{FetchPolicy, MergePolicy, QueryCache};
pub use client::{GatewayClient, GatewayConfig, GatewayError};
pub use operations::Operation;
