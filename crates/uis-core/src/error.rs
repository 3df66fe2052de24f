use thiserror::Error;

/// Top-level error type for the UIS client core.
///
/// Errors are resolved at the layer that can act on them: the session store
/// swallows persistence corruption, query bindings surface transport errors
/// to their view. Nothing propagates as a panic across a crate boundary.
#[derive(Error, Debug)]
pub enum UisError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}
