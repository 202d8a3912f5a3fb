//! Error taxonomy for inventory and advisory operations.

use thiserror::Error;

/// Result alias used by the store and the advisor.
pub type PantryResult<T> = std::result::Result<T, PantryError>;

/// Everything a Pantry operation can fail with.
///
/// Persistence and advisory-service errors wrap the underlying cause so the
/// user-facing message can include it.
#[derive(Debug, Error)]
pub enum PantryError {
    /// The backing store was unreachable or rejected the statement.
    #[error("persistence error: {0:#}")]
    Persistence(#[source] anyhow::Error),

    /// Required input was missing; no mutation was attempted.
    #[error("{0}")]
    Validation(String),

    /// A recipe was requested while the inventory is empty.
    #[error("the inventory is empty")]
    EmptyInventory,

    /// The embedder, the vector index, or the generation model failed.
    #[error("advisory service error: {0:#}")]
    AdvisoryService(#[source] anyhow::Error),
}

impl PantryError {
    pub fn persistence(err: impl Into<anyhow::Error>) -> Self {
        Self::Persistence(err.into())
    }

    pub fn advisory(err: impl Into<anyhow::Error>) -> Self {
        Self::AdvisoryService(err.into())
    }
}
