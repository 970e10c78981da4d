use thiserror::Error;

use crate::validation::ValidationError;

/// Errors returned by the application store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Investigator not found: {0}")]
    UnknownInvestigator(String),

    #[error("A reason is required to close or archive a record")]
    EmptyCloseReason,

    #[error("Case {0} is already closed")]
    AlreadyClosed(String),

    #[error("Cannot {action} {entity} {id} in its current state")]
    InvalidTransition {
        entity: &'static str,
        id: String,
        action: &'static str,
    },

    #[error("Unknown collection: {0}")]
    UnknownCollection(String),

    #[error("Import rejected: {0}")]
    Import(String),

    /// The backend failed; on writes local state is left untouched
    #[error("Storage error: {0:#}")]
    Backend(#[from] anyhow::Error),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}
