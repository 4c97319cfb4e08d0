//! Error types for document operations.
//!
//! Store mutations have no error channel; invalid references degrade to
//! no-ops. Only import/export can fail.

use thiserror::Error;

use crate::LayerId;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Document serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Two layers in an imported document share an id.
    #[error("Duplicate layer id: {0}")]
    DuplicateLayerId(LayerId),
}
