use serde::{Deserialize, Serialize};

pub type Result<T> = std::result::Result<T, EngineError>;

/// Structured error types for engine operations.
///
/// These errors are designed to cross process boundaries and be rendered
/// directly as user-visible alerts by the screen layer.
#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum EngineError {
    /// A remote call rejected: timeout, 4xx/5xx, connectivity.
    #[error("Network error: {message}")]
    Network { message: String },

    /// Synthesized locally when some but not all concurrent calls of one
    /// logical operation failed. The remote store may hold a partially
    /// applied result until the follow-up refetch lands.
    #[error("Consistency error: {message}")]
    Consistency { message: String },

    /// Caller referenced a record id the engine does not know.
    #[error("Record not found: {id}")]
    RecordNotFound { id: String },

    /// Caller passed a row or page index outside the current bounds.
    #[error("Index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

impl EngineError {
    pub fn network(message: impl Into<String>) -> Self {
        EngineError::Network {
            message: message.into(),
        }
    }

    pub fn consistency(message: impl Into<String>) -> Self {
        EngineError::Consistency {
            message: message.into(),
        }
    }
}
