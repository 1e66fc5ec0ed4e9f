//! Error types for MySQL rendering.

use oxide_criteria_core::CriteriaError;

/// Errors raised by the MySQL renderer and its configuration.
#[derive(Debug, thiserror::Error)]
pub enum MySqlError {
    /// Construction, validation or rendering failed.
    #[error(transparent)]
    Criteria(#[from] CriteriaError),

    /// The renderer configuration could not be parsed.
    #[error("invalid renderer configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result type for MySQL rendering.
pub type Result<T> = std::result::Result<T, MySqlError>;
