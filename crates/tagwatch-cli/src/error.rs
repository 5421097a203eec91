//! Error types for tagwatch-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from tagwatch-core
    #[error(transparent)]
    Core(#[from] tagwatch_core::Error),

    /// Error from tagwatch-store
    #[error(transparent)]
    Store(#[from] tagwatch_store::Error),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }
}
