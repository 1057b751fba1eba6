//! Canonical error type shared across adboard crates.

use thiserror::Error;

/// Result type alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the sync core and its collaborators.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or invalid process configuration (e.g. provider credentials).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Single-flight guard rejection: a sync run is already executing.
    #[error("A sync run is already in progress")]
    SyncInProgress,

    /// The remote provider rejected our credentials.
    #[error("Remote authentication error: {0}")]
    RemoteAuth(String),

    /// Transient remote failure (network, rate limit, 5xx).
    #[error("Remote transient error: {0}")]
    RemoteTransient(String),

    /// The remote provider returned a response we could not interpret.
    #[error("Remote format error: {0}")]
    RemoteFormat(String),

    /// Local persistence failure.
    #[error("Storage error: {0}")]
    Store(String),

    /// Invalid caller-supplied value.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Missing or invalid session.
    #[error("Unauthorized")]
    Unauthorized,

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a storage error.
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store(message.into())
    }

    /// Stable machine-readable kind, used in API payloads and status records.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::SyncInProgress => "already_in_progress",
            Self::RemoteAuth(_) => "remote_auth",
            Self::RemoteTransient(_) => "remote_transient",
            Self::RemoteFormat(_) => "remote_format",
            Self::Store(_) => "store",
            Self::Validation(_) => "validation",
            Self::Unauthorized => "unauthorized",
            Self::Serialization(_) => "serialization",
        }
    }
}
