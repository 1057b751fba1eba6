//! Error types for the reports client.

use thiserror::Error;

/// Result type alias for reports-client operations.
pub type Result<T> = std::result::Result<T, DirectApiError>;

/// Retry policy class for API failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiRetryClass {
    Retryable,
    Permanent,
    ReauthRequired,
}

/// Errors that can occur while fetching provider reports.
#[derive(Debug, Error)]
pub enum DirectApiError {
    /// Access token or client login missing from configuration. Raised
    /// before any network call is attempted.
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    /// The provider rejected our credentials.
    #[error("Authentication rejected ({status}): {message}")]
    Auth { status: u16, message: String },

    /// Transient provider failure: rate limit, timeout, 5xx.
    #[error("Transient API failure ({status}): {message}")]
    Transient { status: u16, message: String },

    /// Network-level failure before a status code was received.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The provider returned a response we could not interpret.
    #[error("Malformed response: {0}")]
    Format(String),
}

impl DirectApiError {
    pub fn format(message: impl Into<String>) -> Self {
        Self::Format(message.into())
    }

    /// Classify error for the in-client retry policy.
    pub fn retry_class(&self) -> ApiRetryClass {
        match self {
            Self::MissingCredentials(_) => ApiRetryClass::Permanent,
            Self::Auth { .. } => ApiRetryClass::ReauthRequired,
            Self::Transient { .. } => ApiRetryClass::Retryable,
            Self::Network(err) => {
                if err.is_decode() {
                    ApiRetryClass::Permanent
                } else {
                    ApiRetryClass::Retryable
                }
            }
            Self::Format(_) => ApiRetryClass::Permanent,
        }
    }

    /// Classify an HTTP status outside the 2xx range.
    pub fn from_status(status: u16, message: String) -> Self {
        match status {
            401 | 403 => Self::Auth { status, message },
            408 | 429 => Self::Transient { status, message },
            500..=599 => Self::Transient { status, message },
            _ => Self::Format(format!("HTTP {}: {}", status, message)),
        }
    }
}

impl From<DirectApiError> for adboard_core::Error {
    fn from(err: DirectApiError) -> Self {
        match err {
            DirectApiError::MissingCredentials(message) => {
                adboard_core::Error::Configuration(message)
            }
            DirectApiError::Auth { .. } => adboard_core::Error::RemoteAuth(err.to_string()),
            DirectApiError::Transient { .. } => {
                adboard_core::Error::RemoteTransient(err.to_string())
            }
            DirectApiError::Network(ref inner) => {
                if inner.is_decode() {
                    adboard_core::Error::RemoteFormat(err.to_string())
                } else {
                    adboard_core::Error::RemoteTransient(err.to_string())
                }
            }
            DirectApiError::Format(message) => adboard_core::Error::RemoteFormat(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_class_per_status() {
        assert_eq!(
            DirectApiError::from_status(401, "bad token".into()).retry_class(),
            ApiRetryClass::ReauthRequired
        );
        assert_eq!(
            DirectApiError::from_status(429, "slow down".into()).retry_class(),
            ApiRetryClass::Retryable
        );
        assert_eq!(
            DirectApiError::from_status(503, "overloaded".into()).retry_class(),
            ApiRetryClass::Retryable
        );
        assert_eq!(
            DirectApiError::from_status(400, "bad request".into()).retry_class(),
            ApiRetryClass::Permanent
        );
    }

    #[test]
    fn conversion_into_core_taxonomy() {
        let err: adboard_core::Error =
            DirectApiError::MissingCredentials("no token".into()).into();
        assert_eq!(err.kind(), "configuration");

        let err: adboard_core::Error = DirectApiError::from_status(403, "denied".into()).into();
        assert_eq!(err.kind(), "remote_auth");

        let err: adboard_core::Error = DirectApiError::from_status(500, "boom".into()).into();
        assert_eq!(err.kind(), "remote_transient");

        let err: adboard_core::Error = DirectApiError::format("not json").into();
        assert_eq!(err.kind(), "remote_format");
    }
}
