//! Error Types

use thiserror::Error;

/// Result type alias for flow operations
pub type Result<T> = std::result::Result<T, FlowError>;

/// Card setup flow errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    /// Request could not be sent or the connection failed
    #[error("Network error: {0}")]
    Network(String),

    /// Backend answered with a non-success status
    #[error("Backend returned HTTP {status} for {path}")]
    Http { status: u16, path: String },

    /// Response or SDK payload could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// A page element the flow binds to is absent
    #[error("Missing page element: {0}")]
    MissingElement(String),

    /// Page manipulation failed
    #[error("DOM error: {0}")]
    Dom(String),

    /// Payment SDK raised or rejected outside of a card decline
    #[error("Payment SDK error: {0}")]
    Sdk(String),

    /// Browser navigation failed
    #[error("Navigation error: {0}")]
    Navigation(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl FlowError {
    /// Errors raised before the card widget exists, i.e. while fetching the
    /// key or the setup intent
    pub const fn is_fetch_error(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Http { .. } | Self::Decode(_)
        )
    }
}

impl From<serde_json::Error> for FlowError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_error_message() {
        let err = FlowError::Http {
            status: 502,
            path: "/public-key".into(),
        };
        assert_eq!(err.to_string(), "Backend returned HTTP 502 for /public-key");
        assert!(err.is_fetch_error());
    }

    #[test]
    fn test_missing_element_is_not_fetch_error() {
        let err = FlowError::MissingElement("#card-element".into());
        assert!(!err.is_fetch_error());
    }
}
