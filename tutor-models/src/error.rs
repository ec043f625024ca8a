//! Error types for model providers.

use thiserror::Error;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during provider operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Provider API returned an error response.
    #[error("provider API error: {0}")]
    ProviderApi(String),

    /// Request failed at the transport level.
    #[error("request failed: {0}")]
    Request(String),

    /// Request exceeded the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// No API key configured for the provider.
    #[error("missing API key for provider: {0}")]
    MissingApiKey(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formats_correctly() {
        let err = Error::ProviderApi("rate limited".to_string());
        assert_eq!(err.to_string(), "provider API error: rate limited");
        assert_eq!(Error::Timeout.to_string(), "request timed out");
    }
}
