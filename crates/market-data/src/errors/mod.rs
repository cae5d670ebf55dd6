//! Error types and retry classification for the market data crate.
//!
//! This module provides:
//! - [`MarketDataError`]: The error enum for all data source operations
//! - [`RetryClass`]: Classification for determining retry behavior

mod retry;

pub use retry::RetryClass;

use thiserror::Error;

/// Errors that can occur while fetching fund data from a source.
///
/// Each variant is classified into a [`RetryClass`] via the [`retry_class`](Self::retry_class)
/// method, which the chunked fetch client uses to decide whether a chunk is worth a second try.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The provider rate limited the request (HTTP 429).
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// The request to the provider timed out.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// A provider-specific error occurred (non-success HTTP status, error payload).
    #[error("Provider error: {provider} - {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// The provider answered, but the payload could not be interpreted.
    #[error("Parse error: {provider} - {message}")]
    Parse {
        /// The provider whose payload failed to parse
        provider: String,
        /// What was wrong with the payload
        message: String,
    },

    /// The requested range is malformed (start after end, unparseable dates).
    #[error("Invalid date range: {0}")]
    InvalidRange(String),

    /// A network error occurred while communicating with a provider.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl MarketDataError {
    /// Returns the retry classification for this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use fundwatch_market_data::errors::{MarketDataError, RetryClass};
    ///
    /// let error = MarketDataError::RateLimited { provider: "TEFAS".to_string() };
    /// assert_eq!(error.retry_class(), RetryClass::WithBackoff);
    ///
    /// let error = MarketDataError::InvalidRange("start after end".to_string());
    /// assert_eq!(error.retry_class(), RetryClass::Never);
    /// ```
    pub fn retry_class(&self) -> RetryClass {
        match self {
            Self::RateLimited { .. } | Self::Timeout { .. } => RetryClass::WithBackoff,
            Self::Network(e) if e.is_timeout() || e.is_connect() => RetryClass::WithBackoff,
            Self::ProviderError { .. }
            | Self::Parse { .. }
            | Self::InvalidRange(_)
            | Self::Network(_) => RetryClass::Never,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_retries_with_backoff() {
        let error = MarketDataError::RateLimited {
            provider: "TEFAS".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::WithBackoff);
    }

    #[test]
    fn test_timeout_retries_with_backoff() {
        let error = MarketDataError::Timeout {
            provider: "TEFAS".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::WithBackoff);
    }

    #[test]
    fn test_provider_error_never_retries() {
        let error = MarketDataError::ProviderError {
            provider: "TEFAS".to_string(),
            message: "HTTP 500 Internal Server Error - ".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::Never);
    }

    #[test]
    fn test_parse_and_range_errors_never_retry() {
        let error = MarketDataError::Parse {
            provider: "TEFAS".to_string(),
            message: "missing data array".to_string(),
        };
        assert_eq!(error.retry_class(), RetryClass::Never);

        let error = MarketDataError::InvalidRange("start after end".to_string());
        assert_eq!(error.retry_class(), RetryClass::Never);
    }

    #[test]
    fn test_error_display() {
        let error = MarketDataError::RateLimited {
            provider: "TEFAS".to_string(),
        };
        assert_eq!(format!("{}", error), "Rate limited: TEFAS");

        let error = MarketDataError::ProviderError {
            provider: "TEFAS".to_string(),
            message: "HTTP 503".to_string(),
        };
        assert_eq!(format!("{}", error), "Provider error: TEFAS - HTTP 503");
    }
}
