//! Shared error type for all provider adapters.

use thiserror::Error;

/// Errors that a provider adapter can return from its primary operation.
///
/// Adapters never retry internally; a single failed request surfaces as one
/// of these variants and the fallback policy decides what happens next.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// The required credential is absent or equals the placeholder sentinel.
    #[error("{provider} is not configured")]
    NotConfigured { provider: &'static str },

    /// Transport-level failure (connection refused, DNS, TLS …).
    #[error("{provider} request failed: {reason}")]
    Request {
        provider: &'static str,
        reason: String,
    },

    /// The request did not complete within the configured timeout.
    #[error("{provider} request timed out")]
    Timeout { provider: &'static str },

    /// The provider answered with a non-success HTTP status.
    #[error("{provider} API error: {status} - {message}")]
    Http {
        provider: &'static str,
        status: u16,
        message: String,
    },

    /// The response body did not have the expected shape.
    #[error("failed to parse {provider} response: {reason}")]
    Parse {
        provider: &'static str,
        reason: String,
    },
}

impl ProviderError {
    /// Map a `reqwest` error onto the adapter error taxonomy.
    pub fn from_reqwest(provider: &'static str, e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProviderError::Timeout { provider }
        } else {
            ProviderError::Request {
                provider,
                reason: e.to_string(),
            }
        }
    }

    /// Which provider produced the error.
    pub fn provider(&self) -> &'static str {
        match self {
            ProviderError::NotConfigured { provider }
            | ProviderError::Request { provider, .. }
            | ProviderError::Timeout { provider }
            | ProviderError::Http { provider, .. }
            | ProviderError::Parse { provider, .. } => provider,
        }
    }
}
