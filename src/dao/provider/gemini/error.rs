//! Error types raised by the Gemini provider client.

use reqwest::StatusCode;
use thiserror::Error;

/// Convenient result alias returning [`ProviderError`] failures.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Failures that can occur while calling the hosted provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// No API key is available in the environment.
    #[error("missing provider API key in `{var}`")]
    MissingApiKey {
        /// Environment variable that was checked.
        var: &'static str,
    },
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build provider client")]
    ClientBuilder {
        /// Transport error.
        #[source]
        source: reqwest::Error,
    },
    /// The request could not be sent.
    #[error("failed to send provider request for {operation}")]
    RequestSend {
        /// Provider call that failed.
        operation: &'static str,
        /// Transport error.
        #[source]
        source: reqwest::Error,
    },
    /// The provider answered with a non-success status.
    #[error("provider returned status {status} for {operation}: {message}")]
    RequestStatus {
        /// Provider call that failed.
        operation: &'static str,
        /// HTTP status returned.
        status: StatusCode,
        /// Error message from the response body, or the raw body.
        message: String,
    },
    /// Response payload could not be decoded.
    #[error("failed to decode provider response for {operation}")]
    DecodeResponse {
        /// Provider call that failed.
        operation: &'static str,
        /// Transport error.
        #[source]
        source: reqwest::Error,
    },
    /// The resumable upload handshake did not return an upload URL.
    #[error("provider did not return an upload URL")]
    MissingUploadUrl,
}
