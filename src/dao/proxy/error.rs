use reqwest::StatusCode;
use thiserror::Error;

/// Result alias for proxy client calls.
pub type ProxyClientResult<T> = Result<T, ProxyClientError>;

/// Failures talking to the completion or transcription proxy.
#[derive(Debug, Error)]
pub enum ProxyClientError {
    /// Building the HTTP client failed.
    #[error("failed to build HTTP client")]
    ClientBuilder {
        /// Transport error.
        #[source]
        source: reqwest::Error,
    },
    /// The request could not be sent.
    #[error("request to {endpoint} failed")]
    RequestSend {
        /// Proxy route that was called.
        endpoint: &'static str,
        /// Transport error.
        #[source]
        source: reqwest::Error,
    },
    /// The proxy answered with a non-success status.
    #[error("{endpoint} returned {status}: {message}")]
    RequestStatus {
        /// Proxy route that was called.
        endpoint: &'static str,
        /// HTTP status returned.
        status: StatusCode,
        /// `error` field of the response, or the raw body.
        message: String,
    },
    /// The success body could not be decoded.
    #[error("failed to decode {endpoint} response")]
    DecodeResponse {
        /// Proxy route that was called.
        endpoint: &'static str,
        /// Transport error.
        #[source]
        source: reqwest::Error,
    },
    /// The clip MIME type is not a valid header value.
    #[error("invalid audio MIME type {mime_type}")]
    InvalidMime {
        /// Rejected MIME type.
        mime_type: String,
        /// Transport error.
        #[source]
        source: reqwest::Error,
    },
    /// The in-process service rejected the request.
    #[error("{0}")]
    Service(String),
}
