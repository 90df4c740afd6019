use thiserror::Error;

/// Failure of a single backend call.
///
/// Transport, protocol and page-parsing failures all end up here so callers
/// only deal with one error kind per backend request.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("invalid backend URL: {0}")]
    InvalidUrl(String),
    #[error("failed to parse page markup: {0}")]
    Markup(String),
    #[error("no replies section found in status page")]
    NoRepliesSection,
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Error returned by a conversation load.
#[derive(Debug, Error)]
pub enum ConversationError {
    /// The account's platform has no backend implementation.
    #[error("API not supported for platform {0}")]
    UnsupportedPlatform(String),
    #[error(transparent)]
    Backend(#[from] BackendError),
}
