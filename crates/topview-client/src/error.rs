use thiserror::Error;

/// Errors that can be returned by topview-client operations.
#[derive(Debug, Error)]
pub enum TopViewError {
    /// The client was built without a vendor key/uid pair. Raised before any
    /// request is constructed.
    #[error("TopView API credentials not configured")]
    MissingCredentials,

    /// A required argument was empty or malformed.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The configured base URL could not be parsed.
    #[error("invalid TopView base URL {url:?}: {message}")]
    InvalidBaseUrl { url: String, message: String },

    /// An HTTP request failed (connect error, timeout, broken body, etc.).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The vendor answered with a body that is not JSON.
    #[error("invalid TopView response (HTTP {status}): {message}")]
    InvalidResponse { status: u16, message: String },
}
