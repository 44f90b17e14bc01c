use thiserror::Error;

/// Errors visible to the caller of widget creation or update.
///
/// Everything that happens after the frame is mounted is contained inside the
/// bridge and only reported through logs and [`crate::HandshakeOutcome`].
#[derive(Debug, Error)]
pub enum WidgetError {
    #[error("invalid configuration: {0}")]
    Configuration(String),
    #[error("failed to mount widget frame: {0}")]
    Mount(String),
    #[error("widget has been destroyed")]
    Destroyed,
}

impl From<EndpointError> for WidgetError {
    fn from(err: EndpointError) -> Self {
        Self::Configuration(err.to_string())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EndpointError {
    #[error("widget url '{0}' is not a valid absolute url")]
    Invalid(String),
    #[error("widget url must use http or https, got '{0}'")]
    UnsupportedScheme(String),
    #[error("widget url '{0}' has no host origin")]
    OpaqueOrigin(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("no wallet provider available")]
    Unavailable,
    #[error("wallet provider returned no accounts")]
    NoAccounts,
    #[error("{method} rejected: {reason}")]
    Rejected { method: &'static str, reason: String },
    #[error("unexpected {method} response: {detail}")]
    InvalidResponse { method: &'static str, detail: String },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LogoError {
    #[error("logo fetch failed: {0}")]
    Fetch(String),
    #[error("logo could not be encoded: {0}")]
    Encode(String),
}

/// Failure to hand a message to the frame's content window.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("post to frame failed: {0}")]
pub struct PostError(pub String);
