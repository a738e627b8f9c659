use std::sync::Arc;

use crate::SdkError;

/// Represents a result type for provider construction and lifecycle operations.
///
/// Flag evaluation never returns this type: evaluation failures are reported inside
/// [`ResolutionDetails`](crate::ResolutionDetails) instead.
pub type Result<T> = std::result::Result<T, Error>;

/// Enum representing possible errors that can occur while configuring or running the provider.
#[derive(thiserror::Error, Debug, Clone)]
#[non_exhaustive]
pub enum Error {
    /// `api_key` is empty.
    #[error("api_key must not be empty")]
    InvalidApiKey,

    /// `tag` is empty.
    #[error("tag must not be empty")]
    InvalidTag,

    /// `api_endpoint` (combined with `scheme`) is not a valid URL.
    #[error("invalid api_endpoint configuration")]
    InvalidApiEndpoint(#[source] url::ParseError),

    /// `polling_interval` is zero.
    #[error("polling_interval must be greater than zero")]
    InvalidPollingInterval,

    /// The backend SDK failed to start or to close.
    #[error("bucketeer sdk error")]
    // Backend errors are usually not clonable, so we're wrapping them in an Arc.
    Sdk(#[source] Arc<dyn std::error::Error + Send + Sync>),
}

impl Error {
    pub(crate) fn sdk(err: impl Into<SdkError>) -> Error {
        Error::Sdk(Arc::from(err.into()))
    }
}
