//! Hosting error types.

use thiserror::Error;

pub type HostingResult<T> = Result<T, HostingError>;

/// Errors raised while uploading to transient hosting.
#[derive(Debug, Error)]
pub enum HostingError {
    /// The backend answered but refused the upload.
    #[error("{backend} rejected upload: {message}")]
    BackendRejected {
        backend: &'static str,
        message: String,
    },

    /// The backend answered with a body we could not use.
    #[error("{backend} returned malformed payload: {message}")]
    MalformedResponse {
        backend: &'static str,
        message: String,
    },

    /// Every configured backend failed; wraps the last failure seen.
    #[error("all hosting backends failed, last ({backend}): {source}")]
    AllBackendsFailed {
        backend: &'static str,
        #[source]
        source: Box<HostingError>,
    },

    #[error("no hosting backends configured")]
    NoBackends,

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl HostingError {
    pub fn rejected(backend: &'static str, message: impl Into<String>) -> Self {
        Self::BackendRejected {
            backend,
            message: message.into(),
        }
    }

    pub fn malformed(backend: &'static str, message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            backend,
            message: message.into(),
        }
    }
}
