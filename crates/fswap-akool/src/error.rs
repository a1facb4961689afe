//! Provider client error types.

use std::path::PathBuf;

use fswap_hosting::HostingError;
use fswap_models::SwapJobId;
use thiserror::Error;

pub type AkoolResult<T> = Result<T, AkoolError>;

/// Errors raised by the provider client and pipeline.
#[derive(Debug, Error)]
pub enum AkoolError {
    /// The HTTP exchange succeeded but the provider answered with a
    /// non-success envelope code. Never retried.
    #[error("provider rejected request [{code}]: {message}")]
    Rejected { code: i64, message: String },

    /// Non-2xx HTTP response outside the envelope protocol.
    #[error("provider HTTP error {status}: {message}")]
    HttpStatus { status: u16, message: String },

    #[error("no face detected in source image")]
    NoFaceDetected,

    #[error("face detected but landmark points are missing")]
    LandmarksMissing,

    #[error("API key is required")]
    MissingApiKey,

    #[error("source landmarks are required for submission")]
    MissingLandmarks,

    #[error("input file not found: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("provider returned no job id")]
    MissingJobId,

    /// The provider reached a terminal failed state for the job.
    #[error("job {job_id} failed: {message}")]
    JobFailed { job_id: SwapJobId, message: String },

    /// No terminal state inside the polling budget.
    #[error("no result after {secs}s of polling")]
    PollTimeout { secs: u64 },

    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("upload failed: {0}")]
    Hosting(#[from] HostingError),
}

impl AkoolError {
    pub fn rejected(code: i64, message: impl Into<String>) -> Self {
        Self::Rejected {
            code,
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse(message.into())
    }

    /// Transient transport failures worth retrying.
    ///
    /// Only timeouts and connection failures qualify; an HTTP status or an
    /// envelope rejection means the provider made a decision, and repeating
    /// the request would just repeat the decision.
    pub fn is_transient(&self) -> bool {
        matches!(self, AkoolError::Transport(e) if e.is_timeout() || e.is_connect())
    }
}
