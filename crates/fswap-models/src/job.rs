//! Swap job identity and provider status codes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Provider-assigned job identifier.
///
/// Assigned exactly once at submission; every subsequent poll for the job
/// carries the same value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SwapJobId(String);

impl SwapJobId {
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for SwapJobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SwapJobId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for SwapJobId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Processing status reported by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapStatus {
    #[default]
    Pending,
    Success,
    Failed,
}

impl SwapStatus {
    /// Map the provider's numeric status code.
    ///
    /// Codes outside the documented set are treated as still pending rather
    /// than as errors, so newly introduced intermediate codes keep the poll
    /// loop alive instead of failing it.
    pub fn from_code(code: i64) -> Self {
        match code {
            2 => SwapStatus::Success,
            3 => SwapStatus::Failed,
            _ => SwapStatus::Pending,
        }
    }

    /// The canonical numeric code for this status.
    pub fn code(&self) -> i64 {
        match self {
            SwapStatus::Pending => 1,
            SwapStatus::Success => 2,
            SwapStatus::Failed => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SwapStatus::Pending => "pending",
            SwapStatus::Success => "success",
            SwapStatus::Failed => "failed",
        }
    }

    /// Whether the status ends the poll loop.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SwapStatus::Success | SwapStatus::Failed)
    }
}

impl fmt::Display for SwapStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
