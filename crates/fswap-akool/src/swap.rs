//! Job submission and result polling.

use std::time::Duration;

use reqwest::Method;
use tracing::{debug, info, warn};

use crate::client::{endpoints, AkoolClient};
use crate::error::{AkoolError, AkoolResult};
use crate::types::{
    normalize_result_list, SubmitData, SuccessRule, SwapImageRef, SwapResultItem,
    SwapSubmitPayload,
};
use fswap_models::{FaceLandmarks, SwapEvent, SwapJobId, SwapObserver, SwapPhase, SwapStatus};

/// Inputs for a video face-swap submission.
///
/// When no separate target face is given, the source face URL and its
/// landmarks stand in for the target; the provider treats that as a
/// baseline self-swap, which keeps single-face submissions to one upload
/// and one detection pass.
#[derive(Debug, Clone)]
pub struct SwapSubmission {
    pub source_face_url: String,
    pub source_landmarks: FaceLandmarks,
    pub target_face_url: Option<String>,
    pub target_landmarks: Option<FaceLandmarks>,
    pub video_url: String,
    pub face_enhance: bool,
    pub webhook_url: Option<String>,
}

impl SwapSubmission {
    pub fn new(
        source_face_url: impl Into<String>,
        source_landmarks: FaceLandmarks,
        video_url: impl Into<String>,
    ) -> Self {
        Self {
            source_face_url: source_face_url.into(),
            source_landmarks,
            target_face_url: None,
            target_landmarks: None,
            video_url: video_url.into(),
            face_enhance: true,
            webhook_url: None,
        }
    }

    /// Swap onto a specific target face instead of the source itself.
    pub fn with_target(mut self, url: impl Into<String>, landmarks: FaceLandmarks) -> Self {
        self.target_face_url = Some(url.into());
        self.target_landmarks = Some(landmarks);
        self
    }

    pub fn with_face_enhance(mut self, enabled: bool) -> Self {
        self.face_enhance = enabled;
        self
    }

    pub fn with_webhook(mut self, url: impl Into<String>) -> Self {
        self.webhook_url = Some(url.into());
        self
    }

    fn to_payload(&self) -> SwapSubmitPayload {
        let source = SwapImageRef {
            path: self.source_face_url.clone(),
            opts: self.source_landmarks.encode(),
        };
        // Target URL and landmarks fall back to the source independently.
        let target = SwapImageRef {
            path: self
                .target_face_url
                .clone()
                .unwrap_or_else(|| self.source_face_url.clone()),
            opts: self
                .target_landmarks
                .as_ref()
                .unwrap_or(&self.source_landmarks)
                .encode(),
        };

        SwapSubmitPayload {
            source_image: vec![source],
            target_image: vec![target],
            modify_video: self.video_url.clone(),
            face_enhance: u8::from(self.face_enhance),
            webhook_url: self.webhook_url.clone(),
        }
    }
}

/// Polling cadence and wall-clock budget.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Delay between consecutive polls.
    pub interval: Duration,
    /// Total budget measured from the first poll; never reset by pending
    /// ticks.
    pub timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            timeout: Duration::from_secs(600),
        }
    }
}

impl PollConfig {
    /// Load from `AKOOL_POLL_INTERVAL_SECS` / `AKOOL_POLL_TIMEOUT_SECS`,
    /// defaulting anything unset.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            interval: std::env::var("AKOOL_POLL_INTERVAL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.interval),
            timeout: std::env::var("AKOOL_POLL_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        }
    }
}

impl AkoolClient {
    /// Submit a video face-swap job and return its provider-assigned id.
    ///
    /// The job id is assigned exactly once here; all later polls must reuse
    /// it. Fails with [`AkoolError::MissingLandmarks`] before any network
    /// call when the source landmarks are empty.
    pub async fn submit_video_swap(&self, submission: &SwapSubmission) -> AkoolResult<SwapJobId> {
        if submission.source_landmarks.is_empty() {
            return Err(AkoolError::MissingLandmarks);
        }

        let body = serde_json::to_value(submission.to_payload())
            .map_err(|e| AkoolError::malformed(format!("bad submit payload: {e}")))?;

        let data = self
            .request_json(
                Method::POST,
                endpoints::VIDEO_FACESWAP,
                None,
                Some(&body),
                SuccessRule::Standard,
            )
            .await?;

        let submit: SubmitData = serde_json::from_value(data).unwrap_or_default();
        let id = submit
            .id
            .filter(|id| !id.is_empty())
            .ok_or(AkoolError::MissingJobId)?;

        info!(job_id = %id, "Face-swap job submitted");
        Ok(SwapJobId::from_string(id))
    }

    /// Fetch the current result entries for a job.
    ///
    /// An empty list means the provider has not started reporting on the
    /// job yet.
    pub async fn swap_result(&self, job_id: &SwapJobId) -> AkoolResult<Vec<SwapResultItem>> {
        let data = self
            .request_json(
                Method::GET,
                endpoints::SWAP_RESULT,
                Some(&[("_ids", job_id.as_str())]),
                None,
                SuccessRule::Standard,
            )
            .await?;
        normalize_result_list(&data)
    }

    /// Poll a job until it reaches a terminal state.
    ///
    /// Each tick fetches the result list and interprets the first entry:
    /// success with a result URL finishes the wait, a failed status aborts
    /// with the provider's message, and anything else (including success
    /// that has not published its URL yet) stays pending. The observer is
    /// notified on every tick.
    ///
    /// Returns the result video URL, or [`AkoolError::PollTimeout`] once
    /// the budget elapses without a terminal state.
    pub async fn wait_for_result(
        &self,
        job_id: &SwapJobId,
        poll: &PollConfig,
        observer: &dyn SwapObserver,
    ) -> AkoolResult<String> {
        let started = tokio::time::Instant::now();
        debug!(
            job_id = %job_id,
            interval_secs = poll.interval.as_secs(),
            timeout_secs = poll.timeout.as_secs(),
            "Polling for swap result"
        );

        loop {
            if started.elapsed() >= poll.timeout {
                warn!(job_id = %job_id, "Polling budget exhausted");
                return Err(AkoolError::PollTimeout {
                    secs: poll.timeout.as_secs(),
                });
            }

            let items = self.swap_result(job_id).await?;
            match items.first() {
                None => {
                    observer.on_event(&SwapEvent::new(
                        SwapPhase::Polling,
                        SwapStatus::Pending,
                        "Waiting for processing to start...",
                    ));
                }
                Some(item) => match item.status() {
                    SwapStatus::Success => {
                        if let Some(url) = item.result_url() {
                            observer.on_event(&SwapEvent::new(
                                SwapPhase::Complete,
                                SwapStatus::Success,
                                "Processing complete!",
                            ));
                            info!(job_id = %job_id, url, "Face swap completed");
                            return Ok(url.to_string());
                        }
                        // Success reported before the URL is published:
                        // treat as still processing.
                        observer.on_event(&SwapEvent::new(
                            SwapPhase::Polling,
                            SwapStatus::Pending,
                            format!("Processing video... (status: {})", SwapStatus::Success.code()),
                        ));
                    }
                    SwapStatus::Failed => {
                        let message = item.failure_message();
                        warn!(job_id = %job_id, message, "Provider reported job failure");
                        return Err(AkoolError::JobFailed {
                            job_id: job_id.clone(),
                            message,
                        });
                    }
                    SwapStatus::Pending => {
                        observer.on_event(&SwapEvent::new(
                            SwapPhase::Polling,
                            SwapStatus::Pending,
                            format!(
                                "Processing video... (status: {})",
                                item.faceswap_status.unwrap_or(SwapStatus::Pending.code())
                            ),
                        ));
                    }
                },
            }

            tokio::time::sleep(poll.interval).await;
        }
    }
}
