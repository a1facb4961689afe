//! Progress events and observers for pipeline runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::SwapStatus;

/// Pipeline stage that produced a progress event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwapPhase {
    UploadingFace,
    UploadingVideo,
    DetectingFace,
    Submitting,
    Polling,
    Complete,
}

impl SwapPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SwapPhase::UploadingFace => "uploading_face",
            SwapPhase::UploadingVideo => "uploading_video",
            SwapPhase::DetectingFace => "detecting_face",
            SwapPhase::Submitting => "submitting",
            SwapPhase::Polling => "polling",
            SwapPhase::Complete => "complete",
        }
    }
}

/// A progress notification emitted by the pipeline.
///
/// Events are advisory: dropping them never changes the outcome of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapEvent {
    pub phase: SwapPhase,
    pub status: SwapStatus,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl SwapEvent {
    pub fn new(phase: SwapPhase, status: SwapStatus, message: impl Into<String>) -> Self {
        Self {
            phase,
            status,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    /// A stage-boundary event for work that is still in flight.
    pub fn stage(phase: SwapPhase, message: impl Into<String>) -> Self {
        Self::new(phase, SwapStatus::Pending, message)
    }
}

/// Observer invoked at stage boundaries and on every poll tick.
///
/// Implementations must return quickly and must not fail: notifications are
/// fire-and-forget and a broken observer cannot stall or abort a run.
pub trait SwapObserver: Send + Sync {
    fn on_event(&self, event: &SwapEvent);
}

/// Observer that discards all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl SwapObserver for NullObserver {
    fn on_event(&self, _event: &SwapEvent) {}
}

/// Observer that reports events through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl SwapObserver for LogObserver {
    fn on_event(&self, event: &SwapEvent) {
        tracing::info!(
            phase = event.phase.as_str(),
            status = event.status.as_str(),
            "{}",
            event.message
        );
    }
}

/// Observer that forwards events over an unbounded channel.
///
/// Send failures (receiver dropped) are ignored so a disappearing consumer
/// cannot stall the pipeline.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    tx: mpsc::UnboundedSender<SwapEvent>,
}

impl ChannelObserver {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SwapEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl SwapObserver for ChannelObserver {
    fn on_event(&self, event: &SwapEvent) {
        let _ = self.tx.send(event.clone());
    }
}
