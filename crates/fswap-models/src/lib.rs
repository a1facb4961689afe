//! Shared domain models for the face-swap backend.
//!
//! This crate defines the vocabulary the other crates speak:
//! - Media inputs and their kinds
//! - Face landmark points and their provider encoding
//! - Job identity and provider status codes
//! - Progress events and the observer trait used to surface them

pub mod job;
pub mod landmarks;
pub mod media;
pub mod progress;

pub use job::{SwapJobId, SwapStatus};
pub use landmarks::{FaceLandmarks, LandmarksParseError};
pub use media::{MediaAsset, MediaKind};
pub use progress::{
    ChannelObserver, LogObserver, NullObserver, SwapEvent, SwapObserver, SwapPhase,
};
