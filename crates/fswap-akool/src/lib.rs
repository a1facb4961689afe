//! Client for the Akool face-swap API.
//!
//! The provider is fully asynchronous: a swap is submitted as a job, then
//! polled until it reaches a terminal state. This crate covers the whole
//! round trip:
//!
//! - [`AkoolClient`]: authenticated HTTP calls with retry on transient
//!   transport failures
//! - face detection and landmark extraction ([`AkoolClient::detect_face_landmarks`])
//! - job submission and bounded polling ([`AkoolClient::submit_video_swap`],
//!   [`AkoolClient::wait_for_result`])
//! - [`FaceSwapPipeline`]: uploads local inputs to transient hosting and
//!   drives the stages above end to end

pub mod client;
mod detect;
pub mod error;
pub mod orchestrator;
pub mod swap;
pub mod types;

pub use client::{AkoolClient, AkoolConfig, DEFAULT_BASE_URL};
pub use error::{AkoolError, AkoolResult};
pub use orchestrator::FaceSwapPipeline;
pub use swap::{PollConfig, SwapSubmission};
pub use types::{SuccessRule, SwapImageRef, SwapResultItem, OK_CODE};
