//! End-to-end face-swap pipeline.

use std::path::Path;

use tracing::info;

use crate::client::AkoolClient;
use crate::error::{AkoolError, AkoolResult};
use crate::swap::{PollConfig, SwapSubmission};
use fswap_hosting::TempHostUploader;
use fswap_models::{MediaAsset, MediaKind, SwapEvent, SwapObserver, SwapPhase};

/// Composes hosting uploads, face detection, submission, and polling into
/// one sequential run.
///
/// Stages are strictly ordered and each is gated on the previous one; the
/// first failure aborts the run and surfaces as-is. Landmarks detected in
/// the detection stage are passed to submission unchanged.
#[derive(Debug, Clone)]
pub struct FaceSwapPipeline {
    client: AkoolClient,
    uploader: TempHostUploader,
    poll: PollConfig,
}

impl FaceSwapPipeline {
    pub fn new(client: AkoolClient, uploader: TempHostUploader) -> Self {
        Self {
            client,
            uploader,
            poll: PollConfig::default(),
        }
    }

    pub fn with_poll_config(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    pub fn client(&self) -> &AkoolClient {
        &self.client
    }

    /// Run a face swap: upload both inputs, detect landmarks on the face
    /// image, submit the job, and poll to a terminal outcome.
    ///
    /// Both paths are checked up front so a missing file fails before any
    /// upload starts. Returns the URL of the processed video.
    pub async fn run(
        &self,
        face_image: &Path,
        video: &Path,
        face_enhance: bool,
        observer: &dyn SwapObserver,
    ) -> AkoolResult<String> {
        let face = MediaAsset::image(face_image);
        let video = MediaAsset::video(video);
        for asset in [&face, &video] {
            if !asset.exists() {
                return Err(AkoolError::MissingInput(asset.path().to_path_buf()));
            }
        }

        observer.on_event(&SwapEvent::stage(
            SwapPhase::UploadingFace,
            "Uploading face image...",
        ));
        let face_url = self.uploader.upload(face.path()).await?;
        info!(url = %face_url, "Face image uploaded");

        observer.on_event(&SwapEvent::stage(
            SwapPhase::UploadingVideo,
            "Uploading video...",
        ));
        let video_url = self.uploader.upload(video.path()).await?;
        info!(url = %video_url, "Video uploaded");

        observer.on_event(&SwapEvent::stage(
            SwapPhase::DetectingFace,
            "Detecting face landmarks...",
        ));
        let landmarks = self
            .client
            .detect_face_landmarks(&face_url, MediaKind::Image)
            .await?;

        observer.on_event(&SwapEvent::stage(
            SwapPhase::Submitting,
            "Starting face swap processing...",
        ));
        let submission = SwapSubmission::new(face_url, landmarks, video_url)
            .with_face_enhance(face_enhance);
        let job_id = self.client.submit_video_swap(&submission).await?;

        observer.on_event(&SwapEvent::stage(
            SwapPhase::Polling,
            format!("Job {job_id} submitted, waiting for result..."),
        ));
        self.client
            .wait_for_result(&job_id, &self.poll, observer)
            .await
    }
}
