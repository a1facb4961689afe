//! Face detection and landmark extraction.

use reqwest::Method;
use tracing::{debug, info};

use crate::client::{endpoints, AkoolClient};
use crate::error::{AkoolError, AkoolResult};
use crate::types::{DetectPayload, DetectResponse, SuccessRule};
use fswap_models::{FaceLandmarks, MediaKind};

impl AkoolClient {
    /// Detect faces in hosted media and return the first face's landmarks.
    ///
    /// Video probes sample a single frame; images are inspected whole.
    /// Multi-face media is not disambiguated: the first detected face in the
    /// lowest-numbered frame wins. Fails with [`AkoolError::NoFaceDetected`]
    /// when the provider finds nothing and [`AkoolError::LandmarksMissing`]
    /// when a face is reported without usable points.
    pub async fn detect_face_landmarks(
        &self,
        media_url: &str,
        kind: MediaKind,
    ) -> AkoolResult<FaceLandmarks> {
        let payload = DetectPayload {
            url: media_url.to_string(),
            num_frames: match kind {
                MediaKind::Video => Some(1),
                MediaKind::Image => None,
            },
        };
        let body = serde_json::to_value(&payload)
            .map_err(|e| AkoolError::malformed(format!("bad detect payload: {e}")))?;

        debug!(url = media_url, kind = kind.as_str(), "Requesting face detection");
        let value = self
            .request_json(
                Method::POST,
                endpoints::FACE_DETECT,
                None,
                Some(&body),
                SuccessRule::Detect,
            )
            .await?;

        let response: DetectResponse = serde_json::from_value(value)
            .map_err(|e| AkoolError::malformed(format!("bad detect response: {e}")))?;

        let frame = response.first_frame().ok_or(AkoolError::NoFaceDetected)?;
        let points = frame
            .landmarks
            .first()
            .filter(|group| !group.is_empty())
            .ok_or(AkoolError::LandmarksMissing)?;

        let landmarks = FaceLandmarks::from_points(points);
        info!(points = landmarks.len(), "Face landmarks detected");
        Ok(landmarks)
    }
}
