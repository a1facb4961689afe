//! Provider wire types.
//!
//! Every reply arrives wrapped in a numeric-code envelope, but the provider
//! uses two conventions: most endpoints signal success with `code == 1000`,
//! while face detection uses `error_code == 0`. Envelope decoding is driven
//! by an explicit [`SuccessRule`] so each call site names the convention it
//! expects instead of sniffing fields.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{AkoolError, AkoolResult};
use fswap_models::SwapStatus;

/// Sentinel code the standard endpoints use for success.
pub const OK_CODE: i64 = 1000;

/// Per-endpoint interpretation of a response envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuccessRule {
    /// `code == 1000` means success; failure message under `msg`.
    Standard,
    /// Face detection: `error_code == 0` means success; failure message
    /// under `error_msg`.
    Detect,
}

impl SuccessRule {
    /// Judge an envelope under this rule.
    ///
    /// Returns the rejection code and message when the endpoint-specific
    /// sentinel does not signal success. Absent fields are treated the way
    /// the provider treats them: a missing `code` is a failure, a missing
    /// `error_code` is a success.
    pub fn check(&self, envelope: &ApiEnvelope) -> Result<(), (i64, String)> {
        match self {
            SuccessRule::Standard => {
                let code = envelope.code.unwrap_or(-1);
                if code == OK_CODE {
                    Ok(())
                } else {
                    let message = envelope
                        .msg
                        .clone()
                        .unwrap_or_else(|| "Unknown error".to_string());
                    Err((code, message))
                }
            }
            SuccessRule::Detect => {
                let code = envelope.error_code.unwrap_or(0);
                if code == 0 {
                    Ok(())
                } else {
                    let message = envelope
                        .error_msg
                        .clone()
                        .unwrap_or_else(|| "Face detection failed".to_string());
                    Err((code, message))
                }
            }
        }
    }
}

/// Response envelope covering both provider conventions.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiEnvelope {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub error_code: Option<i64>,
    #[serde(default)]
    pub error_msg: Option<String>,
    #[serde(default)]
    pub data: Value,
}

/// One face reference in a submission payload: a public image URL plus its
/// encoded landmark string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwapImageRef {
    pub path: String,
    pub opts: String,
}

/// Payload for the video face-swap endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct SwapSubmitPayload {
    #[serde(rename = "sourceImage")]
    pub source_image: Vec<SwapImageRef>,
    #[serde(rename = "targetImage")]
    pub target_image: Vec<SwapImageRef>,
    #[serde(rename = "modifyVideo")]
    pub modify_video: String,
    pub face_enhance: u8,
    #[serde(rename = "webhookUrl", skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
}

/// Submission response payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitData {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
}

/// Payload for the face-detection endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct DetectPayload {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_frames: Option<u32>,
}

/// Face-detection response body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DetectResponse {
    /// Faces keyed by sampled frame index ("0", "1", ...).
    #[serde(default)]
    pub faces_obj: BTreeMap<String, FrameFaces>,
}

impl DetectResponse {
    /// Faces from the lowest-numbered sampled frame.
    ///
    /// Keys are numeric strings; comparing them lexicographically would put
    /// "10" before "2", so the minimum is taken numerically.
    pub fn first_frame(&self) -> Option<&FrameFaces> {
        self.faces_obj
            .iter()
            .min_by_key(|(k, _)| k.parse::<u64>().unwrap_or(u64::MAX))
            .map(|(_, faces)| faces)
    }
}

/// Faces detected within one sampled frame. Each entry in `landmarks` is
/// the point set for one detected face.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FrameFaces {
    #[serde(default)]
    pub landmarks: Vec<Vec<(f64, f64)>>,
}

/// One entry in the result-polling response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SwapResultItem {
    #[serde(default)]
    pub faceswap_status: Option<i64>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub video: Option<String>,
    #[serde(default)]
    pub alg_msg: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl SwapResultItem {
    /// Status of this item, with unknown or absent codes treated as pending.
    pub fn status(&self) -> SwapStatus {
        self.faceswap_status
            .map(SwapStatus::from_code)
            .unwrap_or_default()
    }

    /// Result URL precedence: `url` first, then the legacy `video` field.
    /// Empty strings count as absent.
    pub fn result_url(&self) -> Option<&str> {
        self.url
            .as_deref()
            .filter(|u| !u.is_empty())
            .or_else(|| self.video.as_deref().filter(|u| !u.is_empty()))
    }

    /// Failure message precedence: `alg_msg`, then `error`, then a fixed
    /// fallback text.
    pub fn failure_message(&self) -> String {
        self.alg_msg
            .clone()
            .filter(|m| !m.is_empty())
            .or_else(|| self.error.clone().filter(|m| !m.is_empty()))
            .unwrap_or_else(|| "Processing failed".to_string())
    }
}

/// Normalize the polling payload into a list of result items.
///
/// The endpoint has shipped two shapes: `{"result": [...]}` nested inside
/// `data`, and `data` as a bare list. A bare object under `result` is
/// treated as a single-item list. Anything else decodes as empty, which the
/// poll loop reads as "not started yet".
pub fn normalize_result_list(data: &Value) -> AkoolResult<Vec<SwapResultItem>> {
    let list = match data {
        Value::Object(map) => map.get("result").cloned().unwrap_or(Value::Array(vec![])),
        Value::Array(_) => data.clone(),
        _ => Value::Array(vec![]),
    };

    match list {
        Value::Array(_) => serde_json::from_value(list)
            .map_err(|e| AkoolError::malformed(format!("bad result list: {e}"))),
        Value::Object(_) => {
            let item = serde_json::from_value(list)
                .map_err(|e| AkoolError::malformed(format!("bad result item: {e}")))?;
            Ok(vec![item])
        }
        _ => Ok(Vec::new()),
    }
}
