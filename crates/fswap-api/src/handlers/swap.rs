//! Face-swap and credit handlers.

use std::time::Instant;

use axum::body::Bytes;
use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::files;
use crate::metrics;
use crate::state::AppState;
use fswap_models::{LogObserver, MediaKind};

#[derive(Debug, Serialize)]
pub struct SwapResponse {
    pub result_url: String,
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// POST /api/swap
///
/// Multipart fields:
/// - `face`: source face image (jpg/jpeg/png)
/// - `video`: target video (mp4/mov)
/// - `face_enhance` (optional): boolean, defaults to true
///
/// Processes synchronously and responds with the result video URL once the
/// provider finishes.
pub async fn process_swap(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> ApiResult<Json<SwapResponse>> {
    let mut face: Option<(String, Bytes)> = None;
    let mut video: Option<(String, Bytes)> = None;
    let mut face_enhance = true;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("invalid multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("face") => {
                let file_name = field.file_name().unwrap_or("face.jpg").to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("failed to read face field: {e}")))?;
                face = Some((file_name, data));
            }
            Some("video") => {
                let file_name = field.file_name().unwrap_or("video.mp4").to_string();
                let data = field.bytes().await.map_err(|e| {
                    ApiError::bad_request(format!("failed to read video field: {e}"))
                })?;
                video = Some((file_name, data));
            }
            Some("face_enhance") => {
                let text = field.text().await.map_err(|e| {
                    ApiError::bad_request(format!("failed to read face_enhance field: {e}"))
                })?;
                face_enhance = parse_bool(&text)
                    .ok_or_else(|| ApiError::validation("face_enhance must be a boolean"))?;
            }
            // Unknown fields are ignored.
            _ => {}
        }
    }

    let (face_name, face_bytes) =
        face.ok_or_else(|| ApiError::validation("missing `face` file field"))?;
    let (video_name, video_bytes) =
        video.ok_or_else(|| ApiError::validation("missing `video` file field"))?;

    let face_path = files::save_upload(
        &state.config.upload_dir,
        &face_name,
        MediaKind::Image,
        &face_bytes,
    )
    .await?;
    let video_path = files::save_upload(
        &state.config.upload_dir,
        &video_name,
        MediaKind::Video,
        &video_bytes,
    )
    .await?;

    info!(
        username = %user.username,
        face = %face_path.display(),
        video = %video_path.display(),
        face_enhance,
        "Starting face swap"
    );
    metrics::record_swap_started();
    let started = Instant::now();

    let result = state
        .pipeline
        .run(&face_path, &video_path, face_enhance, &LogObserver)
        .await;
    let duration = started.elapsed().as_secs_f64();

    match result {
        Ok(result_url) => {
            metrics::record_swap_completed(duration);
            info!(username = %user.username, url = %result_url, "Face swap finished");
            Ok(Json(SwapResponse { result_url }))
        }
        Err(e) => {
            metrics::record_swap_failed(duration);
            Err(e.into())
        }
    }
}

/// GET /api/credit
///
/// Raw provider quota payload, useful for checking remaining balance.
pub async fn get_credit_info(
    State(state): State<AppState>,
    _user: AuthUser,
) -> ApiResult<Json<Value>> {
    let data = state.client.credit_info().await?;
    Ok(Json(data))
}
