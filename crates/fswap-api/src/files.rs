//! Upload persistence and temp-file housekeeping.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use fswap_models::MediaKind;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov"];

/// Whether the extension is accepted for the given media slot.
pub fn allowed_extension(kind: MediaKind, ext: &str) -> bool {
    let allowed = match kind {
        MediaKind::Image => IMAGE_EXTENSIONS,
        MediaKind::Video => VIDEO_EXTENSIONS,
    };
    allowed.contains(&ext)
}

fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
}

/// Persist an uploaded payload under a fresh UUID name, preserving the
/// original extension.
///
/// The random name prevents collisions and path traversal; nothing of the
/// client-supplied name survives except its extension, and only after
/// validation.
pub async fn save_upload(
    dir: &Path,
    original_name: &str,
    kind: MediaKind,
    bytes: &[u8],
) -> ApiResult<PathBuf> {
    let ext = extension_of(original_name).ok_or_else(|| {
        ApiError::validation(format!("`{original_name}` has no file extension"))
    })?;
    if !allowed_extension(kind, &ext) {
        let allowed = match kind {
            MediaKind::Image => IMAGE_EXTENSIONS,
            MediaKind::Video => VIDEO_EXTENSIONS,
        };
        return Err(ApiError::validation(format!(
            "unsupported {kind} type `{ext}`: expected one of {}",
            allowed.join(", ")
        )));
    }

    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(format!("{}.{}", Uuid::new_v4(), ext));
    tokio::fs::write(&path, bytes).await?;

    debug!(path = %path.display(), size = bytes.len(), "Saved upload");
    Ok(path)
}

/// Delete regular files older than `max_age` from `dir`.
///
/// Per-file failures are logged and skipped so one stubborn file cannot
/// block the sweep. Returns the number of files removed.
pub async fn cleanup_old_files(dir: &Path, max_age: Duration) -> usize {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return 0,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "Failed to read directory for cleanup");
            return 0;
        }
    };

    let now = SystemTime::now();
    let mut removed = 0;
    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "Failed to read directory entry");
                break;
            }
        };

        let path = entry.path();
        let Ok(metadata) = entry.metadata().await else {
            continue;
        };
        if !metadata.is_file() {
            continue;
        }
        let Ok(modified) = metadata.modified() else {
            continue;
        };

        let age = now.duration_since(modified).unwrap_or_default();
        if age > max_age {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {
                    debug!(path = %path.display(), age_secs = age.as_secs(), "Removed stale file");
                    removed += 1;
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to remove stale file");
                }
            }
        }
    }

    removed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_upload_uses_uuid_name_and_keeps_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = save_upload(dir.path(), "My Face.JPG", MediaKind::Image, b"bytes")
            .await
            .unwrap();

        assert_eq!(path.extension().unwrap(), "jpg");
        let stem = path.file_stem().unwrap().to_str().unwrap();
        assert!(Uuid::parse_str(stem).is_ok(), "stem `{stem}` is not a UUID");
        assert_eq!(std::fs::read(&path).unwrap(), b"bytes");
    }

    #[tokio::test]
    async fn test_save_upload_rejects_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let err = save_upload(dir.path(), "face.gif", MediaKind::Image, b"x")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        let err = save_upload(dir.path(), "clip.avi", MediaKind::Video, b"x")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn test_save_upload_rejects_missing_extension() {
        let dir = tempfile::tempdir().unwrap();
        let err = save_upload(dir.path(), "face", MediaKind::Image, b"x")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn test_cleanup_removes_only_old_files() {
        let dir = tempfile::tempdir().unwrap();
        let stale = dir.path().join("stale.mp4");
        std::fs::write(&stale, b"old").unwrap();

        // Let the file age past a zero max-age.
        tokio::time::sleep(Duration::from_millis(20)).await;
        let fresh = dir.path().join("fresh.mp4");
        std::fs::write(&fresh, b"new").unwrap();

        let removed = cleanup_old_files(dir.path(), Duration::from_millis(10)).await;
        assert_eq!(removed, 1);
        assert!(!stale.exists());
        assert!(fresh.exists());
    }

    #[tokio::test]
    async fn test_cleanup_keeps_recent_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recent.jpg");
        std::fs::write(&path, b"x").unwrap();

        let removed = cleanup_old_files(dir.path(), Duration::from_secs(3600)).await;
        assert_eq!(removed, 0);
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_cleanup_missing_dir_is_noop() {
        let removed = cleanup_old_files(Path::new("/no/such/dir"), Duration::ZERO).await;
        assert_eq!(removed, 0);
    }
}
