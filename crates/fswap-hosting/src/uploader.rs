//! Upload client for throwaway file hosts.

use std::path::Path;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{HostingError, HostingResult};

/// Default per-upload timeout. Uploads can carry whole videos, so this is
/// much longer than an API call budget.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

const TMPFILES_UPLOAD_URL: &str = "https://tmpfiles.org/api/v1/upload";
const FILEIO_UPLOAD_URL: &str = "https://file.io";

/// Hosting backends, tried in the order they are configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostingBackend {
    TmpFiles,
    FileIo,
}

impl HostingBackend {
    pub fn name(&self) -> &'static str {
        match self {
            HostingBackend::TmpFiles => "tmpfiles.org",
            HostingBackend::FileIo => "file.io",
        }
    }
}

/// Configuration for [`TempHostUploader`].
#[derive(Debug, Clone)]
pub struct HostingConfig {
    /// tmpfiles.org upload endpoint.
    pub tmpfiles_url: String,
    /// file.io upload endpoint.
    pub fileio_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Fallback chain, first entry tried first.
    pub backends: Vec<HostingBackend>,
}

impl Default for HostingConfig {
    fn default() -> Self {
        Self {
            tmpfiles_url: TMPFILES_UPLOAD_URL.to_string(),
            fileio_url: FILEIO_UPLOAD_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            backends: vec![HostingBackend::TmpFiles, HostingBackend::FileIo],
        }
    }
}

impl HostingConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            tmpfiles_url: std::env::var("TMPFILES_UPLOAD_URL").unwrap_or(defaults.tmpfiles_url),
            fileio_url: std::env::var("FILEIO_UPLOAD_URL").unwrap_or(defaults.fileio_url),
            timeout: std::env::var("HOSTING_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            backends: defaults.backends,
        }
    }
}

/// Uploads local files to transient public hosting.
///
/// Each backend either returns a directly downloadable URL or fails; the
/// chain stops at the first success. Only when every backend has failed does
/// the upload fail, wrapping the last error seen.
#[derive(Debug, Clone)]
pub struct TempHostUploader {
    http: Client,
    config: HostingConfig,
}

impl TempHostUploader {
    pub fn new(config: HostingConfig) -> HostingResult<Self> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    pub fn with_defaults() -> HostingResult<Self> {
        Self::new(HostingConfig::default())
    }

    pub fn config(&self) -> &HostingConfig {
        &self.config
    }

    /// Upload a local file and return its public URL.
    ///
    /// The file is read once; a missing or unreadable file fails immediately
    /// without touching any backend.
    pub async fn upload(&self, path: impl AsRef<Path>) -> HostingResult<String> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.bin".to_string());

        debug!(
            path = %path.display(),
            size = bytes.len(),
            "Uploading file to transient hosting"
        );

        let mut last: Option<(&'static str, HostingError)> = None;
        for backend in &self.config.backends {
            match self.upload_via(*backend, &bytes, &file_name).await {
                Ok(url) => {
                    info!(backend = backend.name(), url = %url, "Upload succeeded");
                    return Ok(url);
                }
                Err(e) => {
                    warn!(
                        backend = backend.name(),
                        error = %e,
                        "Hosting backend failed, trying next"
                    );
                    last = Some((backend.name(), e));
                }
            }
        }

        match last {
            Some((backend, source)) => Err(HostingError::AllBackendsFailed {
                backend,
                source: Box::new(source),
            }),
            None => Err(HostingError::NoBackends),
        }
    }

    async fn upload_via(
        &self,
        backend: HostingBackend,
        bytes: &[u8],
        file_name: &str,
    ) -> HostingResult<String> {
        match backend {
            HostingBackend::TmpFiles => self.upload_tmpfiles(bytes, file_name).await,
            HostingBackend::FileIo => self.upload_fileio(bytes, file_name).await,
        }
    }

    async fn upload_tmpfiles(&self, bytes: &[u8], file_name: &str) -> HostingResult<String> {
        const BACKEND: &str = "tmpfiles.org";

        let form = Form::new().part("file", file_part(bytes, file_name));
        let response = self
            .http
            .post(&self.config.tmpfiles_url)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(HostingError::rejected(BACKEND, format!("HTTP {status}")));
        }

        let body: TmpFilesResponse = response
            .json()
            .await
            .map_err(|e| HostingError::malformed(BACKEND, e.to_string()))?;

        if body.status.as_deref() != Some("success") {
            return Err(HostingError::rejected(
                BACKEND,
                format!("status `{}`", body.status.as_deref().unwrap_or("missing")),
            ));
        }

        let view_url = body
            .data
            .and_then(|d| d.url)
            .filter(|u| !u.is_empty())
            .ok_or_else(|| HostingError::malformed(BACKEND, "missing data.url"))?;

        // The API hands back a viewer page; the provider needs the direct
        // download path.
        let direct_url = view_url.replace("tmpfiles.org/", "tmpfiles.org/dl/");
        validate_url(BACKEND, direct_url)
    }

    async fn upload_fileio(&self, bytes: &[u8], file_name: &str) -> HostingResult<String> {
        const BACKEND: &str = "file.io";

        let form = Form::new()
            .part("file", file_part(bytes, file_name))
            .text("expires", "1d");
        let response = self
            .http
            .post(&self.config.fileio_url)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(HostingError::rejected(BACKEND, format!("HTTP {status}")));
        }

        let body: FileIoResponse = response
            .json()
            .await
            .map_err(|e| HostingError::malformed(BACKEND, e.to_string()))?;

        if !body.success {
            return Err(HostingError::rejected(BACKEND, "success flag not set"));
        }

        let link = body
            .link
            .filter(|l| !l.is_empty())
            .ok_or_else(|| HostingError::malformed(BACKEND, "missing link"))?;
        validate_url(BACKEND, link)
    }
}

fn file_part(bytes: &[u8], file_name: &str) -> Part {
    Part::bytes(bytes.to_vec()).file_name(file_name.to_string())
}

fn validate_url(backend: &'static str, url: String) -> HostingResult<String> {
    Url::parse(&url).map_err(|e| HostingError::malformed(backend, format!("bad URL `{url}`: {e}")))?;
    Ok(url)
}

#[derive(Debug, Deserialize)]
struct TmpFilesResponse {
    status: Option<String>,
    data: Option<TmpFilesData>,
}

#[derive(Debug, Deserialize)]
struct TmpFilesData {
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FileIoResponse {
    #[serde(default)]
    success: bool,
    link: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn temp_input() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"fake media bytes").unwrap();
        file
    }

    fn uploader_for(server: &MockServer, backends: Vec<HostingBackend>) -> TempHostUploader {
        TempHostUploader::new(HostingConfig {
            tmpfiles_url: format!("{}/api/v1/upload", server.uri()),
            fileio_url: format!("{}/fileio", server.uri()),
            timeout: Duration::from_secs(5),
            backends,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_tmpfiles_success_rewrites_to_direct_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/upload"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "data": { "url": "https://tmpfiles.org/12345/face.jpg" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let uploader = uploader_for(&server, vec![HostingBackend::TmpFiles]);
        let input = temp_input();

        let url = uploader.upload(input.path()).await.unwrap();
        assert_eq!(url, "https://tmpfiles.org/dl/12345/face.jpg");
    }

    #[tokio::test]
    async fn test_falls_back_to_fileio_on_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/upload"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/fileio"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "link": "https://file.io/abc123"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let uploader = uploader_for(
            &server,
            vec![HostingBackend::TmpFiles, HostingBackend::FileIo],
        );
        let input = temp_input();

        let url = uploader.upload(input.path()).await.unwrap();
        assert_eq!(url, "https://file.io/abc123");
    }

    #[tokio::test]
    async fn test_rejected_status_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/upload"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "status": "error" })),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/fileio"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "link": "https://file.io/xyz"
            })))
            .mount(&server)
            .await;

        let uploader = uploader_for(
            &server,
            vec![HostingBackend::TmpFiles, HostingBackend::FileIo],
        );
        let input = temp_input();

        let url = uploader.upload(input.path()).await.unwrap();
        assert_eq!(url, "https://file.io/xyz");
    }

    #[tokio::test]
    async fn test_all_backends_failed_wraps_last_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/upload"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/fileio"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let uploader = uploader_for(
            &server,
            vec![HostingBackend::TmpFiles, HostingBackend::FileIo],
        );
        let input = temp_input();

        let err = uploader.upload(input.path()).await.unwrap_err();
        match err {
            HostingError::AllBackendsFailed { backend, source } => {
                assert_eq!(backend, "file.io");
                assert!(matches!(*source, HostingError::BackendRejected { .. }));
            }
            other => panic!("expected AllBackendsFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_link_is_malformed_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/fileio"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
            .mount(&server)
            .await;

        let uploader = uploader_for(&server, vec![HostingBackend::FileIo]);
        let input = temp_input();

        let err = uploader.upload(input.path()).await.unwrap_err();
        match err {
            HostingError::AllBackendsFailed { source, .. } => {
                assert!(matches!(*source, HostingError::MalformedResponse { .. }));
            }
            other => panic!("expected AllBackendsFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_local_file_fails_without_network() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let uploader = uploader_for(&server, vec![HostingBackend::TmpFiles]);
        let err = uploader.upload("/no/such/file.mp4").await.unwrap_err();
        assert!(matches!(err, HostingError::Io(_)));
    }

    #[tokio::test]
    async fn test_empty_chain_reports_no_backends() {
        let server = MockServer::start().await;
        let uploader = uploader_for(&server, vec![]);
        let input = temp_input();

        let err = uploader.upload(input.path()).await.unwrap_err();
        assert!(matches!(err, HostingError::NoBackends));
    }
}
