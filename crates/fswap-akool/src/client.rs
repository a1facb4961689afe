//! Authenticated provider HTTP client with transient-failure retry.

use std::time::Duration;

use reqwest::{Client, Method};
use serde_json::Value;
use tracing::warn;

use crate::error::{AkoolError, AkoolResult};
use crate::types::{ApiEnvelope, SuccessRule};

/// Production API host.
pub const DEFAULT_BASE_URL: &str = "https://openapi.akool.com";

/// Header carrying the API key on every request.
const API_KEY_HEADER: &str = "x-api-key";

/// Provider endpoint paths.
pub(crate) mod endpoints {
    pub const VIDEO_FACESWAP: &str = "/api/open/v3/faceswap/highquality/specifyvideo";
    pub const SWAP_RESULT: &str = "/api/open/v3/faceswap/result/listbyids";
    pub const FACE_DETECT: &str = "/interface/detect-api/detect_faces";
    pub const CREDIT_INFO: &str = "/api/open/v3/faceswap/quota/info";
}

/// Configuration for [`AkoolClient`].
#[derive(Debug, Clone)]
pub struct AkoolConfig {
    /// Base URL of the provider API.
    pub base_url: String,
    /// API key sent with every request.
    pub api_key: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Transient-failure retries after the initial attempt.
    pub max_retries: u32,
    /// Base delay for exponential backoff; doubles on each retry.
    pub backoff_base: Duration,
}

impl Default for AkoolConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            timeout: Duration::from_secs(30),
            max_retries: 3,
            backoff_base: Duration::from_secs(1),
        }
    }
}

impl AkoolConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Load configuration from environment variables:
    /// - `AKOOL_API_KEY`: API key (no default)
    /// - `AKOOL_BASE_URL`: API host (default: production)
    /// - `AKOOL_TIMEOUT_SECS`: request timeout (default: 30)
    /// - `AKOOL_MAX_RETRIES`: retries after the first attempt (default: 3)
    /// - `AKOOL_BACKOFF_MS`: backoff base in milliseconds (default: 1000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("AKOOL_BASE_URL").unwrap_or(defaults.base_url),
            api_key: std::env::var("AKOOL_API_KEY").unwrap_or_default(),
            timeout: std::env::var("AKOOL_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            max_retries: std::env::var("AKOOL_MAX_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_retries),
            backoff_base: std::env::var("AKOOL_BACKOFF_MS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.backoff_base),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_backoff_base(mut self, backoff_base: Duration) -> Self {
        self.backoff_base = backoff_base;
        self
    }

    /// Backoff delay before retry number `attempt + 1`.
    fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        self.backoff_base.saturating_mul(factor)
    }
}

/// Client for the face-swap provider API.
///
/// Authentication is a static `x-api-key` header. Cloning is cheap; the
/// underlying connection pool is shared.
#[derive(Debug, Clone)]
pub struct AkoolClient {
    http: Client,
    config: AkoolConfig,
}

impl AkoolClient {
    /// Create a new client. Fails fast when the API key is empty so a
    /// misconfigured deployment surfaces at startup, not on first call.
    pub fn new(config: AkoolConfig) -> AkoolResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(AkoolError::MissingApiKey);
        }
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(AkoolError::Transport)?;
        Ok(Self { http, config })
    }

    pub fn from_env() -> AkoolResult<Self> {
        Self::new(AkoolConfig::from_env())
    }

    pub fn config(&self) -> &AkoolConfig {
        &self.config
    }

    /// Lightweight connectivity and credential probe against the quota
    /// endpoint. Returns the raw quota payload.
    pub async fn credit_info(&self) -> AkoolResult<Value> {
        self.request_json(
            Method::GET,
            endpoints::CREDIT_INFO,
            None,
            None,
            SuccessRule::Standard,
        )
        .await
    }

    /// Send a request and decode the response under `rule`.
    ///
    /// Transient transport failures (timeout, connection refused) are
    /// retried with exponential backoff up to `max_retries` times.
    /// Application-level rejections surface immediately: the provider
    /// already gave its answer.
    ///
    /// Returns the `data` payload for the standard convention and the whole
    /// body for the detect convention, which nests nothing.
    pub(crate) async fn request_json(
        &self,
        method: Method,
        path: &str,
        query: Option<&[(&str, &str)]>,
        body: Option<&Value>,
        rule: SuccessRule,
    ) -> AkoolResult<Value> {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), path);

        let mut attempt = 0u32;
        loop {
            match self.send_once(&method, &url, query, body, rule).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < self.config.max_retries => {
                    let delay = self.config.delay_for_attempt(attempt);
                    attempt += 1;
                    warn!(
                        attempt,
                        max_retries = self.config.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Transient provider error, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn send_once(
        &self,
        method: &Method,
        url: &str,
        query: Option<&[(&str, &str)]>,
        body: Option<&Value>,
        rule: SuccessRule,
    ) -> AkoolResult<Value> {
        let mut request = self
            .http
            .request(method.clone(), url)
            .header(API_KEY_HEADER, &self.config.api_key);
        if let Some(query) = query {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(AkoolError::HttpStatus {
                status: status.as_u16(),
                message,
            });
        }

        let body_value: Value = response
            .json()
            .await
            .map_err(|e| AkoolError::malformed(format!("invalid JSON body: {e}")))?;
        let envelope: ApiEnvelope = serde_json::from_value(body_value.clone())
            .map_err(|e| AkoolError::malformed(format!("bad envelope: {e}")))?;

        rule.check(&envelope)
            .map_err(|(code, message)| AkoolError::Rejected { code, message })?;

        Ok(match rule {
            SuccessRule::Standard => envelope.data,
            SuccessRule::Detect => body_value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AkoolConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.backoff_base, Duration::from_secs(1));
    }

    #[test]
    fn test_backoff_doubles_per_attempt() {
        let config = AkoolConfig::default().with_backoff_base(Duration::from_millis(100));
        assert_eq!(config.delay_for_attempt(0), Duration::from_millis(100));
        assert_eq!(config.delay_for_attempt(1), Duration::from_millis(200));
        assert_eq!(config.delay_for_attempt(2), Duration::from_millis(400));
        assert_eq!(config.delay_for_attempt(3), Duration::from_millis(800));
    }

    #[test]
    fn test_empty_api_key_rejected() {
        assert!(matches!(
            AkoolClient::new(AkoolConfig::default()),
            Err(AkoolError::MissingApiKey)
        ));
        assert!(matches!(
            AkoolClient::new(AkoolConfig::new("   ")),
            Err(AkoolError::MissingApiKey)
        ));
    }

    #[test]
    fn test_non_empty_api_key_accepted() {
        assert!(AkoolClient::new(AkoolConfig::new("test-key")).is_ok());
    }
}
