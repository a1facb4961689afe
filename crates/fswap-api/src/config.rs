//! API configuration.

use std::path::PathBuf;
use std::time::Duration;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Environment (development/production)
    pub environment: String,
    /// Directory for uploaded inputs
    pub upload_dir: PathBuf,
    /// Max request body size (uploads carry whole videos)
    pub max_upload_bytes: usize,
    /// Age at which uploaded files are swept
    pub upload_max_age: Duration,
    /// Interval between sweeps
    pub cleanup_interval: Duration,
    /// Credentials file, one user per line
    pub users_file: PathBuf,
    /// Session lifetime
    pub session_ttl: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec!["*".to_string()],
            environment: "development".to_string(),
            upload_dir: PathBuf::from("temp/uploads"),
            max_upload_bytes: 500 * 1024 * 1024, // 500MB
            upload_max_age: Duration::from_secs(24 * 3600),
            cleanup_interval: Duration::from_secs(3600),
            users_file: PathBuf::from("users.txt"),
            session_ttl: Duration::from_secs(24 * 3600),
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("API_HOST").unwrap_or(defaults.host),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(defaults.cors_origins),
            environment: std::env::var("ENVIRONMENT").unwrap_or(defaults.environment),
            upload_dir: std::env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            max_upload_bytes: std::env::var("MAX_UPLOAD_MB")
                .ok()
                .and_then(|s| s.parse::<usize>().ok())
                .map(|mb| mb * 1024 * 1024)
                .unwrap_or(defaults.max_upload_bytes),
            upload_max_age: std::env::var("UPLOAD_MAX_AGE_HOURS")
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .map(|h| Duration::from_secs(h * 3600))
                .unwrap_or(defaults.upload_max_age),
            cleanup_interval: std::env::var("CLEANUP_INTERVAL_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.cleanup_interval),
            users_file: std::env::var("USERS_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.users_file),
            session_ttl: std::env::var("SESSION_TTL_HOURS")
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .map(|h| Duration::from_secs(h * 3600))
                .unwrap_or(defaults.session_ttl),
        }
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }

    /// Create the directories the server writes to.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.upload_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.port, 8000);
        assert_eq!(config.max_upload_bytes, 500 * 1024 * 1024);
        assert_eq!(config.upload_max_age, Duration::from_secs(86400));
        assert!(!config.is_production());
    }
}
