//! Periodic sweeper for uploaded temp files.

use std::path::PathBuf;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tracing::info;

use crate::config::ApiConfig;
use crate::files;
use crate::metrics;

/// Background task that deletes stale uploads on a fixed interval.
///
/// The first tick fires immediately, so leftovers from a previous run are
/// cleared at startup.
pub struct UploadSweeper {
    dir: PathBuf,
    max_age: Duration,
    interval: Duration,
}

impl UploadSweeper {
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            dir: config.upload_dir.clone(),
            max_age: config.upload_max_age,
            interval: config.cleanup_interval,
        }
    }

    /// Run forever, sweeping on every interval tick.
    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            dir = %self.dir.display(),
            max_age_secs = self.max_age.as_secs(),
            interval_secs = self.interval.as_secs(),
            "Upload sweeper started"
        );

        loop {
            ticker.tick().await;
            let removed = files::cleanup_old_files(&self.dir, self.max_age).await;
            if removed > 0 {
                metrics::record_uploads_swept(removed as u64);
                info!(dir = %self.dir.display(), removed, "Swept stale uploads");
            }
        }
    }
}
