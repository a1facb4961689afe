//! Application state.

use std::sync::Arc;

use fswap_akool::{AkoolClient, FaceSwapPipeline, PollConfig};
use fswap_hosting::{HostingConfig, TempHostUploader};
use tracing::warn;

use crate::auth::{SessionStore, UserStore};
use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub users: Arc<UserStore>,
    pub sessions: Arc<SessionStore>,
    pub client: AkoolClient,
    pub pipeline: Arc<FaceSwapPipeline>,
}

impl AppState {
    /// Create new application state from the environment.
    pub fn new(config: ApiConfig) -> anyhow::Result<Self> {
        config.ensure_dirs()?;

        let users = UserStore::load(&config.users_file)?;
        if users.is_empty() {
            warn!("No users loaded; every login will be rejected");
        }

        let client = AkoolClient::from_env()?;
        let uploader = TempHostUploader::new(HostingConfig::from_env())?;
        let pipeline = FaceSwapPipeline::new(client.clone(), uploader)
            .with_poll_config(PollConfig::from_env());

        Ok(Self::from_parts(config, users, client, pipeline))
    }

    /// Assemble state from already-built components.
    pub fn from_parts(
        config: ApiConfig,
        users: UserStore,
        client: AkoolClient,
        pipeline: FaceSwapPipeline,
    ) -> Self {
        let session_ttl = config.session_ttl;
        Self {
            config,
            users: Arc::new(users),
            sessions: Arc::new(SessionStore::new(session_ttl)),
            client,
            pipeline: Arc::new(pipeline),
        }
    }
}
