//! Username/password authentication with an in-memory session store.
//!
//! Credentials live in a plain text file, one user per line:
//!
//! ```text
//! # comment
//! alice:wonderland
//! bob:5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8:sha256
//! ```
//!
//! Plaintext passwords are hashed at load time; nothing is ever compared in
//! the clear. Sessions are opaque bearer tokens held in memory, so a restart
//! logs everyone out.

use std::collections::HashMap;
use std::path::Path;
use std::time::{Duration, Instant};

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use tracing::warn;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// SHA-256 hex digest of a password.
pub fn hash_password(password: &str) -> String {
    let digest = Sha256::digest(password.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// Users loaded from the credentials file, keyed by username with hashed
/// passwords as values.
#[derive(Debug, Default)]
pub struct UserStore {
    users: HashMap<String, String>,
}

impl UserStore {
    /// Load users from a credentials file.
    ///
    /// A missing file yields an empty store rather than an error so a fresh
    /// deployment can boot before anyone provisions accounts. Malformed
    /// lines are skipped with a warning.
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(path = %path.display(), "Users file not found, no logins will succeed");
                return Ok(Self::default());
            }
            Err(e) => return Err(e),
        };
        Ok(Self {
            users: parse_users(&content),
        })
    }

    pub fn from_users(users: HashMap<String, String>) -> Self {
        Self { users }
    }

    /// Verify a username/password pair. Empty credentials never match.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        if username.is_empty() || password.is_empty() {
            return false;
        }
        self.users
            .get(username)
            .map(|stored| *stored == hash_password(password))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

fn parse_users(content: &str) -> HashMap<String, String> {
    let mut users = HashMap::new();
    for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let parts: Vec<&str> = line.split(':').collect();
        match parts.as_slice() {
            [username, password] if !username.is_empty() && !password.is_empty() => {
                users.insert(username.to_string(), hash_password(password));
            }
            [username, hash, "sha256"] if !username.is_empty() && !hash.is_empty() => {
                users.insert(username.to_string(), hash.to_lowercase());
            }
            _ => {
                warn!(line = idx + 1, "Skipping malformed users file entry");
            }
        }
    }
    users
}

#[derive(Debug, Clone)]
struct Session {
    username: String,
    created_at: Instant,
}

/// Logged-in sessions keyed by opaque bearer tokens.
#[derive(Debug)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Open a session and return its token.
    pub async fn login(&self, username: impl Into<String>) -> String {
        let token = Uuid::new_v4().to_string();
        self.sessions.write().await.insert(
            token.clone(),
            Session {
                username: username.into(),
                created_at: Instant::now(),
            },
        );
        token
    }

    /// Close a session. Returns whether the token was known.
    pub async fn logout(&self, token: &str) -> bool {
        self.sessions.write().await.remove(token).is_some()
    }

    /// Resolve a token to its username, evicting it when expired.
    pub async fn username_for(&self, token: &str) -> Option<String> {
        let mut sessions = self.sessions.write().await;
        match sessions.get(token) {
            Some(session) if session.created_at.elapsed() <= self.ttl => {
                Some(session.username.clone())
            }
            Some(_) => {
                sessions.remove(token);
                None
            }
            None => None,
        }
    }
}

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("Authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// Authenticated user extracted from request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub username: String,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| ApiError::unauthorized("Missing or malformed Authorization header"))?;

        let username = state
            .sessions
            .username_for(token)
            .await
            .ok_or_else(|| ApiError::unauthorized("Invalid or expired session"))?;

        Ok(AuthUser { username })
    }
}
