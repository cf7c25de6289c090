//! Admin access gate.
//!
//! A single shared password unlocks the panel. Each Discord user that logs in gets a
//! session that lasts until `/logout` or a restart.

use crate::errors::{Error, Result};
use std::collections::HashSet;
use tokio::sync::RwLock;

/// Commands that work without a session.
pub const PUBLIC_COMMANDS: [&str; 3] = ["login", "help", "ping"];

/// Password check plus the set of logged-in users.
#[derive(Debug)]
pub struct AccessGate {
    password: String,
    sessions: RwLock<HashSet<u64>>,
}

impl AccessGate {
    /// Creates a gate guarded by `password`.
    #[must_use]
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            password: password.into(),
            sessions: RwLock::new(HashSet::new()),
        }
    }

    /// Opens a session for `user_id` when `attempt` matches the password.
    pub async fn login(&self, user_id: u64, attempt: &str) -> Result<()> {
        if attempt != self.password {
            tracing::warn!(user_id, "Rejected login attempt");
            return Err(Error::Unauthorized);
        }
        self.sessions.write().await.insert(user_id);
        tracing::info!(user_id, "Admin session opened");
        Ok(())
    }

    /// Closes the session of `user_id`. Returns whether one was open.
    pub async fn logout(&self, user_id: u64) -> bool {
        let removed = self.sessions.write().await.remove(&user_id);
        if removed {
            tracing::info!(user_id, "Admin session closed");
        }
        removed
    }

    /// Whether `user_id` holds an open session.
    pub async fn is_logged_in(&self, user_id: u64) -> bool {
        self.sessions.read().await.contains(&user_id)
    }

    /// Whether `user_id` may run `command`.
    pub async fn is_authorized(&self, user_id: u64, command: &str) -> bool {
        PUBLIC_COMMANDS.contains(&command) || self.is_logged_in(user_id).await
    }
}
