//! UserDirectory - user existence lookups
//!
//! Collaborator boundary for the excluded account system. The gateway only
//! needs to know whether a target user exists before joining them to a
//! subscription group; camera ownership is answered by the camera store.

use std::collections::HashSet;

use tokio::sync::RwLock;

/// UserDirectory instance
pub struct UserDirectory {
    users: RwLock<HashSet<String>>,
}

impl UserDirectory {
    /// Create new UserDirectory
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashSet::new()),
        }
    }

    /// Register a known user id
    pub async fn register(&self, user_id: &str) {
        let mut users = self.users.write().await;
        if users.insert(user_id.to_string()) {
            tracing::debug!(user_id = %user_id, "User registered");
        }
    }

    /// Check whether a user exists
    pub async fn exists(&self, user_id: &str) -> bool {
        self.users.read().await.contains(user_id)
    }

    /// Registered user count
    pub async fn count(&self) -> usize {
        self.users.read().await.len()
    }
}

impl Default for UserDirectory {
    fn default() -> Self {
        Self::new()
    }
}
