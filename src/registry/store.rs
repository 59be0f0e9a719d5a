//! User registry implementation
//!
//! The single source of truth for user records.

use std::collections::HashMap;

use tokio::sync::RwLock;

use super::config::{IdPolicy, RegistryConfig};
use super::entry::{User, UserId};
use super::error::RegistryError;

/// Message returned when a create carries an empty name
pub const EMPTY_NAME_MESSAGE: &str = "User name can't be empty!";

/// State guarded by the registry lock
struct Users {
    /// Map of user ID to record
    by_id: HashMap<UserId, User>,
    /// Next ID under `IdPolicy::Monotonic`
    next_id: UserId,
}

/// Central registry for all users
///
/// Thread-safe via `RwLock`. Lookups take the shared lock, creates and
/// deletes take the exclusive lock for their whole read-modify-write.
pub struct UserRegistry {
    users: RwLock<Users>,

    /// Configuration
    config: RegistryConfig,
}

impl UserRegistry {
    /// Create a new registry with default configuration
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create a new registry with custom configuration
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            users: RwLock::new(Users {
                by_id: HashMap::new(),
                next_id: 1,
            }),
            config,
        }
    }

    /// Get the registry configuration
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Store a new user and return its assigned ID
    ///
    /// Fails with `RegistryError::Validation` if `name` is empty, leaving the
    /// registry untouched.
    pub async fn create(&self, name: impl Into<String>) -> Result<UserId, RegistryError> {
        let name = name.into();
        if name.is_empty() {
            return Err(RegistryError::Validation(EMPTY_NAME_MESSAGE.to_string()));
        }

        let mut users = self.users.write().await;

        let id = match self.config.id_policy {
            IdPolicy::Monotonic => {
                let id = users.next_id;
                users.next_id += 1;
                id
            }
            IdPolicy::CurrentSize => users.by_id.len() as UserId + 1,
        };

        if let Some(previous) = users.by_id.insert(id, User::new(name)) {
            tracing::warn!(
                user_id = id,
                replaced = %previous.name,
                "User ID reused, previous record replaced"
            );
        }

        tracing::debug!(user_id = id, total = users.by_id.len(), "User created");

        Ok(id)
    }

    /// Look up a user by ID
    pub async fn get(&self, id: UserId) -> Result<User, RegistryError> {
        let users = self.users.read().await;

        users
            .by_id
            .get(&id)
            .cloned()
            .ok_or(RegistryError::NotFound(id))
    }

    /// Remove a user by ID
    ///
    /// A second delete of the same ID fails with `RegistryError::NotFound`.
    pub async fn delete(&self, id: UserId) -> Result<(), RegistryError> {
        let mut users = self.users.write().await;

        if users.by_id.remove(&id).is_none() {
            return Err(RegistryError::NotFound(id));
        }

        tracing::debug!(user_id = id, total = users.by_id.len(), "User deleted");

        Ok(())
    }

    /// Check whether a user is stored under `id`
    pub async fn contains(&self, id: UserId) -> bool {
        self.users.read().await.by_id.contains_key(&id)
    }

    /// Get the number of stored users
    pub async fn len(&self) -> usize {
        self.users.read().await.by_id.len()
    }

    /// Check whether the registry holds no users
    pub async fn is_empty(&self) -> bool {
        self.users.read().await.by_id.is_empty()
    }
}

impl Default for UserRegistry {
    fn default() -> Self {
        Self::new()
    }
}
