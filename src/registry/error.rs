//! Registry error types

use super::entry::UserId;

/// Error type for registry operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A required field was missing or empty
    Validation(String),
    /// No user is stored under the ID
    NotFound(UserId),
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::Validation(msg) => write!(f, "{}", msg),
            RegistryError::NotFound(_) => write!(f, "User ID not found"),
        }
    }
}

impl std::error::Error for RegistryError {}
