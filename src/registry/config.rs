//! Registry configuration

use std::fmt;
use std::str::FromStr;

/// How the registry picks the ID of a newly created user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdPolicy {
    /// Strictly increasing counter starting at 1; IDs are never handed out twice
    #[default]
    Monotonic,
    /// Number of stored users plus one
    ///
    /// IDs come back after deletions, and a create may land on an ID that is
    /// still occupied, replacing that user.
    CurrentSize,
}

impl fmt::Display for IdPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdPolicy::Monotonic => write!(f, "monotonic"),
            IdPolicy::CurrentSize => write!(f, "current-size"),
        }
    }
}

impl FromStr for IdPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "monotonic" => Ok(IdPolicy::Monotonic),
            "current-size" | "current_size" | "size" => Ok(IdPolicy::CurrentSize),
            other => Err(format!("unknown id policy: {}", other)),
        }
    }
}

/// Configuration for the user registry
#[derive(Debug, Clone, Default)]
pub struct RegistryConfig {
    /// ID assignment policy
    pub id_policy: IdPolicy,
}

impl RegistryConfig {
    /// Set the ID assignment policy
    pub fn id_policy(mut self, policy: IdPolicy) -> Self {
        self.id_policy = policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RegistryConfig::default();
        assert_eq!(config.id_policy, IdPolicy::Monotonic);
    }

    #[test]
    fn test_builder_id_policy() {
        let config = RegistryConfig::default().id_policy(IdPolicy::CurrentSize);
        assert_eq!(config.id_policy, IdPolicy::CurrentSize);
    }

    #[test]
    fn test_parse_policy() {
        assert_eq!("monotonic".parse::<IdPolicy>(), Ok(IdPolicy::Monotonic));
        assert_eq!("Current-Size".parse::<IdPolicy>(), Ok(IdPolicy::CurrentSize));
        assert_eq!("current_size".parse::<IdPolicy>(), Ok(IdPolicy::CurrentSize));
        assert!("random".parse::<IdPolicy>().is_err());
    }

    #[test]
    fn test_policy_display_roundtrips() {
        for policy in [IdPolicy::Monotonic, IdPolicy::CurrentSize] {
            assert_eq!(policy.to_string().parse::<IdPolicy>(), Ok(policy));
        }
    }
}
