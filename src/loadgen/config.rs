//! Load generator configuration

use std::str::FromStr;
use std::time::Duration;

/// Requests fired per target unless told otherwise
pub const DEFAULT_REQUESTS: usize = 1000;

/// Load run options
#[derive(Debug, Clone)]
pub struct LoadConfig {
    /// Number of concurrent requests per target
    pub requests: usize,

    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            requests: DEFAULT_REQUESTS,
            timeout: Duration::from_secs(10),
        }
    }
}

impl LoadConfig {
    /// Set the number of requests
    pub fn requests(mut self, requests: usize) -> Self {
        self.requests = requests;
        self
    }

    /// Set the per-request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// A named URL to send load to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    /// Label used in the report
    pub name: String,
    pub url: String,
}

impl Target {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

impl FromStr for Target {
    type Err = String;

    /// Parses `name=url`, or a bare `url` which then doubles as the name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (name, url) = match s.split_once('=') {
            Some((name, url)) if !name.contains("://") => (name.trim(), url.trim()),
            _ => (s.trim(), s.trim()),
        };

        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(format!("target URL must start with http:// or https://: {}", url));
        }
        if name.is_empty() {
            return Err(format!("target name is empty: {}", s));
        }

        Ok(Target::new(name, url))
    }
}
