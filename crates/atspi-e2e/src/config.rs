//! Launch configuration for applications under test.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Default time to wait for the application to register on the desktop
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Default interval between desktop searches
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 600;

/// Environment variable overriding [`LaunchOptions::timeout_ms`]
pub const TIMEOUT_ENV: &str = "E2E_TIMEOUT_MS";

/// Environment variable overriding [`LaunchOptions::poll_interval_ms`]
pub const POLL_INTERVAL_ENV: &str = "E2E_POLL_INTERVAL_MS";

/// How to start the subject application and wait for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaunchOptions {
    /// Name passed with `--name`; generated when absent
    pub name: Option<String>,
    /// Extra arguments placed before `--name`
    pub args: Vec<String>,
    /// Discovery timeout in milliseconds
    pub timeout_ms: u64,
    /// Discovery poll interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self {
            name: None,
            args: Vec::new(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl LaunchOptions {
    /// Create default options
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Default options with environment overrides applied
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides looked up through `lookup`; unparsable values are ignored
    #[must_use]
    pub fn apply_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(ms) = parse_ms(TIMEOUT_ENV, lookup(TIMEOUT_ENV)) {
            self.timeout_ms = ms;
        }
        if let Some(ms) = parse_ms(POLL_INTERVAL_ENV, lookup(POLL_INTERVAL_ENV)) {
            self.poll_interval_ms = ms;
        }
        self
    }

    /// Set the application name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Append an argument
    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Set the discovery timeout
    #[must_use]
    pub const fn with_timeout_ms(mut self, ms: u64) -> Self {
        self.timeout_ms = ms;
        self
    }

    /// Set the discovery poll interval
    #[must_use]
    pub const fn with_poll_interval_ms(mut self, ms: u64) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    /// Discovery timeout
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Discovery poll interval
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

fn parse_ms(key: &str, value: Option<String>) -> Option<u64> {
    let value = value?;
    match value.trim().parse() {
        Ok(ms) => Some(ms),
        Err(_) => {
            warn!(key, value = %value, "ignoring invalid millisecond value");
            None
        }
    }
}
