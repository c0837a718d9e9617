//! Runtime settings, loaded from an optional JSON file.

use crate::error::{Error, Result};
use crate::protocol::READ_TIMEOUT_MS;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;

/// Longest read timeout accepted from a settings file.
pub const MAX_READ_TIMEOUT_MS: u32 = 10_000;

/// Query and polling settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Seconds between periodic queries.
    pub poll_interval_secs: u64,
    /// Bound on the battery response read.
    pub read_timeout_ms: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            read_timeout_ms: READ_TIMEOUT_MS as u32,
        }
    }
}

impl Settings {
    /// Read settings from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        let settings: Settings = serde_json::from_str(&raw)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        settings.validate()
    }

    /// Settings from `path`, or defaults when no path is given.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    /// Check ranges; returns the settings unchanged when valid.
    pub fn validate(self) -> Result<Self> {
        if self.poll_interval_secs == 0 {
            return Err(Error::Config(
                "poll_interval_secs must be at least 1".into(),
            ));
        }
        if !(1..=MAX_READ_TIMEOUT_MS).contains(&self.read_timeout_ms) {
            return Err(Error::Config(format!(
                "read_timeout_ms = {} (allowed 1..={MAX_READ_TIMEOUT_MS})",
                self.read_timeout_ms
            )));
        }
        Ok(self)
    }
}
