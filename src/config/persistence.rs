//! Progress persistence configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// How in-progress sessions are saved
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PersistenceConfig {
    /// How long a save waits for the store to confirm before proceeding
    #[serde(default = "default_save_confirm_timeout_ms")]
    pub save_confirm_timeout_ms: u64,

    /// Save automatically on answer and navigation once a record exists
    #[serde(default = "default_autosave")]
    pub autosave: bool,
}

impl PersistenceConfig {
    pub fn save_confirm_timeout(&self) -> Duration {
        Duration::from_millis(self.save_confirm_timeout_ms)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(100..=60_000).contains(&self.save_confirm_timeout_ms) {
            return Err(ValidationError::InvalidSaveTimeout);
        }
        Ok(())
    }
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            save_confirm_timeout_ms: default_save_confirm_timeout_ms(),
            autosave: default_autosave(),
        }
    }
}

fn default_save_confirm_timeout_ms() -> u64 {
    5_000
}

fn default_autosave() -> bool {
    true
}
