//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables use the `ASSESSMENT_ENGINE`
//! prefix and `__` to separate nested values. Every section has defaults, so
//! an empty environment yields a working offline configuration.
//!
//! # Example
//!
//! ```no_run
//! use assessment_engine::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Save timeout: {:?}", config.persistence.save_confirm_timeout());
//! ```

mod ai;
mod error;
mod history;
mod logging;
mod persistence;

pub use ai::AiConfig;
pub use error::{ConfigError, ValidationError};
pub use history::{HistoryConfig, RetryConfig};
pub use logging::LoggingConfig;
pub use persistence::PersistenceConfig;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Progress save behavior
    #[serde(default)]
    pub persistence: PersistenceConfig,

    /// AI summary provider
    #[serde(default)]
    pub ai: AiConfig,

    /// Report history grouping
    #[serde(default)]
    pub history: HistoryConfig,

    /// Pending summary retry
    #[serde(default)]
    pub retry: RetryConfig,

    /// Tracing output
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `ASSESSMENT_ENGINE` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `ASSESSMENT_ENGINE__PERSISTENCE__SAVE_CONFIRM_TIMEOUT_MS=2000`
    /// - `ASSESSMENT_ENGINE__AI__OPENAI_API_KEY=sk-...`
    /// - `ASSESSMENT_ENGINE__HISTORY__WEEK_START=sunday`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("ASSESSMENT_ENGINE")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for the first invalid section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.persistence.validate()?;
        self.ai.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}
