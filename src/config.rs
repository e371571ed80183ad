//! Configuration for taskdesk.
//!
//! Configuration can be set via environment variables:
//! - `TASKDESK_STORE` - Optional. Storage backend: `sqlite` (default) or `memory`.
//! - `TASKDESK_DATA_DIR` - Optional. Directory for the SQLite database. Defaults to `./data`.

use std::path::PathBuf;
use thiserror::Error;

use crate::store::StoreKind;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Storage backend to use
    pub store: StoreKind,

    /// Directory for persistent data
    pub data_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store: StoreKind::default(),
            data_dir: PathBuf::from("data"),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidValue` if `TASKDESK_STORE` is set to an
    /// unknown backend.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(value) = std::env::var("TASKDESK_STORE") {
            config.store = value
                .parse()
                .map_err(|e: String| ConfigError::InvalidValue("TASKDESK_STORE".to_string(), e))?;
        }
        if let Ok(value) = std::env::var("TASKDESK_DATA_DIR") {
            config.data_dir = PathBuf::from(value);
        }

        Ok(config)
    }
}
