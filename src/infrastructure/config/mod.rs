use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::error::{AppError, Result};

/// Service configuration, injected explicitly at construction time.
///
/// Precedence: defaults < `subtrack.toml` < `SUBTRACK_*` environment
/// variables (e.g. `SUBTRACK_SNAPSHOT_URL`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// CSV export endpoint of the backing spreadsheet.
    pub snapshot_url: String,
    /// Endpoint accepting serialized update instructions.
    pub update_url: String,
    pub bind_addr: String,
    pub bind_port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            snapshot_url: String::new(),
            update_url: String::new(),
            bind_addr: "127.0.0.1".to_string(),
            bind_port: 3001,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        let config: AppConfig = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file("subtrack.toml"))
            .merge(Env::prefixed("SUBTRACK_"))
            .extract()
            .map_err(|e| AppError::ConfigError(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("snapshot_url", &self.snapshot_url),
            ("update_url", &self.update_url),
        ] {
            if value.is_empty() {
                return Err(AppError::ConfigError(format!("{} is not configured", name)));
            }
            Url::parse(value)
                .map_err(|e| AppError::ConfigError(format!("{} is not a valid URL: {}", name, e)))?;
        }
        Ok(())
    }
}
