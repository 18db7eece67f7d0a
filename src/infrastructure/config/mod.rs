use std::path::PathBuf;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::LLMConfig;

/// Optional TOML file read from the working directory
pub const CONFIG_FILE: &str = "csv-toolbox.toml";

/// Prefix of environment overrides, e.g. `CSV_TOOLBOX_PORT=8080`
pub const ENV_PREFIX: &str = "CSV_TOOLBOX_";

/// Upper bound for `rows_per_page`
pub const MAX_ROWS_PER_PAGE: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,

    /// Where processed files are written; next to the input when unset
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Parsed files kept by the search cache
    pub search_cache_capacity: usize,

    pub default_search_column: String,
    pub rows_per_page: usize,

    #[serde(default)]
    pub llm: LLMConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3001,
            output_dir: None,
            search_cache_capacity: 8,
            default_search_column: "email".to_string(),
            rows_per_page: 10,
            llm: LLMConfig::default(),
        }
    }
}

impl AppConfig {
    /// Defaults, then `csv-toolbox.toml`, then `CSV_TOOLBOX_*` variables
    pub fn load() -> Result<Self> {
        Self::from_figment(
            Figment::from(Serialized::defaults(AppConfig::default()))
                .merge(Toml::file(CONFIG_FILE))
                .merge(Env::prefixed(ENV_PREFIX).split("__")),
        )
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: AppConfig = figment
            .extract()
            .map_err(|e| AppError::ConfigurationError(format!("Invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(AppError::ConfigurationError(
                "port must be > 0".to_string(),
            ));
        }
        if self.search_cache_capacity == 0 {
            return Err(AppError::ConfigurationError(
                "search_cache_capacity must be > 0".to_string(),
            ));
        }
        if !(1..=MAX_ROWS_PER_PAGE).contains(&self.rows_per_page) {
            return Err(AppError::ConfigurationError(format!(
                "rows_per_page must be between 1 and {}",
                MAX_ROWS_PER_PAGE
            )));
        }
        Ok(())
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.host.clone(), self.port)
    }
}
