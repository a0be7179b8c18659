//! Configuration management

use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
    pub port: u16,
    /// `*` allows any origin.
    pub allowed_origins: Vec<String>,
    /// Requests per window and client; 0 disables rate limiting.
    pub rate_limit_requests: u32,
    pub rate_limit_period_seconds: u64,
    pub max_upload_mb: usize,
}

impl Config {
    /// Defaults, overridden by `TERRASYNC_*` variables, then by a plain `PORT`.
    pub fn from_env() -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("port", 8080)?
            .set_default("allowed_origins", vec!["*"])?
            .set_default("rate_limit_requests", 100)?
            .set_default("rate_limit_period_seconds", 60)?
            .set_default("max_upload_mb", 10)?
            .add_source(
                config::Environment::with_prefix("TERRASYNC")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("allowed_origins"),
            )
            .set_override_option("port", env::var("PORT").ok())?
            .build()
            .context("Failed to load configuration")?;

        let mut config: Config = settings
            .try_deserialize()
            .context("Invalid configuration")?;
        config.allowed_origins = config
            .allowed_origins
            .iter()
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();
        Ok(config)
    }

    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            allowed_origins: vec!["*".to_string()],
            rate_limit_requests: 100,
            rate_limit_period_seconds: 60,
            max_upload_mb: 10,
        }
    }
}
