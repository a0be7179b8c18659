//! Client configuration

use reqwest::Url;
use std::env;

use crate::error::ClientError;

pub const DEFAULT_BASE_URL: &str = "https://terrasync.up.railway.app";
pub const BASE_URL_ENV: &str = "TERRASYNC_API_URL";

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub base_url: String,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        let base_url = base_url.into();
        validate_base_url(&base_url)?;
        Ok(Self { base_url })
    }

    /// Reads `TERRASYNC_API_URL`, falling back to the hosted API.
    pub fn from_env() -> Result<Self, ClientError> {
        let base_url = env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::new(base_url)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

fn validate_base_url(base_url: &str) -> Result<(), ClientError> {
    let url = Url::parse(base_url)
        .map_err(|e| ClientError::Config(format!("{base_url}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ClientError::Config(format!(
            "{base_url}: unsupported scheme {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn accepts_http_and_https() {
        assert!(ClientConfig::new("http://127.0.0.1:8080").is_ok());
        assert!(ClientConfig::new(DEFAULT_BASE_URL).is_ok());
    }

    #[test]
    fn rejects_relative_and_foreign_schemes() {
        assert!(matches!(
            ClientConfig::new("terrasync.up.railway.app"),
            Err(ClientError::Config(_))
        ));
        assert!(matches!(
            ClientConfig::new("ftp://terrasync.example"),
            Err(ClientError::Config(_))
        ));
    }

    #[test]
    fn from_env_falls_back_to_hosted_api() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        env::remove_var(BASE_URL_ENV);

        let config = ClientConfig::from_env().unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn from_env_reads_override() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        env::set_var(BASE_URL_ENV, "http://127.0.0.1:9000");

        let config = ClientConfig::from_env();
        env::remove_var(BASE_URL_ENV);

        assert_eq!(config.unwrap().base_url, "http://127.0.0.1:9000");
    }

    #[test]
    fn from_env_rejects_invalid_override() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        env::set_var(BASE_URL_ENV, "not a url");

        let config = ClientConfig::from_env();
        env::remove_var(BASE_URL_ENV);

        let err = config.unwrap_err();
        assert!(matches!(err, ClientError::Config(_)));
        assert!(err.to_string().contains("not a url"));
    }
}
