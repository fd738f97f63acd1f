use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_PROVIDER_BASE_URL: &str = "https://test.api.amadeus.com";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub provider_base_url: String,
    pub provider_client_id: String,
    pub provider_client_secret: String,
    pub provider_timeout_secs: u64,
    pub webhook_secret: Option<String>, // Optional, checked against x-vapi-secret
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            provider_base_url: validate_base_url(
                std::env::var("AMADEUS_BASE_URL")
                    .ok()
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_PROVIDER_BASE_URL.to_string()),
            )?,
            provider_client_id: required("AMADEUS_CLIENT_ID")?,
            provider_client_secret: required("AMADEUS_CLIENT_SECRET")?,
            provider_timeout_secs: std::env::var("PROVIDER_TIMEOUT_SECS")
                .unwrap_or_else(|_| "20".to_string())
                .parse()
                .ok()
                .filter(|secs: &u64| *secs > 0)
                .ok_or_else(|| {
                    anyhow::anyhow!("PROVIDER_TIMEOUT_SECS must be a positive number of seconds")
                })?,
            webhook_secret: std::env::var("WEBHOOK_SECRET")
                .ok()
                .filter(|s| !s.trim().is_empty()),
        };

        // Never log credentials
        tracing::debug!("Provider base URL: {}", config.provider_base_url);
        tracing::debug!("Provider timeout: {}s", config.provider_timeout_secs);
        tracing::debug!("Server Port: {}", config.port);
        if config.webhook_secret.is_none() {
            tracing::warn!("WEBHOOK_SECRET not set, flight search endpoint accepts unsigned calls");
        }

        Ok(config)
    }

    pub fn provider_timeout(&self) -> Duration {
        Duration::from_secs(self.provider_timeout_secs)
    }
}

fn required(name: &str) -> anyhow::Result<String> {
    let value = std::env::var(name)
        .map_err(|_| anyhow::anyhow!("{} environment variable required", name))?;
    if value.trim().is_empty() {
        anyhow::bail!("{} cannot be empty", name);
    }
    Ok(value)
}

fn validate_base_url(raw: String) -> anyhow::Result<String> {
    let parsed = url::Url::parse(&raw)
        .map_err(|e| anyhow::anyhow!("AMADEUS_BASE_URL is not a valid URL: {}", e))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        anyhow::bail!("AMADEUS_BASE_URL must start with http:// or https://");
    }
    Ok(raw.trim_end_matches('/').to_string())
}
