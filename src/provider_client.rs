use crate::circuit_breaker::{create_provider_circuit_breaker, ProviderBreaker};
use crate::config::Config;
use crate::errors::AppError;
use crate::query::ProviderQuery;
use async_trait::async_trait;
use failsafe::futures::CircuitBreaker;
use moka::future::Cache;
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

const TOKEN_KEY: &str = "access_token";
/// Provider tokens live ~30 minutes; refresh a little earlier.
const TOKEN_TTL: Duration = Duration::from_secs(25 * 60);

/// Source of raw flight offers.
///
/// Injected into the HTTP state so tests can swap in a fake.
#[async_trait]
pub trait FlightOffersProvider: Send + Sync {
    /// Runs one search and returns the provider's raw offer records.
    async fn search_offers(&self, query: &ProviderQuery) -> Result<Vec<Value>, AppError>;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct OffersResponse {
    #[serde(default)]
    data: Vec<Value>,
}

/// Client for the Amadeus self-service flight-offers API.
#[derive(Clone)]
pub struct AmadeusClient {
    client: reqwest::Client,
    base_url: String,
    client_id: String,
    client_secret: String,
    /// OAuth2 access token, keyed by [`TOKEN_KEY`]. Offers are never cached.
    tokens: Cache<String, String>,
    breaker: ProviderBreaker,
}

impl AmadeusClient {
    /// Creates a new `AmadeusClient` with the configured request timeout.
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(config.provider_timeout())
            .build()
            .map_err(|e| {
                AppError::Internal(format!("Failed to create flight provider client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: config.provider_base_url.clone(),
            client_id: config.provider_client_id.clone(),
            client_secret: config.provider_client_secret.clone(),
            tokens: Cache::builder()
                .time_to_live(TOKEN_TTL)
                .max_capacity(1)
                .build(),
            breaker: create_provider_circuit_breaker(),
        })
    }

    /// Returns a cached access token or fetches a new one.
    async fn access_token(&self) -> Result<String, AppError> {
        if let Some(token) = self.tokens.get(TOKEN_KEY).await {
            return Ok(token);
        }

        let url = format!("{}/v1/security/oauth2/token", self.base_url);
        tracing::info!("Requesting flight provider access token");

        let response = self
            .client
            .post(&url)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Token request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Provider(format!(
                "Provider authentication failed ({}): {}",
                status,
                provider_message(&error_text)
            )));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            AppError::Provider(format!("Failed to parse token response: {}", e))
        })?;

        tracing::debug!("Access token issued, expires_in={:?}", token.expires_in);
        self.tokens
            .insert(TOKEN_KEY.to_string(), token.access_token.clone())
            .await;

        Ok(token.access_token)
    }

    /// One authenticated offers request. `Ok(None)` means the token was rejected.
    async fn fetch_offers(
        &self,
        token: &str,
        query: &ProviderQuery,
    ) -> Result<Option<Vec<Value>>, AppError> {
        let url = reqwest::Url::parse_with_params(
            &format!("{}/v2/shopping/flight-offers", self.base_url),
            query.to_params(),
        )
        .map_err(|e| AppError::Internal(format!("Failed to build provider URL: {}", e)))?;

        tracing::info!(
            "Searching flight offers {} -> {} on {}",
            query.origin_location_code,
            query.destination_location_code,
            query.departure_date
        );

        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(AppError::from)?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Ok(None);
        }

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!("Flight provider returned error {}: {}", status, error_text);
            let message = provider_message(&error_text);
            // A refused request says nothing about provider health; throttling does
            return Err(if status.is_client_error() && status != StatusCode::TOO_MANY_REQUESTS {
                AppError::ProviderRejected(message)
            } else {
                AppError::Provider(message)
            });
        }

        let offers: OffersResponse = response.json().await.map_err(|e| {
            AppError::Provider(format!("Failed to parse flight offers response: {}", e))
        })?;

        tracing::info!("Flight provider returned {} offer(s)", offers.data.len());
        Ok(Some(offers.data))
    }

    async fn search_with_refresh(&self, query: &ProviderQuery) -> Result<Vec<Value>, AppError> {
        let token = self.access_token().await?;
        if let Some(offers) = self.fetch_offers(&token, query).await? {
            return Ok(offers);
        }

        tracing::warn!("Access token rejected, requesting a fresh one");
        self.tokens.invalidate(TOKEN_KEY).await;
        let token = self.access_token().await?;
        self.fetch_offers(&token, query).await?.ok_or_else(|| {
            AppError::Provider("Flight provider rejected the access token".to_string())
        })
    }
}

#[async_trait]
impl FlightOffersProvider for AmadeusClient {
    async fn search_offers(&self, query: &ProviderQuery) -> Result<Vec<Value>, AppError> {
        // Only provider faults trip the breaker; refused requests pass through
        match self
            .breaker
            .call_with(AppError::is_provider_fault, self.search_with_refresh(query))
            .await
        {
            Ok(offers) => Ok(offers),
            Err(failsafe::Error::Inner(e)) => Err(e),
            Err(failsafe::Error::Rejected) => {
                tracing::warn!("Flight provider circuit open, failing fast");
                Err(AppError::Provider(
                    "flight provider temporarily unavailable".to_string(),
                ))
            }
        }
    }
}

/// Pulls a readable message out of a provider error body.
///
/// Provider errors look like `{"errors":[{"title": ..., "detail": ...}]}`.
pub fn provider_message(body: &str) -> String {
    let first_error = serde_json::from_str::<Value>(body).ok().and_then(|v| {
        v.get("errors")
            .and_then(|e| e.as_array())
            .and_then(|errors| errors.first().cloned())
    });

    first_error
        .as_ref()
        .and_then(|e| {
            e.get("detail")
                .and_then(Value::as_str)
                .or_else(|| e.get("title").and_then(Value::as_str))
        })
        .map(str::to_string)
        .unwrap_or_else(|| {
            let trimmed = body.trim();
            if trimmed.is_empty() {
                "Unknown provider error".to_string()
            } else {
                trimmed.to_string()
            }
        })
}
