use crate::errors::{AppError, ResultExt};
use crate::models::{RankedResponse, ResponseMeta};
use crate::normalizer::normalize;
use crate::provider_client::FlightOffersProvider;
use crate::query::ProviderQuery;
use crate::ranking::rank_offers;
use serde_json::Value;
use tracing::Instrument;
use uuid::Uuid;

/// Runs one flight search end to end.
pub struct FlightSearchService<'a> {
    provider: &'a dyn FlightOffersProvider,
}

impl<'a> FlightSearchService<'a> {
    pub fn new(provider: &'a dyn FlightOffersProvider) -> Self {
        Self { provider }
    }

    /// Normalize → build query → call provider → rank.
    ///
    /// Validation and provider failures stop processing; malformed offers do not.
    pub async fn search(&self, payload: Value) -> Result<RankedResponse, AppError> {
        let search_id = Uuid::new_v4();
        self.run(payload)
            .instrument(tracing::info_span!("flight_search", %search_id))
            .await
    }

    async fn run(&self, payload: Value) -> Result<RankedResponse, AppError> {
        let request = normalize(payload)?;
        let query = ProviderQuery::from_request(&request);

        let offers = self
            .provider
            .search_offers(&query)
            .await
            .with_context(|| {
                format!(
                    "searching {} -> {}",
                    query.origin_location_code, query.destination_location_code
                )
            })?;
        let outcome = rank_offers(&offers, &request.preferences, &request.currency_code);

        tracing::info!(
            "Search complete: {} offer(s) received, {} route(s) returned",
            offers.len(),
            outcome.routes.len()
        );

        Ok(RankedResponse {
            routes: outcome.routes,
            meta: ResponseMeta {
                query,
                preferences: request.preferences,
                skipped_offers: outcome.skipped_offers,
                skipped_segment_durations: outcome.skipped_segment_durations,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProvider {
        calls: AtomicUsize,
        offers: Vec<Value>,
    }

    #[async_trait]
    impl FlightOffersProvider for CountingProvider {
        async fn search_offers(&self, _query: &ProviderQuery) -> Result<Vec<Value>, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.offers.clone())
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl FlightOffersProvider for FailingProvider {
        async fn search_offers(&self, _query: &ProviderQuery) -> Result<Vec<Value>, AppError> {
            Err(AppError::Provider("quota exceeded".to_string()))
        }
    }

    #[tokio::test]
    async fn test_validation_failure_skips_provider() {
        let provider = CountingProvider {
            calls: AtomicUsize::new(0),
            offers: vec![],
        };
        let service = FlightSearchService::new(&provider);

        let result = service
            .search(json!({"destination": "LAX", "departure_date": "2025-06-01", "adults": 1}))
            .await;

        assert!(matches!(result, Err(AppError::Validation { .. })));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_provider_failure_propagates() {
        let service = FlightSearchService::new(&FailingProvider);
        let result = service
            .search(json!({
                "origin": "JFK",
                "destination": "LAX",
                "departure_date": "2025-06-01",
                "adults": 1
            }))
            .await;

        let err = result.unwrap_err();
        assert!(err.to_string().starts_with("searching JFK -> LAX"));
        match err.root() {
            AppError::Provider(msg) => assert_eq!(msg, "quota exceeded"),
            other => panic!("Expected provider error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_meta_echoes_query() {
        let provider = CountingProvider {
            calls: AtomicUsize::new(0),
            offers: vec![json!({"price": {"grandTotal": "10.00"}})],
        };
        let service = FlightSearchService::new(&provider);

        let response = service
            .search(json!({
                "origin": "JFK",
                "destination": "LAX",
                "departure_date": "2025-06-01",
                "return_date": "2025-06-05",
                "adults": 2,
                "currency_code": "EUR",
                "max_results": 3
            }))
            .await
            .unwrap();

        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
        assert_eq!(response.meta.query.return_date.as_deref(), Some("2025-06-05"));
        assert_eq!(response.meta.query.currency_code, "EUR");
        assert_eq!(response.routes.len(), 1);
        assert_eq!(response.routes[0].currency, "EUR");
        assert_eq!(response.routes[0].summary, "Approximate price 10.00 EUR.");
    }
}
