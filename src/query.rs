//! Maps a normalized search onto the flight-offers provider's query parameters.

use crate::models::SearchRequest;
use serde::Serialize;

/// Query parameters for `GET /v2/shopping/flight-offers`.
///
/// Also echoed back to the caller as the response `meta`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderQuery {
    pub origin_location_code: String,
    pub destination_location_code: String,
    pub departure_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_date: Option<String>,
    pub adults: u32,
    pub currency_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<u64>,
    pub max: u32,
}

impl ProviderQuery {
    pub fn from_request(request: &SearchRequest) -> Self {
        Self {
            origin_location_code: request.origin.clone(),
            destination_location_code: request.destination.clone(),
            departure_date: request.departure_date.format("%Y-%m-%d").to_string(),
            return_date: request
                .return_date
                .map(|d| d.format("%Y-%m-%d").to_string()),
            adults: request.adults,
            currency_code: request.currency_code.clone(),
            // The provider only accepts whole currency units here
            max_price: request.max_price.map(|p| p.ceil() as u64),
            max: request.max_results,
        }
    }

    /// Flattens the query into `(name, value)` pairs for `reqwest`.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("originLocationCode", self.origin_location_code.clone()),
            (
                "destinationLocationCode",
                self.destination_location_code.clone(),
            ),
            ("departureDate", self.departure_date.clone()),
            ("adults", self.adults.to_string()),
            ("currencyCode", self.currency_code.clone()),
            ("max", self.max.to_string()),
        ];

        if let Some(ref return_date) = self.return_date {
            params.push(("returnDate", return_date.clone()));
        }
        if let Some(max_price) = self.max_price {
            params.push(("maxPrice", max_price.to_string()));
        }

        params
    }
}
