use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============ Search Request ============

/// What the caller wants the ranking to emphasise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OptimizeFor {
    #[default]
    Price,
    Time,
    /// Any other value sent by the caller. Both weights fall back to 0.7.
    #[serde(untagged)]
    Other(String),
}

impl OptimizeFor {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "price" => OptimizeFor::Price,
            "time" => OptimizeFor::Time,
            _ => OptimizeFor::Other(raw.to_string()),
        }
    }
}

/// Ranking preferences attached to a search.
///
/// The three boolean flags are accepted and echoed back but do not affect
/// scoring or filtering.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub optimize_for: OptimizeFor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carry_on_only: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_overnight_layovers: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_self_transfer: Option<bool>,
}

impl Preferences {
    /// True when any of the accepted-but-unapplied flags was supplied.
    pub fn has_unapplied_flags(&self) -> bool {
        self.carry_on_only.is_some()
            || self.allow_overnight_layovers.is_some()
            || self.allow_self_transfer.is_some()
    }
}

/// A validated flight search, produced by the request normalizer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    pub origin: String,
    pub destination: String,
    pub departure_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub adults: u32,
    pub currency_code: String,
    pub max_price: Option<f64>,
    pub max_results: u32,
    pub allow_nearby_airports: Option<bool>,
    pub preferences: Preferences,
}

// ============ Normalized Routes ============

/// One non-stop flight leg.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub from: String,
    pub to: String,
    pub carrier_code: String,
    pub number: String,
    /// Departure timestamp as sent by the provider.
    pub departure: Option<String>,
    /// Arrival timestamp as sent by the provider.
    pub arrival: Option<String>,
}

/// The outbound itinerary of one offer, reduced to what the caller needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// 1-based label, unique within one response.
    pub id: String,
    pub price: f64,
    pub currency: String,
    pub total_travel_time_minutes: u64,
    pub segments: Vec<Segment>,
    pub score: f64,
    pub summary: String,
}

/// Echoed query plus pipeline counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseMeta {
    #[serde(flatten)]
    pub query: crate::query::ProviderQuery,
    pub preferences: Preferences,
    pub skipped_offers: usize,
    pub skipped_segment_durations: usize,
}

/// Routes sorted best-first plus the query that produced them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedResponse {
    pub routes: Vec<Route>,
    pub meta: ResponseMeta,
}

// ============ Raw Provider Offers ============

/// One priced flight proposal as returned by the provider.
///
/// Only the fields the extractor reads are typed; everything else is kept
/// in `raw`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawOffer {
    #[serde(default)]
    pub price: Option<RawPrice>,

    #[serde(default)]
    pub itineraries: Vec<RawItinerary>,

    #[serde(flatten)]
    pub raw: Value,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPrice {
    /// Usually a decimal string such as "412.00", sometimes a bare number.
    #[serde(default)]
    pub grand_total: Option<Value>,

    #[serde(default)]
    pub currency: Option<Value>,

    #[serde(flatten)]
    pub raw: Value,
}

/// Segments stay untyped here: one malformed segment must not sink the
/// whole offer.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawItinerary {
    #[serde(default)]
    pub duration: Option<String>,

    #[serde(default)]
    pub segments: Vec<Value>,
}

/// One leg as sent by the provider. Every field is read leniently; a value
/// of the wrong shape reads as absent.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSegment {
    /// Normally `{"iataCode": ..., "at": ...}`.
    #[serde(default)]
    pub departure: Option<Value>,

    #[serde(default)]
    pub arrival: Option<Value>,

    #[serde(default)]
    pub carrier_code: Option<Value>,

    #[serde(default)]
    pub number: Option<Value>,

    #[serde(flatten)]
    pub raw: Value,
}

impl RawSegment {
    /// Reads one segment. Anything that is not a JSON object yields an
    /// empty segment.
    pub fn from_value(value: &Value) -> Self {
        if !value.is_object() {
            return Self::default();
        }
        serde_json::from_value(value.clone()).unwrap_or_default()
    }

    pub fn departure_code(&self) -> Option<&str> {
        endpoint_str(self.departure.as_ref(), "iataCode")
    }

    pub fn arrival_code(&self) -> Option<&str> {
        endpoint_str(self.arrival.as_ref(), "iataCode")
    }

    /// Departure timestamp, only when it is a string.
    pub fn departure_at(&self) -> Option<&str> {
        endpoint_str(self.departure.as_ref(), "at")
    }

    pub fn arrival_at(&self) -> Option<&str> {
        endpoint_str(self.arrival.as_ref(), "at")
    }

    pub fn carrier_code(&self) -> Option<String> {
        scalar_text(self.carrier_code.as_ref())
    }

    pub fn flight_number(&self) -> Option<String> {
        scalar_text(self.number.as_ref())
    }
}

fn endpoint_str<'a>(endpoint: Option<&'a Value>, key: &str) -> Option<&'a str> {
    endpoint
        .and_then(Value::as_object)
        .and_then(|e| e.get(key))
        .and_then(Value::as_str)
}

/// Strings as-is, numbers rendered; anything else is absent.
fn scalar_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_raw_offer() {
        let json = r#"
        {
            "id": "1",
            "price": {"currency": "USD", "grandTotal": "412.00"},
            "itineraries": [
                {
                    "duration": "PT3H",
                    "segments": [
                        {
                            "departure": {"iataCode": "JFK", "at": "2025-06-01T10:00:00"},
                            "arrival": {"iataCode": "LAX", "at": "2025-06-01T13:00:00"},
                            "carrierCode": "AA",
                            "number": "100"
                        }
                    ]
                }
            ]
        }
        "#;

        let offer: RawOffer = serde_json::from_str(json).unwrap();
        assert_eq!(offer.itineraries.len(), 1);
        let segment = RawSegment::from_value(&offer.itineraries[0].segments[0]);
        assert_eq!(segment.departure_code(), Some("JFK"));
        assert_eq!(segment.arrival_at(), Some("2025-06-01T13:00:00"));
        assert_eq!(segment.carrier_code().as_deref(), Some("AA"));
    }

    #[test]
    fn test_raw_segment_reads_wrong_shapes_as_absent() {
        let segment = RawSegment::from_value(&serde_json::json!({
            "departure": "ORD 2025-06-01T13:00",
            "arrival": {"iataCode": 7, "at": "2025-06-01T15:00:00"},
            "carrierCode": ["UA"],
            "number": 512
        }));
        assert_eq!(segment.departure_code(), None);
        assert_eq!(segment.departure_at(), None);
        assert_eq!(segment.arrival_code(), None);
        assert_eq!(segment.arrival_at(), Some("2025-06-01T15:00:00"));
        assert_eq!(segment.carrier_code(), None);
        assert_eq!(segment.flight_number().as_deref(), Some("512"));

        let not_an_object = RawSegment::from_value(&serde_json::json!("JFK-LAX"));
        assert_eq!(not_an_object.departure_code(), None);
    }

    #[test]
    fn test_optimize_for_parse() {
        assert_eq!(OptimizeFor::parse("price"), OptimizeFor::Price);
        assert_eq!(OptimizeFor::parse(" TIME "), OptimizeFor::Time);
        assert_eq!(
            OptimizeFor::parse("comfort"),
            OptimizeFor::Other("comfort".to_string())
        );
    }

    #[test]
    fn test_segment_serializes_camel_case() {
        let segment = Segment {
            from: "JFK".to_string(),
            to: "LAX".to_string(),
            carrier_code: "AA".to_string(),
            number: "100".to_string(),
            departure: Some("2025-06-01T10:00:00".to_string()),
            arrival: None,
        };
        let value = serde_json::to_value(&segment).unwrap();
        assert_eq!(value["carrierCode"], "AA");
        assert_eq!(value["from"], "JFK");
        assert!(value["arrival"].is_null());
    }
}
