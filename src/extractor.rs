//! Raw provider offer → [`Route`].

use crate::errors::AppError;
use crate::models::{RawOffer, RawPrice, RawSegment, Route, Segment};
use chrono::{DateTime, NaiveDateTime};
use serde_json::Value;

/// A freshly extracted route plus how many segment durations were skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted {
    pub route: Route,
    pub skipped_segments: usize,
}

/// Builds the route for one raw offer.
///
/// `position` is the offer's 1-based position in the provider response; it
/// labels log lines and is the route id until the ranking pipeline renumbers
/// the survivors. Score and summary are left empty.
pub fn extract_route(
    raw: &Value,
    position: usize,
    fallback_currency: &str,
) -> Result<Extracted, AppError> {
    if !raw.is_object() {
        return Err(AppError::Extraction(format!(
            "offer {} is not a JSON object",
            position
        )));
    }

    let offer: RawOffer = serde_json::from_value(raw.clone())
        .map_err(|e| AppError::Extraction(format!("offer {} is malformed: {}", position, e)))?;

    let (price, currency) = price_of(offer.price.as_ref(), fallback_currency);

    // Outbound only; a return itinerary is not represented
    let raw_segments = offer
        .itineraries
        .first()
        .map(|itinerary| itinerary.segments.as_slice())
        .unwrap_or_default();

    let mut segments = Vec::with_capacity(raw_segments.len());
    let mut total_minutes = 0u64;
    let mut skipped_segments = 0;

    for value in raw_segments {
        if !value.is_object() {
            skipped_segments += 1;
            tracing::debug!(offer = position, "Segment is not an object, left out of the route");
            continue;
        }

        let raw_segment = RawSegment::from_value(value);
        match segment_minutes(&raw_segment) {
            Some(minutes) => total_minutes += minutes,
            None => {
                skipped_segments += 1;
                tracing::debug!(
                    offer = position,
                    carrier = ?raw_segment.carrier_code(),
                    number = ?raw_segment.flight_number(),
                    "Segment timestamps unusable, duration counted as 0"
                );
            }
        }
        segments.push(to_segment(&raw_segment));
    }

    Ok(Extracted {
        route: Route {
            id: position.to_string(),
            price,
            currency,
            total_travel_time_minutes: total_minutes,
            segments,
            score: 0.0,
            summary: String::new(),
        },
        skipped_segments,
    })
}

/// `grandTotal` as a number, 0 when absent or unparsable.
fn price_of(price: Option<&RawPrice>, fallback_currency: &str) -> (f64, String) {
    let amount = price
        .and_then(|p| p.grand_total.as_ref())
        .and_then(|total| match total {
            Value::String(s) => s.trim().parse::<f64>().ok(),
            Value::Number(n) => n.as_f64(),
            _ => None,
        })
        .filter(|amount| amount.is_finite() && *amount >= 0.0)
        .unwrap_or(0.0);

    let currency = price
        .and_then(|p| p.currency.as_ref())
        .and_then(Value::as_str)
        .filter(|c| !c.trim().is_empty())
        .unwrap_or(fallback_currency)
        .to_string();

    (amount, currency)
}

/// Whole minutes between departure and arrival, `None` when either timestamp
/// is missing, unparsable, or the arrival precedes the departure.
fn segment_minutes(segment: &RawSegment) -> Option<u64> {
    let departure = parse_timestamp(segment.departure_at()?)?;
    let arrival = parse_timestamp(segment.arrival_at()?)?;
    let minutes = (arrival - departure).num_minutes();
    u64::try_from(minutes).ok()
}

/// Parses provider timestamps. Offset-less values are read as local clock
/// time; RFC 3339 values are converted to UTC.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.naive_utc()))
}

fn to_segment(raw: &RawSegment) -> Segment {
    Segment {
        from: raw.departure_code().unwrap_or_default().to_string(),
        to: raw.arrival_code().unwrap_or_default().to_string(),
        carrier_code: raw.carrier_code().unwrap_or_default(),
        number: raw.flight_number().unwrap_or_default(),
        departure: raw.departure_at().map(str::to_string),
        arrival: raw.arrival_at().map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn segment(from: &str, to: &str, dep: Value, arr: Value) -> Value {
        json!({
            "departure": {"iataCode": from, "at": dep},
            "arrival": {"iataCode": to, "at": arr},
            "carrierCode": "AA",
            "number": "100"
        })
    }

    #[test]
    fn test_single_segment_offer() {
        let offer = json!({
            "price": {"currency": "USD", "grandTotal": "412.00"},
            "itineraries": [{"segments": [
                segment("JFK", "LAX", json!("2025-06-01T10:00:00"), json!("2025-06-01T13:00:00"))
            ]}]
        });

        let extracted = extract_route(&offer, 1, "EUR").unwrap();
        let route = extracted.route;
        assert_eq!(route.id, "1");
        assert_eq!(route.price, 412.0);
        assert_eq!(route.currency, "USD");
        assert_eq!(route.total_travel_time_minutes, 180);
        assert_eq!(route.segments.len(), 1);
        assert_eq!(route.segments[0].from, "JFK");
        assert_eq!(route.segments[0].to, "LAX");
        assert_eq!(route.score, 0.0);
        assert!(route.summary.is_empty());
        assert_eq!(extracted.skipped_segments, 0);
    }

    #[test]
    fn test_durations_accumulate_and_floor() {
        let offer = json!({
            "price": {"grandTotal": "250.10"},
            "itineraries": [{"segments": [
                segment("BOS", "ORD", json!("2025-06-01T06:00:00"), json!("2025-06-01T08:30:59")),
                segment("ORD", "SFO", json!("2025-06-01T10:00"), json!("2025-06-01T14:45"))
            ]}]
        });

        let route = extract_route(&offer, 2, "USD").unwrap().route;
        assert_eq!(route.total_travel_time_minutes, 150 + 285);
        assert_eq!(route.currency, "USD");
        assert_eq!(route.id, "2");
    }

    #[test]
    fn test_bad_timestamps_contribute_zero() {
        let offer = json!({
            "price": {"grandTotal": "99"},
            "itineraries": [{"segments": [
                segment("JFK", "ORD", json!("yesterday"), json!("2025-06-01T13:00:00")),
                segment("ORD", "LAX", json!("2025-06-01T15:00:00"), json!("2025-06-01T17:00:00")),
                segment("LAX", "SAN", json!(1717200000), Value::Null)
            ]}]
        });

        let extracted = extract_route(&offer, 1, "USD").unwrap();
        assert_eq!(extracted.route.total_travel_time_minutes, 120);
        assert_eq!(extracted.route.segments.len(), 3);
        assert_eq!(extracted.skipped_segments, 2);
    }

    #[test]
    fn test_malformed_segment_costs_only_its_duration() {
        let offer = json!({
            "price": {"grandTotal": "310.00", "currency": "USD"},
            "itineraries": [{"segments": [
                segment("JFK", "ORD", json!("2025-06-01T08:00:00"), json!("2025-06-01T10:00:00")),
                {
                    "departure": "ORD 2025-06-01T13:00",
                    "arrival": {"iataCode": "SFO", "at": "2025-06-01T16:30:00"},
                    "carrierCode": 42,
                    "number": {"value": "7"}
                },
                "SFO-HNL"
            ]}]
        });

        let extracted = extract_route(&offer, 1, "USD").unwrap();
        let route = extracted.route;
        assert_eq!(route.total_travel_time_minutes, 120);
        assert_eq!(extracted.skipped_segments, 2);
        assert_eq!(route.segments.len(), 2);
        assert_eq!(route.segments[0].to, "ORD");
        assert_eq!(route.segments[1].from, "");
        assert_eq!(route.segments[1].to, "SFO");
        assert_eq!(route.segments[1].carrier_code, "42");
        assert_eq!(route.segments[1].number, "");
    }

    #[test]
    fn test_only_first_itinerary_used() {
        let offer = json!({
            "price": {"grandTotal": "800.00"},
            "itineraries": [
                {"segments": [segment("JFK", "LHR", json!("2025-06-01T18:00:00"), json!("2025-06-02T01:00:00"))]},
                {"segments": [segment("LHR", "JFK", json!("2025-06-10T10:00:00"), json!("2025-06-10T18:00:00"))]}
            ]
        });

        let route = extract_route(&offer, 1, "USD").unwrap().route;
        assert_eq!(route.segments.len(), 1);
        assert_eq!(route.segments[0].to, "LHR");
        assert_eq!(route.total_travel_time_minutes, 420);
    }

    #[test]
    fn test_missing_or_garbage_price_defaults_to_zero() {
        let no_price = json!({"itineraries": []});
        let route = extract_route(&no_price, 1, "GBP").unwrap().route;
        assert_eq!(route.price, 0.0);
        assert_eq!(route.currency, "GBP");
        assert!(route.segments.is_empty());

        let garbage = json!({"price": {"grandTotal": "n/a", "currency": "EUR"}});
        let route = extract_route(&garbage, 1, "GBP").unwrap().route;
        assert_eq!(route.price, 0.0);
        assert_eq!(route.currency, "EUR");
    }

    #[test]
    fn test_numeric_grand_total() {
        let offer = json!({"price": {"grandTotal": 123.5}});
        assert_eq!(extract_route(&offer, 1, "USD").unwrap().route.price, 123.5);
    }

    #[test]
    fn test_structurally_broken_offer_is_an_error() {
        assert!(matches!(
            extract_route(&json!("offer"), 1, "USD"),
            Err(AppError::Extraction(_))
        ));
        assert!(matches!(
            extract_route(&json!({"itineraries": "none"}), 1, "USD"),
            Err(AppError::Extraction(_))
        ));
    }

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2025-06-01T10:00:00").is_some());
        assert!(parse_timestamp("2025-06-01T10:00").is_some());
        assert!(parse_timestamp("2025-06-01T10:00:00.000").is_some());
        assert!(parse_timestamp("2025-06-01T10:00:00Z").is_some());
        assert!(parse_timestamp("2025-06-01T10:00:00+02:00").is_some());
        assert!(parse_timestamp("10:00").is_none());
    }
}
