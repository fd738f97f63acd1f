use crate::extractor::extract_route;
use crate::models::{Preferences, Route};
use crate::scorer::score;
use crate::summarizer::summarize;
use serde_json::Value;
use std::cmp::Ordering;

/// Routes sorted best-first, plus what had to be dropped along the way.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RankOutcome {
    pub routes: Vec<Route>,
    pub skipped_offers: usize,
    pub skipped_segment_durations: usize,
}

/// Extracts, scores and summarizes every raw offer, then sorts by score
/// descending. Offers that cannot be extracted are logged and skipped.
///
/// Route ids are 1-based and sequential over the routes that survive
/// extraction, assigned in provider order. The sort is stable, so routes
/// with equal scores keep provider order.
pub fn rank_offers(
    offers: &[Value],
    preferences: &Preferences,
    fallback_currency: &str,
) -> RankOutcome {
    let mut outcome = RankOutcome {
        routes: Vec::with_capacity(offers.len()),
        ..RankOutcome::default()
    };

    for (index, raw) in offers.iter().enumerate() {
        let extracted = match extract_route(raw, index + 1, fallback_currency) {
            Ok(extracted) => extracted,
            Err(e) => {
                tracing::warn!("Skipping offer: {}", e);
                outcome.skipped_offers += 1;
                continue;
            }
        };

        let mut route = extracted.route;
        // Sequential over surviving routes, in provider order
        route.id = (outcome.routes.len() + 1).to_string();
        route.score = score(&route, preferences);
        route.summary = summarize(&route);

        outcome.skipped_segment_durations += extracted.skipped_segments;
        outcome.routes.push(route);
    }

    outcome
        .routes
        .sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

    tracing::info!(
        ranked = outcome.routes.len(),
        skipped_offers = outcome.skipped_offers,
        skipped_segment_durations = outcome.skipped_segment_durations,
        "Ranked provider offers"
    );

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OptimizeFor;
    use serde_json::json;

    fn offer(price: &str, dep: &str, arr: &str) -> Value {
        json!({
            "price": {"currency": "USD", "grandTotal": price},
            "itineraries": [{"segments": [{
                "departure": {"iataCode": "JFK", "at": dep},
                "arrival": {"iataCode": "LAX", "at": arr},
                "carrierCode": "AA",
                "number": "1"
            }]}]
        })
    }

    #[test]
    fn test_sorted_best_first() {
        let offers = vec![
            offer("500.00", "2025-06-01T10:00:00", "2025-06-01T13:00:00"),
            offer("200.00", "2025-06-01T10:00:00", "2025-06-01T13:00:00"),
            offer("350.00", "2025-06-01T10:00:00", "2025-06-01T13:00:00"),
        ];

        let outcome = rank_offers(&offers, &Preferences::default(), "USD");
        let ids: Vec<&str> = outcome.routes.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "3", "1"]);
        assert!(outcome
            .routes
            .windows(2)
            .all(|pair| pair[0].score >= pair[1].score));
        assert!(outcome.routes.iter().all(|r| !r.summary.is_empty()));
    }

    #[test]
    fn test_ties_keep_provider_order() {
        let offers = vec![
            offer("300.00", "2025-06-01T10:00:00", "2025-06-01T13:00:00"),
            offer("300.00", "2025-06-02T08:00:00", "2025-06-02T11:00:00"),
            offer("300.00", "2025-06-03T20:00:00", "2025-06-03T23:00:00"),
        ];

        let outcome = rank_offers(&offers, &Preferences::default(), "USD");
        let ids: Vec<&str> = outcome.routes.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_malformed_offer_skipped() {
        let offers = vec![
            offer("300.00", "2025-06-01T10:00:00", "2025-06-01T13:00:00"),
            json!("garbage"),
            json!({"itineraries": {"segments": []}}),
            offer("250.00", "bad", "2025-06-01T13:00:00"),
        ];

        let outcome = rank_offers(&offers, &Preferences::default(), "USD");
        assert_eq!(outcome.routes.len(), 2);
        assert_eq!(outcome.skipped_offers, 2);
        assert_eq!(outcome.skipped_segment_durations, 1);

        // Ids number the surviving routes without gaps
        let mut ids: Vec<&str> = outcome.routes.iter().map(|r| r.id.as_str()).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec!["1", "2"]);
        let second = outcome.routes.iter().find(|r| r.id == "2").unwrap();
        assert_eq!(second.price, 250.0);
    }

    #[test]
    fn test_preference_changes_order() {
        // Cheap but slower vs. pricier but faster
        let offers = vec![
            offer("100.00", "2025-06-01T06:00:00", "2025-06-01T11:00:00"),
            offer("300.00", "2025-06-01T10:00:00", "2025-06-01T13:00:00"),
        ];

        let by_price = rank_offers(&offers, &Preferences::default(), "USD");
        let by_time = rank_offers(
            &offers,
            &Preferences {
                optimize_for: OptimizeFor::Time,
                ..Preferences::default()
            },
            "USD",
        );

        assert_eq!(by_price.routes[0].id, "1");
        assert_eq!(by_time.routes[0].id, "2");
    }

    #[test]
    fn test_empty_offers() {
        let outcome = rank_offers(&[], &Preferences::default(), "USD");
        assert!(outcome.routes.is_empty());
        assert_eq!(outcome.skipped_offers, 0);
    }
}
