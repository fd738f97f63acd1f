use crate::models::{OptimizeFor, Preferences, Route};

/// Weight given to the emphasised dimension.
const PRIMARY_WEIGHT: f64 = 1.0;
/// Weight given to the other dimension (and to both when the preference is unknown).
const SECONDARY_WEIGHT: f64 = 0.7;
/// Price is measured in units of 100 currency units.
const PRICE_SCALE: f64 = 100.0;
/// Duration is measured in hours.
const MINUTES_PER_HOUR: f64 = 60.0;

/// Desirability of a route in `(0, 1]`, higher is better.
///
/// `score = 1 / (1 + price_weight * price/100 + time_weight * minutes/60)`
pub fn score(route: &Route, preferences: &Preferences) -> f64 {
    let (price_weight, time_weight) = weights(&preferences.optimize_for);

    let price = route.price.max(0.0);
    let hours = route.total_travel_time_minutes as f64 / MINUTES_PER_HOUR;
    let raw = price_weight * (price / PRICE_SCALE) + time_weight * hours;

    1.0 / (1.0 + raw)
}

fn weights(optimize_for: &OptimizeFor) -> (f64, f64) {
    match optimize_for {
        OptimizeFor::Price => (PRIMARY_WEIGHT, SECONDARY_WEIGHT),
        OptimizeFor::Time => (SECONDARY_WEIGHT, PRIMARY_WEIGHT),
        OptimizeFor::Other(_) => (SECONDARY_WEIGHT, SECONDARY_WEIGHT),
    }
}
