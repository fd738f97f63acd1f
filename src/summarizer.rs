use crate::models::Route;

/// One-sentence description of a route, suitable for reading out loud.
pub fn summarize(route: &Route) -> String {
    let (Some(first), Some(last)) = (route.segments.first(), route.segments.last()) else {
        return format!(
            "Approximate price {} {}.",
            format_price(route.price),
            route.currency
        );
    };

    format!(
        "{} trip from {} to {}, about {}, total price around {} {}.",
        stop_phrase(route.segments.len().saturating_sub(1)),
        first.from,
        last.to,
        duration_phrase(route.total_travel_time_minutes),
        format_price(route.price),
        route.currency
    )
}

fn stop_phrase(stops: usize) -> String {
    match stops {
        0 => "non-stop".to_string(),
        1 => "1 stop".to_string(),
        n => format!("{} stops", n),
    }
}

fn duration_phrase(minutes: u64) -> String {
    if minutes == 0 {
        return "unknown duration".to_string();
    }
    format!("{}h {}m", minutes / 60, minutes % 60)
}

fn format_price(price: f64) -> String {
    format!("{:.2}", price)
}
