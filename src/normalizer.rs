//! Turns an inbound JSON payload into a validated [`SearchRequest`].

use crate::errors::AppError;
use crate::models::{OptimizeFor, Preferences, SearchRequest};
use crate::webhook_models::InboundPayload;
use chrono::NaiveDate;
use serde_json::{Map, Value};

pub const DEFAULT_CURRENCY: &str = "USD";
pub const DEFAULT_MAX_RESULTS: u32 = 5;

/// Normalizes a direct body or a tool-call envelope into a [`SearchRequest`].
pub fn normalize(payload: Value) -> Result<SearchRequest, AppError> {
    let inbound = InboundPayload::decode(payload);
    if let InboundPayload::ToolCall {
        ref tool_call_id,
        ref function_name,
        ..
    } = inbound
    {
        tracing::info!(
            tool_call_id = ?tool_call_id,
            function = ?function_name,
            "Unwrapped voice-assistant tool call"
        );
    }

    let body = inbound.into_body();
    let fields = body
        .as_object()
        .ok_or_else(|| AppError::invalid_field("body", "must be a JSON object"))?;

    let request = SearchRequest {
        origin: location_code(fields, "origin")?,
        destination: location_code(fields, "destination")?,
        departure_date: date(fields, "departure_date")?
            .ok_or_else(|| AppError::missing_field("departure_date"))?,
        return_date: date(fields, "return_date")?,
        adults: adults(fields)?,
        currency_code: optional_str(fields, "currency_code")?
            .map(|c| c.to_ascii_uppercase())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        max_price: max_price(fields)?,
        max_results: positive_int(fields, "max_results")?.unwrap_or(DEFAULT_MAX_RESULTS),
        allow_nearby_airports: optional_bool(fields, "allow_nearby_airports")?,
        preferences: preferences(fields)?,
    };

    // Full normalized body, unredacted
    tracing::info!(
        origin = %request.origin,
        destination = %request.destination,
        departure_date = %request.departure_date,
        return_date = ?request.return_date,
        adults = request.adults,
        currency_code = %request.currency_code,
        max_price = ?request.max_price,
        max_results = request.max_results,
        allow_nearby_airports = ?request.allow_nearby_airports,
        preferences = ?request.preferences,
        "Normalized flight search request"
    );

    if request.preferences.has_unapplied_flags() {
        tracing::debug!("Layover/baggage preference flags accepted but not applied to ranking");
    }

    Ok(request)
}

/// Treats JSON `null` the same as an absent key.
fn field<'a>(fields: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    fields.get(name).filter(|v| !v.is_null())
}

fn optional_str(fields: &Map<String, Value>, name: &str) -> Result<Option<String>, AppError> {
    match field(fields, name) {
        None => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.trim().to_string())),
        Some(_) => Err(AppError::invalid_field(name, "must be a string")),
    }
}

fn location_code(fields: &Map<String, Value>, name: &str) -> Result<String, AppError> {
    optional_str(fields, name)?
        .map(|code| code.to_ascii_uppercase())
        .ok_or_else(|| AppError::missing_field(name))
}

fn date(fields: &Map<String, Value>, name: &str) -> Result<Option<NaiveDate>, AppError> {
    optional_str(fields, name)?
        .map(|raw| {
            NaiveDate::parse_from_str(&raw, "%Y-%m-%d").map_err(|_| {
                AppError::invalid_field(name, format!("must be a YYYY-MM-DD date, got '{}'", raw))
            })
        })
        .transpose()
}

fn adults(fields: &Map<String, Value>) -> Result<u32, AppError> {
    let value = field(fields, "adults").ok_or_else(|| AppError::missing_field("adults"))?;
    let count = value
        .as_u64()
        .ok_or_else(|| AppError::invalid_field("adults", "must be an integer >= 1"))?;
    if count < 1 {
        return Err(AppError::invalid_field("adults", "must be an integer >= 1"));
    }
    u32::try_from(count).map_err(|_| AppError::invalid_field("adults", "is too large"))
}

fn positive_int(fields: &Map<String, Value>, name: &str) -> Result<Option<u32>, AppError> {
    let Some(value) = field(fields, name) else {
        return Ok(None);
    };
    value
        .as_u64()
        .filter(|n| *n >= 1)
        .and_then(|n| u32::try_from(n).ok())
        .map(Some)
        .ok_or_else(|| AppError::invalid_field(name, "must be a positive integer"))
}

fn max_price(fields: &Map<String, Value>) -> Result<Option<f64>, AppError> {
    let Some(value) = field(fields, "max_price") else {
        return Ok(None);
    };
    value
        .as_f64()
        .filter(|p| p.is_finite() && *p > 0.0)
        .map(Some)
        .ok_or_else(|| AppError::invalid_field("max_price", "must be a positive number"))
}

fn optional_bool(fields: &Map<String, Value>, name: &str) -> Result<Option<bool>, AppError> {
    match field(fields, name) {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(AppError::invalid_field(name, "must be a boolean")),
    }
}

fn preferences(fields: &Map<String, Value>) -> Result<Preferences, AppError> {
    let prefs = match field(fields, "preferences") {
        None => return Ok(Preferences::default()),
        Some(Value::Object(prefs)) => prefs,
        Some(_) => return Err(AppError::invalid_field("preferences", "must be an object")),
    };

    Ok(Preferences {
        optimize_for: optional_str(prefs, "optimize_for")?
            .map(|raw| OptimizeFor::parse(&raw))
            .unwrap_or_default(),
        carry_on_only: optional_bool(prefs, "carry_on_only")?,
        allow_overnight_layovers: optional_bool(prefs, "allow_overnight_layovers")?,
        allow_self_transfer: optional_bool(prefs, "allow_self_transfer")?,
    })
}
