use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Category of a request validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationKind {
    /// A required field (origin, destination, departure_date, adults) is absent.
    MissingRequiredField,
    /// A field is present but has the wrong type or an out-of-range value.
    InvalidField,
}

impl ValidationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationKind::MissingRequiredField => "missing_required_field",
            ValidationKind::InvalidField => "invalid_field",
        }
    }
}

/// Application-specific error types.
#[derive(Debug, Clone)]
pub enum AppError {
    /// The search request failed validation.
    Validation {
        /// What kind of validation failure this is.
        kind: ValidationKind,
        /// Human readable description, names the offending field.
        message: String,
    },
    /// The external flight-offers provider call failed.
    Provider(String),
    /// The provider refused this particular request (4xx), e.g. a past date.
    /// Carries the provider's message; says nothing about provider health.
    ProviderRejected(String),
    /// A single raw offer could not be turned into a route.
    Extraction(String),
    /// Missing or invalid webhook secret.
    Unauthorized(String),
    /// Internal server error.
    Internal(String),
    /// Error with context chain for better debugging.
    WithContext {
        /// The underlying source of the error.
        source: Box<AppError>,
        /// Additional context message.
        context: String,
    },
}

impl AppError {
    pub fn missing_field(field: &str) -> Self {
        AppError::Validation {
            kind: ValidationKind::MissingRequiredField,
            message: format!("missing_required_field: '{}' is required", field),
        }
    }

    pub fn invalid_field(field: &str, reason: impl fmt::Display) -> Self {
        AppError::Validation {
            kind: ValidationKind::InvalidField,
            message: format!("invalid_field: '{}' {}", field, reason),
        }
    }

    /// Whether this error says the provider itself is unhealthy (transport
    /// failure, timeout, 5xx). Requests the provider refused do not count.
    pub fn is_provider_fault(&self) -> bool {
        !matches!(self.root(), AppError::ProviderRejected(_))
    }

    /// Strips any context wrappers and returns the innermost error.
    pub fn root(&self) -> &AppError {
        match self {
            AppError::WithContext { source, .. } => source.root(),
            other => other,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation { message, .. } => write!(f, "Validation error: {}", message),
            AppError::Provider(msg) => write!(f, "Provider error: {}", msg),
            AppError::ProviderRejected(msg) => write!(f, "Provider rejected request: {}", msg),
            AppError::Extraction(msg) => write!(f, "Extraction error: {}", msg),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
            AppError::WithContext { source, context } => {
                write!(f, "{}: {}", context, source)
            }
        }
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    /// Maps each error variant to an HTTP status code and a `{"error": ...}` body.
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::Validation { message, .. } => {
                tracing::warn!("Rejected search request: {}", message);
                (StatusCode::BAD_REQUEST, message.clone())
            }
            AppError::Provider(msg) => {
                tracing::error!("Flight provider error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
            AppError::ProviderRejected(msg) => {
                tracing::warn!("Flight provider rejected request: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg.clone())
            }
            AppError::Extraction(msg) => {
                tracing::error!("Offer extraction error escaped the pipeline: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Unauthorized(msg) => {
                tracing::warn!("Unauthorized access: {}", msg);
                (StatusCode::UNAUTHORIZED, "Unauthorized".to_string())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::WithContext { source, context } => {
                tracing::error!("Error with context: {} -> {}", context, source);
                return (*source.clone()).into_response();
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::Provider(format!("flight provider timed out: {}", err))
        } else {
            AppError::Provider(err.to_string())
        }
    }
}

/// Extension trait for adding context to errors.
/// Similar to `anyhow::Context` but for our `AppError` type.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T, AppError>;

    /// Add context lazily (only evaluated on error).
    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T, AppError> {
    fn context(self, context: impl Into<String>) -> Result<T, AppError> {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e),
            context: context.into(),
        })
    }

    fn with_context<F>(self, f: F) -> Result<T, AppError>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e),
            context: f(),
        })
    }
}
