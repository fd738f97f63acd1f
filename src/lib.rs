//! RoutePilot Agent Library
//!
//! Flight search service behind a voice assistant: normalizes search requests
//! (direct or tool-call webhooks), queries the flight-offers provider, and
//! returns routes ranked and summarized for reading out loud.
//!
//! # Modules
//!
//! - `api`: HTTP routes.
//! - `assistant`: Voice-assistant definition and tool schema.
//! - `circuit_breaker`: Circuit breaker for provider calls.
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `extractor`: Raw provider offer → route.
//! - `handlers`: HTTP request handlers.
//! - `models`: Search, route, and raw offer models.
//! - `normalizer`: Request body / tool-call envelope → search request.
//! - `provider_client`: Flight-offers provider trait and HTTP client.
//! - `query`: Provider query parameters.
//! - `ranking`: Extract, score, summarize, and sort offers.
//! - `scorer`: Route desirability score.
//! - `services`: End-to-end search service.
//! - `summarizer`: One-sentence route descriptions.
//! - `webhook_models`: Voice-assistant tool-call envelope.

pub mod api;
pub mod assistant;
pub mod circuit_breaker;
pub mod config;
pub mod errors;
pub mod extractor;
pub mod handlers;
pub mod models;
pub mod normalizer;
pub mod provider_client;
pub mod query;
pub mod ranking;
pub mod scorer;
pub mod services;
pub mod summarizer;
pub mod webhook_models;
