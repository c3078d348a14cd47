//! # fxtrend-core
//!
//! Exchange-rate trend pipeline: fetches daily rates for two base currencies
//! against one quote currency, reconciles history with the latest quote,
//! classifies each currency's trend, aligns both series on shared dates and
//! thins the result for charting.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Upstream adapters (Frankfurter, ExchangeRate-API, fixtures) |
//! | [`circuit_breaker`] | Circuit breaker for upstream calls |
//! | [`config`] | `FXTREND_*` environment configuration |
//! | [`data_source`] | Provider trait and request types |
//! | [`domain`] | Currency codes, dates, periods, rate series |
//! | [`error`] | Core error types |
//! | [`http_client`] | HTTP client abstraction |
//! | [`pipeline`] | Merge, trend, align, decimate and orchestration |
//! | [`rate_source`] | Failure-absorbing fetch boundary |
//! | [`retry`] | Retry with backoff |
//! | [`source`] | Provider identifiers |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use fxtrend_core::{FxtrendConfig, RateSource, TrendPipeline};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = FxtrendConfig::from_env()?;
//!     let pipeline = TrendPipeline::new(RateSource::from_config(&config));
//!
//!     let snapshot = pipeline.compute(config.default_period, &config.pair).await;
//!     println!("{}", snapshot.to_json()?);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌──────────────────┐
//! │  TrendPipeline  │────▶│ SnapshotPublisher│
//! └────────┬────────┘     └──────────────────┘
//!          │ 2 × (history, latest)
//!          ▼
//! ┌─────────────────┐
//! │   RateSource    │  timeouts, failures → empty
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │  RateProvider   │────▶│ Retry / Breaker  │
//! │  (adapters)     │     │ HTTP Client      │
//! └─────────────────┘     └──────────────────┘
//! ```
//!
//! Upstream failures never surface to callers of [`TrendPipeline`]; they
//! degrade to empty series and `None` summaries and are logged through
//! `tracing`.

pub mod adapters;
pub mod circuit_breaker;
pub mod config;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod pipeline;
pub mod rate_source;
pub mod retry;
pub mod source;

// Adapter implementations
pub use adapters::{FixtureProvider, FrankfurterAdapter, OpenErApiAdapter};

// Circuit breaker
pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};

// Configuration
pub use config::FxtrendConfig;

// Provider trait and types
pub use data_source::{
    CapabilitySet, Endpoint, HistoryRequest, LatestRequest, ProviderFuture, RateProvider,
    SourceError, SourceErrorKind,
};

// Domain models
pub use domain::{
    CombinedPoint, CurrencyCode, CurrencyPair, CurrencySummary, Period, RateDate, RatePoint,
    Series, Trend,
};

// Error types
pub use error::{CoreError, ValidationError};

// HTTP client types
pub use http_client::{
    CannedHttpClient, HttpClient, HttpError, HttpErrorKind, HttpRequest, HttpResponse,
    ReqwestHttpClient,
};

// Pipeline
pub use pipeline::{
    align, classify, decimate, merge_latest, summarize, DashboardSnapshot, FetchedRates,
    RequestTag, SingleCurrencyView, SnapshotPublisher, TrendPipeline,
};

// Fetch boundary
pub use rate_source::RateSource;

// Retry logic
pub use retry::{Backoff, RetryConfig};

// Source identifiers
pub use source::ProviderId;
