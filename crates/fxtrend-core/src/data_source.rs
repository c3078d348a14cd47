//! Rate provider trait and request types.
//!
//! Every upstream adapter implements [`RateProvider`]. Adapters report
//! failures as [`SourceError`]; the [`RateSource`](crate::RateSource)
//! boundary turns those into "no data" so nothing past it has to deal with
//! upstream errors.
//!
//! | Endpoint | Request | Response |
//! |----------|---------|----------|
//! | History | [`HistoryRequest`] | [`Series`] |
//! | Latest | [`LatestRequest`] | `Option<RatePoint>` |

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::{CurrencyCode, Period, ProviderId, RateDate, RatePoint, Series};

/// Data endpoint type used for capability checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    History,
    Latest,
}

impl Endpoint {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::History => "history",
            Self::Latest => "latest",
        }
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Supported endpoint matrix for a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilitySet {
    pub history: bool,
    pub latest: bool,
}

impl CapabilitySet {
    pub const fn new(history: bool, latest: bool) -> Self {
        Self { history, latest }
    }

    pub const fn full() -> Self {
        Self::new(true, true)
    }

    pub const fn supports(self, endpoint: Endpoint) -> bool {
        match endpoint {
            Endpoint::History => self.history,
            Endpoint::Latest => self.latest,
        }
    }
}

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    UnsupportedEndpoint,
    Unavailable,
    Timeout,
    InvalidResponse,
    InvalidRequest,
}

/// Structured error raised by provider adapters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
}

impl SourceError {
    pub fn unsupported_endpoint(provider: ProviderId, endpoint: Endpoint) -> Self {
        Self {
            kind: SourceErrorKind::UnsupportedEndpoint,
            message: format!("endpoint '{endpoint}' is not supported by '{provider}'"),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Timeout,
            message: message.into(),
        }
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidResponse,
            message: message.into(),
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for SourceError {}

/// Ranged history query for one base currency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRequest {
    pub base: CurrencyCode,
    pub quote: CurrencyCode,
    pub start: RateDate,
    pub end: RateDate,
}

impl HistoryRequest {
    pub fn new(
        base: CurrencyCode,
        quote: CurrencyCode,
        start: RateDate,
        end: RateDate,
    ) -> Result<Self, SourceError> {
        if start > end {
            return Err(SourceError::invalid_request(format!(
                "history start {start} is after end {end}"
            )));
        }
        if base == quote {
            return Err(SourceError::invalid_request(format!(
                "base and quote currency are both {base}"
            )));
        }

        Ok(Self {
            base,
            quote,
            start,
            end,
        })
    }

    /// The window `[today - period, today]`.
    pub fn trailing(
        base: CurrencyCode,
        quote: CurrencyCode,
        period: Period,
        today: RateDate,
    ) -> Result<Self, SourceError> {
        Self::new(base, quote, today.days_before(period.days()), today)
    }
}

/// Most recent rate query for one base currency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatestRequest {
    pub base: CurrencyCode,
    pub quote: CurrencyCode,
}

impl LatestRequest {
    pub fn new(base: CurrencyCode, quote: CurrencyCode) -> Result<Self, SourceError> {
        if base == quote {
            return Err(SourceError::invalid_request(format!(
                "base and quote currency are both {base}"
            )));
        }
        Ok(Self { base, quote })
    }
}

/// Boxed future returned by provider calls.
pub type ProviderFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, SourceError>> + Send + 'a>>;

/// Contract every upstream rate adapter implements.
///
/// Implementations must return history points in strictly increasing date
/// order (guaranteed by [`Series`]) and must not synthesize days the
/// upstream has no quote for.
pub trait RateProvider: Send + Sync {
    /// Returns the provider identifier.
    fn id(&self) -> ProviderId;

    /// Returns the set of supported endpoints.
    fn capabilities(&self) -> CapabilitySet;

    /// Fetches the rate of `req.base` in `req.quote` for every day in
    /// `[req.start, req.end]` the upstream has published.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the endpoint is unsupported, the
    /// upstream cannot be reached, or its payload cannot be parsed.
    fn history<'a>(&'a self, req: HistoryRequest) -> ProviderFuture<'a, Series>;

    /// Fetches the most recent rate, dated by the upstream's own freshness
    /// timestamp. `Ok(None)` means the upstream answered without a rate for
    /// the quote currency.
    ///
    /// # Errors
    ///
    /// Same conditions as [`history`](RateProvider::history).
    fn latest<'a>(&'a self, req: LatestRequest) -> ProviderFuture<'a, Option<RatePoint>>;
}
