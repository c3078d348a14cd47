//! The failure-absorbing boundary between upstream providers and the
//! pipeline.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::{FxtrendConfig, DEFAULT_FETCH_TIMEOUT_MS};
use crate::data_source::{Endpoint, HistoryRequest, LatestRequest, RateProvider, SourceError};
use crate::{CurrencyCode, Period, RateDate, RatePoint, Series};

/// Fetches history and latest rates for one quote currency.
///
/// Never fails: an upstream error, an unsupported endpoint or a call that
/// outlives `timeout` yields an empty [`Series`] or `None`, logged at `warn`.
#[derive(Clone)]
pub struct RateSource {
    history: Arc<dyn RateProvider>,
    latest: Arc<dyn RateProvider>,
    quote: CurrencyCode,
    timeout: Duration,
    today: Option<RateDate>,
}

impl RateSource {
    pub fn new(
        history: Arc<dyn RateProvider>,
        latest: Arc<dyn RateProvider>,
        quote: CurrencyCode,
    ) -> Self {
        Self {
            history,
            latest,
            quote,
            timeout: Duration::from_millis(DEFAULT_FETCH_TIMEOUT_MS),
            today: None,
        }
    }

    /// Wires the configured upstream adapters.
    pub fn from_config(config: &FxtrendConfig) -> Self {
        Self::new(
            Arc::new(config.history_adapter()),
            config.latest_adapter(),
            config.quote.clone(),
        )
        .with_timeout(config.fetch_timeout)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Fixes "today" instead of reading the UTC clock.
    pub fn pinned_to(mut self, today: RateDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn quote(&self) -> &CurrencyCode {
        &self.quote
    }

    pub fn today(&self) -> RateDate {
        self.today.unwrap_or_else(RateDate::today_utc)
    }

    /// Rates of `base` for every published day in `[today - period, today]`.
    pub async fn fetch_history(&self, period: Period, base: &CurrencyCode) -> Series {
        let provider = self.history.as_ref();
        let outcome = match HistoryRequest::trailing(
            base.clone(),
            self.quote.clone(),
            period,
            self.today(),
        ) {
            Ok(req) => {
                self.bounded(provider, Endpoint::History, provider.history(req))
                    .await
            }
            Err(error) => Err(error),
        };

        match outcome {
            Ok(series) => {
                debug!(%base, points = series.len(), period = period.days(), "history fetched");
                series
            }
            Err(error) => {
                warn!(
                    %base,
                    provider = %provider.id(),
                    kind = ?error.kind(),
                    %error,
                    "history unavailable; continuing with empty series"
                );
                Series::empty()
            }
        }
    }

    /// Most recent rate of `base`, if the latest upstream has one.
    pub async fn fetch_latest(&self, base: &CurrencyCode) -> Option<RatePoint> {
        let provider = self.latest.as_ref();
        let outcome = match LatestRequest::new(base.clone(), self.quote.clone()) {
            Ok(req) => {
                self.bounded(provider, Endpoint::Latest, provider.latest(req))
                    .await
            }
            Err(error) => Err(error),
        };

        match outcome {
            Ok(point) => point,
            Err(error) => {
                warn!(
                    %base,
                    provider = %provider.id(),
                    kind = ?error.kind(),
                    %error,
                    "latest rate unavailable"
                );
                None
            }
        }
    }

    async fn bounded<T>(
        &self,
        provider: &dyn RateProvider,
        endpoint: Endpoint,
        call: impl Future<Output = Result<T, SourceError>>,
    ) -> Result<T, SourceError> {
        if !provider.capabilities().supports(endpoint) {
            return Err(SourceError::unsupported_endpoint(provider.id(), endpoint));
        }

        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(SourceError::timeout(format!(
                "{} {endpoint} call exceeded {}ms",
                provider.id(),
                self.timeout.as_millis()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{FixtureProvider, OpenErApiAdapter};
    use crate::http_client::CannedHttpClient;

    fn code(value: &str) -> CurrencyCode {
        CurrencyCode::parse(value).expect("code")
    }

    fn point(date: &str, rate: f64) -> RatePoint {
        RatePoint::new(RateDate::parse(date).expect("date"), rate).expect("point")
    }

    #[tokio::test]
    async fn failures_become_empty_data() {
        let provider = Arc::new(FixtureProvider::new().failing(code("EUR")));
        let source = RateSource::new(provider.clone(), provider, code("ILS"))
            .pinned_to(RateDate::parse("2024-05-08").expect("date"));

        assert!(source.fetch_history(Period::OneWeek, &code("EUR")).await.is_empty());
        assert_eq!(source.fetch_latest(&code("EUR")).await, None);
    }

    #[tokio::test]
    async fn history_window_ends_today() {
        let series = Series::new(vec![
            point("2024-04-30", 3.9),
            point("2024-05-01", 4.0),
            point("2024-05-08", 4.1),
            point("2024-05-09", 4.2),
        ])
        .expect("series");
        let provider = Arc::new(FixtureProvider::new().with_history(code("EUR"), series));
        let source = RateSource::new(provider.clone(), provider, code("ILS"))
            .pinned_to(RateDate::parse("2024-05-08").expect("date"));

        let history = source.fetch_history(Period::OneWeek, &code("EUR")).await;
        let dates: Vec<String> = history.points().iter().map(|p| p.date.format_iso()).collect();
        assert_eq!(dates, ["2024-05-01", "2024-05-08"]);
    }

    #[tokio::test]
    async fn hung_provider_is_cut_off_by_timeout() {
        let provider = Arc::new(
            FixtureProvider::new()
                .with_latest(code("EUR"), point("2024-05-08", 4.0))
                .with_delay(Duration::from_secs(30)),
        );
        let source = RateSource::new(provider.clone(), provider, code("ILS"))
            .with_timeout(Duration::from_millis(20));

        let started = std::time::Instant::now();
        assert_eq!(source.fetch_latest(&code("EUR")).await, None);
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn unsupported_endpoint_is_not_called() {
        let client = Arc::new(CannedHttpClient::new());
        let latest_only = Arc::new(OpenErApiAdapter::with_http_client(client.clone()));
        let source = RateSource::new(latest_only.clone(), latest_only, code("ILS"));

        assert!(source.fetch_history(Period::OneWeek, &code("EUR")).await.is_empty());
        assert!(client.recorded_requests().is_empty());
    }

    #[tokio::test]
    async fn quote_as_base_is_absorbed() {
        let provider = Arc::new(FixtureProvider::new());
        let source = RateSource::new(provider.clone(), provider.clone(), code("ILS"));

        assert_eq!(source.fetch_latest(&code("ILS")).await, None);
        assert_eq!(provider.calls(), 0);
    }
}
