use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use super::{checked_point, fetch_json, trim_base_url, Fetched};
use crate::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig};
use crate::data_source::{
    CapabilitySet, HistoryRequest, LatestRequest, ProviderFuture, RateProvider,
};
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient, DEFAULT_TIMEOUT_MS};
use crate::retry::RetryConfig;
use crate::{ProviderId, RatePoint, Series};

pub const FRANKFURTER_BASE_URL: &str = "https://api.frankfurter.app";

/// Adapter for the Frankfurter ECB reference-rate API.
///
/// History: `GET /{start}..{end}?from={base}&to={quote}`.
/// Latest: `GET /latest?from={base}&to={quote}`, dated by the publication
/// day Frankfurter reports.
#[derive(Clone)]
pub struct FrankfurterAdapter {
    base_url: String,
    http_client: Arc<dyn HttpClient>,
    circuit_breaker: Arc<CircuitBreaker>,
    retry: RetryConfig,
    timeout_ms: u64,
}

impl Default for FrankfurterAdapter {
    fn default() -> Self {
        Self::with_http_client(Arc::new(ReqwestHttpClient::default()))
    }
}

impl FrankfurterAdapter {
    pub fn with_http_client(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            base_url: String::from(FRANKFURTER_BASE_URL),
            http_client,
            circuit_breaker: Arc::new(CircuitBreaker::new(
                ProviderId::Frankfurter.as_str(),
                CircuitBreakerConfig::default(),
            )),
            retry: RetryConfig::default(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = trim_base_url(base_url);
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    fn history_url(&self, req: &HistoryRequest) -> String {
        format!(
            "{}/{}..{}?from={}&to={}",
            self.base_url,
            req.start,
            req.end,
            urlencoding::encode(req.base.as_str()),
            urlencoding::encode(req.quote.as_str()),
        )
    }

    fn latest_url(&self, req: &LatestRequest) -> String {
        format!(
            "{}/latest?from={}&to={}",
            self.base_url,
            urlencoding::encode(req.base.as_str()),
            urlencoding::encode(req.quote.as_str()),
        )
    }

    async fn fetch_history(&self, req: HistoryRequest) -> Result<Series, crate::SourceError> {
        let request = HttpRequest::get(self.history_url(&req)).with_timeout_ms(self.timeout_ms);
        let payload: FrankfurterRangeResponse = match fetch_json(
            ProviderId::Frankfurter,
            self.http_client.as_ref(),
            &self.circuit_breaker,
            &self.retry,
            request,
        )
        .await?
        {
            Fetched::Body(payload) => payload,
            Fetched::NotFound => {
                debug!(base = %req.base, "frankfurter has no rates for range");
                return Ok(Series::empty());
            }
        };

        let points = payload
            .rates
            .iter()
            .filter_map(|(date, quotes)| {
                let rate = quotes.get(req.quote.as_str())?;
                checked_point(ProviderId::Frankfurter, date, *rate)
            })
            // Frankfurter anchors a range starting on a closed day to the
            // previous publication day.
            .filter(|point| point.date >= req.start && point.date <= req.end);

        Ok(Series::from_unordered(points))
    }

    async fn fetch_latest(
        &self,
        req: LatestRequest,
    ) -> Result<Option<RatePoint>, crate::SourceError> {
        let request = HttpRequest::get(self.latest_url(&req)).with_timeout_ms(self.timeout_ms);
        let payload: FrankfurterLatestResponse = match fetch_json(
            ProviderId::Frankfurter,
            self.http_client.as_ref(),
            &self.circuit_breaker,
            &self.retry,
            request,
        )
        .await?
        {
            Fetched::Body(payload) => payload,
            Fetched::NotFound => return Ok(None),
        };

        Ok(payload
            .rates
            .get(req.quote.as_str())
            .and_then(|rate| checked_point(ProviderId::Frankfurter, &payload.date, *rate)))
    }
}

impl RateProvider for FrankfurterAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Frankfurter
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::full()
    }

    fn history<'a>(&'a self, req: HistoryRequest) -> ProviderFuture<'a, Series> {
        Box::pin(self.fetch_history(req))
    }

    fn latest<'a>(&'a self, req: LatestRequest) -> ProviderFuture<'a, Option<RatePoint>> {
        Box::pin(self.fetch_latest(req))
    }
}

#[derive(Debug, Deserialize)]
struct FrankfurterRangeResponse {
    #[serde(default)]
    rates: BTreeMap<String, BTreeMap<String, f64>>,
}

#[derive(Debug, Deserialize)]
struct FrankfurterLatestResponse {
    date: String,
    #[serde(default)]
    rates: BTreeMap<String, f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_source::SourceErrorKind;
    use crate::http_client::{CannedHttpClient, HttpError, HttpResponse};
    use crate::{CurrencyCode, RateDate};

    const RANGE_BODY: &str = r#"{
        "amount": 1.0,
        "base": "EUR",
        "start_date": "2024-05-03",
        "end_date": "2024-05-08",
        "rates": {
            "2024-05-03": {"ILS": 3.99},
            "2024-05-06": {"ILS": 4.01},
            "2024-05-07": {"ILS": 4.02},
            "2024-05-08": {"ILS": 4.03}
        }
    }"#;

    fn code(value: &str) -> CurrencyCode {
        CurrencyCode::parse(value).expect("code")
    }

    fn date(value: &str) -> RateDate {
        RateDate::parse(value).expect("date")
    }

    fn adapter(client: CannedHttpClient) -> (FrankfurterAdapter, Arc<CannedHttpClient>) {
        let client = Arc::new(client);
        let adapter = FrankfurterAdapter::with_http_client(client.clone())
            .with_base_url("https://fx.test/")
            .with_retry(RetryConfig::no_retry());
        (adapter, client)
    }

    #[tokio::test]
    async fn history_builds_range_url_and_parses_rates_in_order() {
        let (adapter, client) = adapter(
            CannedHttpClient::new().respond("https://fx.test/", HttpResponse::ok_json(RANGE_BODY)),
        );
        let req = HistoryRequest::new(
            code("EUR"),
            code("ILS"),
            date("2024-05-04"),
            date("2024-05-08"),
        )
        .expect("request");

        let series = adapter.history(req).await.expect("history");

        let requests = client.recorded_requests();
        assert_eq!(
            requests[0].url,
            "https://fx.test/2024-05-04..2024-05-08?from=EUR&to=ILS"
        );
        // 2024-05-03 lies before the requested start and is dropped.
        let dates: Vec<String> = series.points().iter().map(|p| p.date.format_iso()).collect();
        assert_eq!(dates, ["2024-05-06", "2024-05-07", "2024-05-08"]);
        assert_eq!(series.last().map(|p| p.rate), Some(4.03));
    }

    #[tokio::test]
    async fn history_skips_invalid_points() {
        let body = r#"{"rates": {
            "2024-05-06": {"ILS": 4.01},
            "2024-05-07": {"ILS": -1.0},
            "bogus": {"ILS": 4.0},
            "2024-05-08": {"USD": 1.08}
        }}"#;
        let (adapter, _) =
            adapter(CannedHttpClient::new().respond("https://fx.test/", HttpResponse::ok_json(body)));
        let req = HistoryRequest::new(
            code("EUR"),
            code("ILS"),
            date("2024-05-01"),
            date("2024-05-08"),
        )
        .expect("request");

        let series = adapter.history(req).await.expect("history");
        assert_eq!(series.len(), 1);
    }

    #[tokio::test]
    async fn history_not_found_is_empty_series() {
        let (adapter, _) = adapter(CannedHttpClient::new().respond(
            "https://fx.test/",
            HttpResponse::with_status(404, r#"{"message":"not found"}"#),
        ));
        let req = HistoryRequest::new(
            code("EUR"),
            code("ILS"),
            date("2024-05-01"),
            date("2024-05-08"),
        )
        .expect("request");

        assert!(adapter.history(req).await.expect("empty").is_empty());
    }

    #[tokio::test]
    async fn latest_uses_reported_publication_day() {
        let body = r#"{"amount":1.0,"base":"USD","date":"2024-05-08","rates":{"ILS":3.71}}"#;
        let (adapter, client) = adapter(
            CannedHttpClient::new().respond("https://fx.test/latest", HttpResponse::ok_json(body)),
        );

        let point = adapter
            .latest(LatestRequest::new(code("USD"), code("ILS")).expect("request"))
            .await
            .expect("latest")
            .expect("point");

        assert_eq!(point.date, date("2024-05-08"));
        assert_eq!(point.rate, 3.71);
        assert_eq!(
            client.recorded_requests()[0].url,
            "https://fx.test/latest?from=USD&to=ILS"
        );
    }

    #[tokio::test]
    async fn transport_and_parse_failures_are_classified() {
        let (adapter, _) = adapter(
            CannedHttpClient::new()
                .fail("https://fx.test/latest", HttpError::timeout("slow"))
                .respond("https://fx.test/", HttpResponse::ok_json("<html>")),
        );

        let err = adapter
            .latest(LatestRequest::new(code("USD"), code("ILS")).expect("request"))
            .await
            .expect_err("timeout");
        assert_eq!(err.kind(), SourceErrorKind::Timeout);

        let req = HistoryRequest::new(
            code("EUR"),
            code("ILS"),
            date("2024-05-01"),
            date("2024-05-08"),
        )
        .expect("request");
        let err = adapter.history(req).await.expect_err("bad body");
        assert_eq!(err.kind(), SourceErrorKind::InvalidResponse);
    }
}
