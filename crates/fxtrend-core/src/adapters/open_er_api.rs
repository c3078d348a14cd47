use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;
use tracing::warn;

use super::{fetch_json, trim_base_url, Fetched};
use crate::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig};
use crate::data_source::{
    CapabilitySet, Endpoint, HistoryRequest, LatestRequest, ProviderFuture, RateProvider,
    SourceError,
};
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient, DEFAULT_TIMEOUT_MS};
use crate::retry::RetryConfig;
use crate::{ProviderId, RateDate, RatePoint, Series};

pub const OPEN_ER_API_BASE_URL: &str = "https://open.er-api.com/v6";

/// Adapter for the open-access ExchangeRate-API latest endpoint.
///
/// `GET /latest/{base}` returns every quote currency at once together with
/// `time_last_update_unix`; the point is dated by that timestamp's UTC day.
#[derive(Clone)]
pub struct OpenErApiAdapter {
    base_url: String,
    http_client: Arc<dyn HttpClient>,
    circuit_breaker: Arc<CircuitBreaker>,
    retry: RetryConfig,
    timeout_ms: u64,
}

impl Default for OpenErApiAdapter {
    fn default() -> Self {
        Self::with_http_client(Arc::new(ReqwestHttpClient::default()))
    }
}

impl OpenErApiAdapter {
    pub fn with_http_client(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            base_url: String::from(OPEN_ER_API_BASE_URL),
            http_client,
            circuit_breaker: Arc::new(CircuitBreaker::new(
                ProviderId::OpenErApi.as_str(),
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

    async fn fetch_latest(&self, req: LatestRequest) -> Result<Option<RatePoint>, SourceError> {
        let url = format!(
            "{}/latest/{}",
            self.base_url,
            urlencoding::encode(req.base.as_str())
        );
        let request = HttpRequest::get(url).with_timeout_ms(self.timeout_ms);

        let payload: OpenErApiLatestResponse = match fetch_json(
            ProviderId::OpenErApi,
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

        if payload.result != "success" {
            return Err(SourceError::unavailable(format!(
                "openerapi reported '{}': {}",
                payload.result,
                payload.error_type.as_deref().unwrap_or("unknown error")
            )));
        }

        let Some(timestamp) = payload.time_last_update_unix else {
            return Err(SourceError::invalid_response(
                "openerapi response has no time_last_update_unix",
            ));
        };
        let date = RateDate::from_unix_timestamp(timestamp)
            .map_err(|e| SourceError::invalid_response(e.to_string()))?;

        let Some(rate) = payload.rates.get(req.quote.as_str()).copied() else {
            return Ok(None);
        };
        match RatePoint::new(date, rate) {
            Ok(point) => Ok(Some(point)),
            Err(error) => {
                warn!(provider = %ProviderId::OpenErApi, %error, rate, "skipping invalid upstream rate");
                Ok(None)
            }
        }
    }
}

impl RateProvider for OpenErApiAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::OpenErApi
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::new(false, true)
    }

    fn history<'a>(&'a self, _req: HistoryRequest) -> ProviderFuture<'a, Series> {
        Box::pin(async move {
            Err(SourceError::unsupported_endpoint(
                ProviderId::OpenErApi,
                Endpoint::History,
            ))
        })
    }

    fn latest<'a>(&'a self, req: LatestRequest) -> ProviderFuture<'a, Option<RatePoint>> {
        Box::pin(self.fetch_latest(req))
    }
}

#[derive(Debug, Deserialize)]
struct OpenErApiLatestResponse {
    result: String,
    #[serde(rename = "error-type")]
    error_type: Option<String>,
    time_last_update_unix: Option<i64>,
    #[serde(default)]
    rates: BTreeMap<String, f64>,
}
