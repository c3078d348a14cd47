//! Upstream rate provider adapters.

mod fixture;
mod frankfurter;
mod open_er_api;

pub use fixture::FixtureProvider;
pub use frankfurter::FrankfurterAdapter;
pub use open_er_api::OpenErApiAdapter;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::circuit_breaker::CircuitBreaker;
use crate::data_source::SourceError;
use crate::http_client::{HttpClient, HttpErrorKind, HttpRequest};
use crate::retry::{execute_with_retry, RetryConfig};
use crate::{ProviderId, RateDate, RatePoint};

/// Outcome of a guarded upstream GET.
enum Fetched<T> {
    Body(T),
    NotFound,
}

/// Runs `request` through the circuit breaker and retry policy and decodes
/// a JSON body. 404 is reported separately so adapters can map it to "no
/// data" instead of an outage.
async fn fetch_json<T: DeserializeOwned>(
    provider: ProviderId,
    http_client: &dyn HttpClient,
    circuit_breaker: &CircuitBreaker,
    retry: &RetryConfig,
    request: HttpRequest,
) -> Result<Fetched<T>, SourceError> {
    if !circuit_breaker.allow_request() {
        return Err(SourceError::unavailable(format!(
            "{provider} circuit breaker is open"
        )));
    }

    debug!(%provider, url = %request.url, "requesting upstream rates");
    let response = match execute_with_retry(http_client, request, retry).await {
        Ok(response) => response,
        Err(error) => {
            circuit_breaker.record_failure();
            return Err(match error.kind() {
                HttpErrorKind::Timeout => {
                    SourceError::timeout(format!("{provider} timed out: {}", error.message()))
                }
                _ => SourceError::unavailable(format!(
                    "{provider} transport error: {}",
                    error.message()
                )),
            });
        }
    };

    if response.status == 404 {
        circuit_breaker.record_success();
        return Ok(Fetched::NotFound);
    }
    if !response.is_success() {
        circuit_breaker.record_failure();
        return Err(SourceError::unavailable(format!(
            "{provider} returned status {}",
            response.status
        )));
    }
    circuit_breaker.record_success();

    serde_json::from_str(&response.body)
        .map(Fetched::Body)
        .map_err(|e| SourceError::invalid_response(format!("failed to parse {provider} response: {e}")))
}

/// Builds a point from upstream fields, logging and dropping invalid ones.
fn checked_point(provider: ProviderId, date: &str, rate: f64) -> Option<RatePoint> {
    let point = RateDate::parse(date).and_then(|date| RatePoint::new(date, rate));
    match point {
        Ok(point) => Some(point),
        Err(error) => {
            warn!(%provider, date, rate, %error, "skipping invalid upstream rate");
            None
        }
    }
}

fn trim_base_url(url: impl Into<String>) -> String {
    let mut url = url.into();
    while url.ends_with('/') {
        url.pop();
    }
    url
}
