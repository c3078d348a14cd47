use std::sync::Arc;

use fxtrend_core::{
    CannedHttpClient, CurrencyCode, Endpoint, FixtureProvider, FrankfurterAdapter, HistoryRequest,
    HttpResponse, LatestRequest, OpenErApiAdapter, ProviderId, RateDate, RatePoint, RateProvider,
    RetryConfig, Series, SourceErrorKind,
};

const FRANKFURTER_RANGE: &str = r#"{"rates": {
    "2024-05-08": {"ILS": 4.03},
    "2024-05-06": {"ILS": 4.01},
    "2024-05-07": {"ILS": 4.02}
}}"#;

const FRANKFURTER_LATEST: &str = r#"{"date": "2024-05-08", "rates": {"ILS": 4.03}}"#;

const OPEN_ER_API_LATEST: &str =
    r#"{"result": "success", "time_last_update_unix": 1715126551, "rates": {"ILS": 4.03}}"#;

struct ProviderCase {
    id: ProviderId,
    provider: Arc<dyn RateProvider>,
    client: Option<Arc<CannedHttpClient>>,
}

fn code(value: &str) -> CurrencyCode {
    CurrencyCode::parse(value).expect("valid code")
}

fn date(value: &str) -> RateDate {
    RateDate::parse(value).expect("valid date")
}

fn provider_cases() -> Vec<ProviderCase> {
    let frankfurter_client = Arc::new(
        CannedHttpClient::new()
            .respond("https://fx.test/latest", HttpResponse::ok_json(FRANKFURTER_LATEST))
            .respond("https://fx.test/", HttpResponse::ok_json(FRANKFURTER_RANGE)),
    );
    let open_er_api_client = Arc::new(
        CannedHttpClient::new()
            .respond("https://er.test/v6/latest/EUR", HttpResponse::ok_json(OPEN_ER_API_LATEST)),
    );
    let fixture_history = Series::new(vec![
        RatePoint::new(date("2024-05-06"), 4.01).expect("valid point"),
        RatePoint::new(date("2024-05-08"), 4.03).expect("valid point"),
    ])
    .expect("ordered series");

    vec![
        ProviderCase {
            id: ProviderId::Frankfurter,
            provider: Arc::new(
                FrankfurterAdapter::with_http_client(frankfurter_client.clone())
                    .with_base_url("https://fx.test")
                    .with_retry(RetryConfig::no_retry()),
            ),
            client: Some(frankfurter_client),
        },
        ProviderCase {
            id: ProviderId::OpenErApi,
            provider: Arc::new(
                OpenErApiAdapter::with_http_client(open_er_api_client.clone())
                    .with_base_url("https://er.test/v6")
                    .with_retry(RetryConfig::no_retry()),
            ),
            client: Some(open_er_api_client),
        },
        ProviderCase {
            id: ProviderId::Fixture,
            provider: Arc::new(
                FixtureProvider::new()
                    .with_history(code("EUR"), fixture_history)
                    .with_latest(
                        code("EUR"),
                        RatePoint::new(date("2024-05-08"), 4.03)
                            .expect("valid point"),
                    ),
            ),
            client: None,
        },
    ]
}

fn history_request() -> HistoryRequest {
    HistoryRequest::new(code("EUR"), code("ILS"), date("2024-05-01"), date("2024-05-08"))
        .expect("valid request")
}

fn latest_request() -> LatestRequest {
    LatestRequest::new(code("EUR"), code("ILS")).expect("valid request")
}

#[tokio::test]
async fn provider_ids_match_their_adapters() {
    for case in provider_cases() {
        assert_eq!(case.provider.id(), case.id);
    }
}

#[tokio::test]
async fn every_provider_serves_latest() {
    for case in provider_cases() {
        assert!(case.provider.capabilities().supports(Endpoint::Latest));

        let point = case
            .provider
            .latest(latest_request())
            .await
            .unwrap_or_else(|e| panic!("{} latest failed: {e}", case.id))
            .unwrap_or_else(|| panic!("{} returned no latest point", case.id));
        assert_eq!(point.date, date("2024-05-08"), "{}", case.id);
        assert_eq!(point.rate, 4.03, "{}", case.id);
    }
}

#[tokio::test]
async fn supported_history_is_ordered_and_within_range() {
    for case in provider_cases() {
        if !case.provider.capabilities().supports(Endpoint::History) {
            continue;
        }

        let req = history_request();
        let series = case
            .provider
            .history(req.clone())
            .await
            .unwrap_or_else(|e| panic!("{} history failed: {e}", case.id));

        assert!(!series.is_empty(), "{} returned no history", case.id);
        for pair in series.points().windows(2) {
            assert!(pair[0].date < pair[1].date, "{} history out of order", case.id);
        }
        for point in series.points() {
            assert!(point.date >= req.start && point.date <= req.end);
            assert!(point.rate.is_finite() && point.rate > 0.0);
        }
    }
}

#[tokio::test]
async fn unsupported_history_fails_without_upstream_calls() {
    for case in provider_cases() {
        if case.provider.capabilities().supports(Endpoint::History) {
            continue;
        }

        let error = case
            .provider
            .history(history_request())
            .await
            .expect_err("unsupported endpoint must fail");
        assert_eq!(error.kind(), SourceErrorKind::UnsupportedEndpoint, "{}", case.id);

        if let Some(client) = &case.client {
            assert!(client.recorded_requests().is_empty(), "{}", case.id);
        }
    }
}
