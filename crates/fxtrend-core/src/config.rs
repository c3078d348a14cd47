//! Runtime configuration.
//!
//! Defaults target the public Frankfurter and ExchangeRate-API endpoints
//! with ILS as the quote currency. Every field can be overridden through an
//! `FXTREND_*` environment variable:
//!
//! | Variable | Default |
//! |----------|---------|
//! | `FXTREND_QUOTE_CURRENCY` | `ILS` |
//! | `FXTREND_BASE_CURRENCIES` | `EUR,USD` |
//! | `FXTREND_DEFAULT_PERIOD_DAYS` | `60` |
//! | `FXTREND_REQUEST_TIMEOUT_MS` | `3000` |
//! | `FXTREND_FETCH_TIMEOUT_MS` | `10000` |
//! | `FXTREND_HISTORY_BASE_URL` | `https://api.frankfurter.app` |
//! | `FXTREND_LATEST_BASE_URL` | provider default |
//! | `FXTREND_LATEST_PROVIDER` | `openerapi` |
//!
//! The fetch timeout must exceed the worst-case duration of an adapter call
//! (every attempt timing out plus retry delays). Otherwise the boundary
//! cancels the call before the circuit breaker sees the failure.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::adapters::{FrankfurterAdapter, OpenErApiAdapter};
use crate::http_client::DEFAULT_TIMEOUT_MS;
use crate::retry::RetryConfig;
use crate::{CurrencyCode, CurrencyPair, Period, ProviderId, RateProvider, ValidationError};

pub const ENV_QUOTE_CURRENCY: &str = "FXTREND_QUOTE_CURRENCY";
pub const ENV_BASE_CURRENCIES: &str = "FXTREND_BASE_CURRENCIES";
pub const ENV_DEFAULT_PERIOD_DAYS: &str = "FXTREND_DEFAULT_PERIOD_DAYS";
pub const ENV_REQUEST_TIMEOUT_MS: &str = "FXTREND_REQUEST_TIMEOUT_MS";
pub const ENV_FETCH_TIMEOUT_MS: &str = "FXTREND_FETCH_TIMEOUT_MS";
pub const ENV_HISTORY_BASE_URL: &str = "FXTREND_HISTORY_BASE_URL";
pub const ENV_LATEST_BASE_URL: &str = "FXTREND_LATEST_BASE_URL";
pub const ENV_LATEST_PROVIDER: &str = "FXTREND_LATEST_PROVIDER";

/// Default bound on one boundary call, retries included.
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 10_000;

#[derive(Debug, Clone, PartialEq)]
pub struct FxtrendConfig {
    pub quote: CurrencyCode,
    pub pair: CurrencyPair,
    pub default_period: Period,
    /// Timeout of a single HTTP attempt.
    pub request_timeout: Duration,
    /// Timeout of a whole history/latest fetch at the source boundary.
    pub fetch_timeout: Duration,
    /// Retry policy of both upstream adapters.
    pub retry: RetryConfig,
    /// `None` keeps the adapter's built-in endpoint.
    pub history_base_url: Option<String>,
    pub latest_base_url: Option<String>,
    pub latest_provider: ProviderId,
}

impl Default for FxtrendConfig {
    fn default() -> Self {
        Self {
            quote: CurrencyCode::known("ILS"),
            pair: CurrencyPair::known("EUR", "USD"),
            default_period: Period::default(),
            request_timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            fetch_timeout: Duration::from_millis(DEFAULT_FETCH_TIMEOUT_MS),
            retry: RetryConfig::default(),
            history_base_url: None,
            latest_base_url: None,
            latest_provider: ProviderId::OpenErApi,
        }
    }
}

impl FxtrendConfig {
    /// Reads overrides from the process environment.
    pub fn from_env() -> Result<Self, ValidationError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads overrides through `lookup`; unset or blank keys keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ValidationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(value) = get(ENV_QUOTE_CURRENCY) {
            config.quote = CurrencyCode::parse(&value)?;
        }
        if let Some(value) = get(ENV_BASE_CURRENCIES) {
            config.pair = parse_pair(&value)?;
        }
        if let Some(value) = get(ENV_DEFAULT_PERIOD_DAYS) {
            config.default_period = Period::from_str(&value)?;
        }
        if let Some(value) = get(ENV_REQUEST_TIMEOUT_MS) {
            config.request_timeout = parse_millis(ENV_REQUEST_TIMEOUT_MS, &value)?;
        }
        if let Some(value) = get(ENV_FETCH_TIMEOUT_MS) {
            config.fetch_timeout = parse_millis(ENV_FETCH_TIMEOUT_MS, &value)?;
        }
        config.history_base_url = get(ENV_HISTORY_BASE_URL);
        config.latest_base_url = get(ENV_LATEST_BASE_URL);
        if let Some(value) = get(ENV_LATEST_PROVIDER) {
            config.latest_provider = match ProviderId::from_str(&value)? {
                ProviderId::Fixture => {
                    return Err(ValidationError::InvalidSetting {
                        key: ENV_LATEST_PROVIDER,
                        value,
                    })
                }
                provider => provider,
            };
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks the settings that depend on each other.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.pair.first() == &self.quote || self.pair.second() == &self.quote {
            return Err(ValidationError::InvalidSetting {
                key: ENV_QUOTE_CURRENCY,
                value: self.quote.to_string(),
            });
        }

        let adapter_budget = self.adapter_budget();
        if self.fetch_timeout <= adapter_budget {
            return Err(ValidationError::InvalidSetting {
                key: ENV_FETCH_TIMEOUT_MS,
                value: format!(
                    "{}ms (must exceed the {}ms an adapter call can take)",
                    self.fetch_timeout.as_millis(),
                    adapter_budget.as_millis()
                ),
            });
        }

        Ok(())
    }

    /// Worst-case duration of one adapter call under `request_timeout` and
    /// `retry`.
    pub fn adapter_budget(&self) -> Duration {
        self.retry.worst_case(self.request_timeout)
    }

    pub fn history_adapter(&self) -> FrankfurterAdapter {
        let adapter = FrankfurterAdapter::default()
            .with_timeout_ms(millis(self.request_timeout))
            .with_retry(self.retry.clone());
        match &self.history_base_url {
            Some(url) => adapter.with_base_url(url.clone()),
            None => adapter,
        }
    }

    pub fn latest_adapter(&self) -> Arc<dyn RateProvider> {
        let timeout_ms = millis(self.request_timeout);
        match self.latest_provider {
            ProviderId::Frankfurter => {
                let adapter = FrankfurterAdapter::default()
                    .with_timeout_ms(timeout_ms)
                    .with_retry(self.retry.clone());
                Arc::new(match &self.latest_base_url {
                    Some(url) => adapter.with_base_url(url.clone()),
                    None => adapter,
                })
            }
            ProviderId::OpenErApi | ProviderId::Fixture => {
                let adapter = OpenErApiAdapter::default()
                    .with_timeout_ms(timeout_ms)
                    .with_retry(self.retry.clone());
                Arc::new(match &self.latest_base_url {
                    Some(url) => adapter.with_base_url(url.clone()),
                    None => adapter,
                })
            }
        }
    }
}

fn parse_pair(value: &str) -> Result<CurrencyPair, ValidationError> {
    let codes: Vec<&str> = value.split(',').map(str::trim).collect();
    match codes.as_slice() {
        [first, second] => CurrencyPair::parse(first, second),
        _ => Err(ValidationError::InvalidSetting {
            key: ENV_BASE_CURRENCIES,
            value: value.to_owned(),
        }),
    }
}

fn parse_millis(key: &'static str, value: &str) -> Result<Duration, ValidationError> {
    match value.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Ok(Duration::from_millis(ms)),
        _ => Err(ValidationError::InvalidSetting {
            key,
            value: value.to_owned(),
        }),
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_track_eur_and_usd_against_ils() {
        let config = FxtrendConfig::from_lookup(lookup(&[])).expect("defaults");
        assert_eq!(config.quote.as_str(), "ILS");
        assert_eq!(config.pair.first().as_str(), "EUR");
        assert_eq!(config.pair.second().as_str(), "USD");
        assert_eq!(config.default_period, Period::SixtyDays);
        assert_eq!(config.fetch_timeout, Duration::from_secs(10));
        assert_eq!(config.latest_provider, ProviderId::OpenErApi);
        assert!(config.fetch_timeout > config.adapter_budget());
    }

    #[test]
    fn rejects_fetch_timeout_shorter_than_adapter_retries() {
        // 3 attempts of 4s already outlast a 10s boundary.
        assert!(matches!(
            FxtrendConfig::from_lookup(lookup(&[(ENV_REQUEST_TIMEOUT_MS, "4000")])),
            Err(ValidationError::InvalidSetting {
                key: ENV_FETCH_TIMEOUT_MS,
                ..
            })
        ));
        assert!(matches!(
            FxtrendConfig::from_lookup(lookup(&[(ENV_FETCH_TIMEOUT_MS, "9900")])),
            Err(ValidationError::InvalidSetting {
                key: ENV_FETCH_TIMEOUT_MS,
                ..
            })
        ));

        let config = FxtrendConfig::from_lookup(lookup(&[
            (ENV_REQUEST_TIMEOUT_MS, "4000"),
            (ENV_FETCH_TIMEOUT_MS, "15000"),
        ]))
        .expect("boundary covers retries");
        assert_eq!(config.request_timeout, Duration::from_secs(4));
    }

    #[test]
    fn reads_overrides() {
        let config = FxtrendConfig::from_lookup(lookup(&[
            (ENV_QUOTE_CURRENCY, "chf"),
            (ENV_BASE_CURRENCIES, "gbp, jpy"),
            (ENV_DEFAULT_PERIOD_DAYS, "90"),
            (ENV_REQUEST_TIMEOUT_MS, "500"),
            (ENV_FETCH_TIMEOUT_MS, "2500"),
            (ENV_LATEST_PROVIDER, "frankfurter"),
            (ENV_HISTORY_BASE_URL, "https://mirror.test/"),
        ]))
        .expect("overrides");

        assert_eq!(config.quote.as_str(), "CHF");
        assert_eq!(config.pair.to_string(), "GBP/JPY");
        assert_eq!(config.default_period, Period::NinetyDays);
        assert_eq!(config.fetch_timeout, Duration::from_millis(2500));
        assert_eq!(config.latest_provider, ProviderId::Frankfurter);
        assert_eq!(config.history_base_url.as_deref(), Some("https://mirror.test/"));
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            FxtrendConfig::from_lookup(lookup(&[(ENV_DEFAULT_PERIOD_DAYS, "45")])),
            Err(ValidationError::InvalidPeriod { .. })
        ));
        assert!(matches!(
            FxtrendConfig::from_lookup(lookup(&[(ENV_BASE_CURRENCIES, "EUR")])),
            Err(ValidationError::InvalidSetting { .. })
        ));
        assert!(matches!(
            FxtrendConfig::from_lookup(lookup(&[(ENV_REQUEST_TIMEOUT_MS, "0")])),
            Err(ValidationError::InvalidSetting { .. })
        ));
        assert!(matches!(
            FxtrendConfig::from_lookup(lookup(&[(ENV_LATEST_PROVIDER, "fixture")])),
            Err(ValidationError::InvalidSetting { .. })
        ));
        assert!(matches!(
            FxtrendConfig::from_lookup(lookup(&[(ENV_QUOTE_CURRENCY, "USD")])),
            Err(ValidationError::InvalidSetting { .. })
        ));
    }

    #[test]
    fn blank_values_keep_defaults() {
        let config =
            FxtrendConfig::from_lookup(lookup(&[(ENV_QUOTE_CURRENCY, "  ")])).expect("defaults");
        assert_eq!(config.quote.as_str(), "ILS");
    }
}
