//! Retry with exponential backoff for upstream HTTP calls.

use std::time::Duration;

use tracing::debug;

use crate::http_client::{HttpClient, HttpError, HttpErrorKind, HttpRequest, HttpResponse};

/// Delay schedule between attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    Fixed {
        delay: Duration,
    },
    /// `base * factor^attempt`, capped at `max`, optionally spread by +/- 50%.
    Exponential {
        base: Duration,
        factor: f64,
        max: Duration,
        jitter: bool,
    },
}

impl Default for Backoff {
    fn default() -> Self {
        Self::Exponential {
            base: Duration::from_millis(200),
            factor: 2.0,
            max: Duration::from_secs(2),
            jitter: true,
        }
    }
}

impl Backoff {
    /// Delay before retry number `attempt` (0-based).
    pub fn delay(self, attempt: u32) -> Duration {
        match self {
            Self::Fixed { delay } => delay,
            Self::Exponential {
                base,
                factor,
                max,
                jitter,
            } => {
                let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
                let seconds = (base.as_secs_f64() * factor.powi(exponent)).min(max.as_secs_f64());
                let delay = Duration::from_secs_f64(seconds);
                if !jitter {
                    return delay;
                }

                let millis = delay.as_millis() as u64;
                let spread = millis / 2;
                let low = millis - spread;
                Duration::from_millis(fastrand::u64(low..=millis + spread))
            }
        }
    }

    /// Upper bound of [`Backoff::delay`] for `attempt`, jitter included.
    pub fn max_delay(self, attempt: u32) -> Duration {
        match self {
            Self::Fixed { delay } => delay,
            Self::Exponential { jitter: false, .. } => self.delay(attempt),
            Self::Exponential {
                base, factor, max, ..
            } => {
                let unjittered = Self::Exponential {
                    base,
                    factor,
                    max,
                    jitter: false,
                }
                .delay(attempt);
                let millis = unjittered.as_millis() as u64;
                Duration::from_millis(millis + millis / 2)
            }
        }
    }
}

/// Which failures are retried and how often.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Retries after the first attempt; total attempts = `max_retries + 1`.
    pub max_retries: u32,
    pub backoff: Backoff,
    pub retry_on_status: Vec<u16>,
    pub retry_on_timeout: bool,
    pub retry_on_connect: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            backoff: Backoff::default(),
            retry_on_status: vec![408, 429, 500, 502, 503, 504],
            retry_on_timeout: true,
            retry_on_connect: true,
        }
    }
}

impl RetryConfig {
    pub fn fixed(delay: Duration, max_retries: u32) -> Self {
        Self {
            max_retries,
            backoff: Backoff::Fixed { delay },
            ..Self::default()
        }
    }

    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Longest time [`execute_with_retry`] can take when every attempt runs
    /// into `attempt_timeout`.
    pub fn worst_case(&self, attempt_timeout: Duration) -> Duration {
        let attempts = attempt_timeout.saturating_mul(self.max_retries.saturating_add(1));
        (0..self.max_retries).fold(attempts, |total, attempt| {
            total.saturating_add(self.backoff.max_delay(attempt))
        })
    }

    pub fn should_retry_status(&self, status: u16) -> bool {
        self.retry_on_status.contains(&status)
    }

    pub fn should_retry_error(&self, error: &HttpError) -> bool {
        match error.kind() {
            HttpErrorKind::Timeout => self.retry_on_timeout,
            HttpErrorKind::Connect => self.retry_on_connect,
            HttpErrorKind::Other => false,
        }
    }
}

/// Executes `request`, retrying transient failures per `config`.
///
/// A response whose status is still retryable after the last attempt is
/// returned as-is; the caller decides what a non-2xx status means.
pub async fn execute_with_retry(
    client: &dyn HttpClient,
    request: HttpRequest,
    config: &RetryConfig,
) -> Result<HttpResponse, HttpError> {
    let mut attempt = 0;
    loop {
        let outcome = client.execute(request.clone()).await;
        let retryable = match &outcome {
            Ok(response) => config.should_retry_status(response.status),
            Err(error) => config.should_retry_error(error),
        };

        if !retryable || attempt >= config.max_retries {
            return outcome;
        }

        let delay = config.backoff.delay(attempt);
        debug!(
            url = %request.url,
            attempt = attempt + 1,
            delay_ms = delay.as_millis() as u64,
            "retrying upstream request"
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
    }
}
