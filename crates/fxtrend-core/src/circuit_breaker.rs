use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::warn;

/// Runtime circuit state for one upstream provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

/// Failure threshold and cool-down for a [`CircuitBreaker`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CircuitBreakerConfig {
    pub failure_threshold: u32,
    pub open_timeout: Duration,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            open_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Debug)]
struct BreakerState {
    state: CircuitState,
    consecutive_failures: u32,
    /// When the circuit opened, or when the half-open trial request was let through.
    since: Option<Instant>,
}

/// Stops calling an upstream after repeated failures, then lets a single
/// trial request through once the cool-down has elapsed. Other requests are
/// refused while it is in flight; a trial that never reports back is replaced
/// after another cool-down.
#[derive(Debug)]
pub struct CircuitBreaker {
    name: &'static str,
    config: CircuitBreakerConfig,
    inner: Mutex<BreakerState>,
}

impl CircuitBreaker {
    pub fn new(name: &'static str, config: CircuitBreakerConfig) -> Self {
        Self {
            name,
            config,
            inner: Mutex::new(BreakerState {
                state: CircuitState::Closed,
                consecutive_failures: 0,
                since: None,
            }),
        }
    }

    pub fn allow_request(&self) -> bool {
        let mut inner = self.lock();
        if inner.state == CircuitState::Closed {
            return true;
        }

        let cooled_down = inner
            .since
            .is_some_and(|since| since.elapsed() >= self.config.open_timeout);
        if cooled_down {
            inner.state = CircuitState::HalfOpen;
            inner.since = Some(Instant::now());
        }
        cooled_down
    }

    pub fn record_success(&self) {
        let mut inner = self.lock();
        inner.state = CircuitState::Closed;
        inner.consecutive_failures = 0;
        inner.since = None;
    }

    pub fn record_failure(&self) {
        let mut inner = self.lock();
        inner.consecutive_failures = inner.consecutive_failures.saturating_add(1);

        let trips = inner.state == CircuitState::HalfOpen
            || inner.consecutive_failures >= self.config.failure_threshold;
        if trips && inner.state != CircuitState::Open {
            warn!(
                provider = self.name,
                failures = inner.consecutive_failures,
                "circuit opened"
            );
            inner.state = CircuitState::Open;
            inner.since = Some(Instant::now());
        }
    }

    pub fn state(&self) -> CircuitState {
        self.lock().state
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.lock().consecutive_failures
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BreakerState> {
        // Counters stay consistent across a poisoning panic.
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
