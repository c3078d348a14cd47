use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::data_source::{
    CapabilitySet, HistoryRequest, LatestRequest, ProviderFuture, RateProvider, SourceError,
};
use crate::{CurrencyCode, ProviderId, RatePoint, Series};

/// In-memory provider for offline runs and deterministic tests.
///
/// History is clipped to the requested range. Currencies marked with
/// [`failing`](Self::failing) answer every call with `Unavailable`, and
/// [`with_delay`](Self::with_delay) stalls each call before it answers.
#[derive(Debug, Clone, Default)]
pub struct FixtureProvider {
    history: HashMap<CurrencyCode, Series>,
    latest: HashMap<CurrencyCode, RatePoint>,
    failing: HashSet<CurrencyCode>,
    delay: Option<Duration>,
    calls: Arc<AtomicUsize>,
}

impl FixtureProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_history(mut self, base: CurrencyCode, series: Series) -> Self {
        self.history.insert(base, series);
        self
    }

    pub fn with_latest(mut self, base: CurrencyCode, point: RatePoint) -> Self {
        self.latest.insert(base, point);
        self
    }

    pub fn failing(mut self, base: CurrencyCode) -> Self {
        self.failing.insert(base);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of history and latest calls served so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn enter(&self, base: &CurrencyCode) -> Result<(), SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.contains(base) {
            return Err(SourceError::unavailable(format!(
                "fixture configured to fail for {base}"
            )));
        }
        Ok(())
    }
}

impl RateProvider for FixtureProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Fixture
    }

    fn capabilities(&self) -> CapabilitySet {
        CapabilitySet::full()
    }

    fn history<'a>(&'a self, req: HistoryRequest) -> ProviderFuture<'a, Series> {
        Box::pin(async move {
            self.enter(&req.base).await?;
            let points = self
                .history
                .get(&req.base)
                .map(|series| {
                    series
                        .points()
                        .iter()
                        .filter(|point| point.date >= req.start && point.date <= req.end)
                        .copied()
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default();
            Ok(Series::from_unordered(points))
        })
    }

    fn latest<'a>(&'a self, req: LatestRequest) -> ProviderFuture<'a, Option<RatePoint>> {
        Box::pin(async move {
            self.enter(&req.base).await?;
            Ok(self.latest.get(&req.base).copied())
        })
    }
}
