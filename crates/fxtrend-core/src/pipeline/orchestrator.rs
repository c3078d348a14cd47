use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::align::align;
use super::decimate::{decimate, DECIMATION_STRIDE};
use super::merge::merge_latest;
use super::publish::SnapshotPublisher;
use super::trend::summarize;
use crate::{
    CombinedPoint, CoreError, CurrencyCode, CurrencyPair, CurrencySummary, Period, RatePoint,
    RateSource, Series,
};

/// History and latest point fetched for one currency.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FetchedRates {
    pub history: Series,
    pub latest: Option<RatePoint>,
}

impl FetchedRates {
    pub fn new(history: Series, latest: Option<RatePoint>) -> Self {
        Self { history, latest }
    }
}

/// Everything the dual-currency dashboard renders for one selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub period: Period,
    pub quote: CurrencyCode,
    pub pair: CurrencyPair,
    /// Aligned on shared dates, then decimated.
    pub combined: Vec<CombinedPoint>,
    pub summaries: BTreeMap<CurrencyCode, CurrencySummary>,
    pub interval_days: usize,
    pub data_points: usize,
}

impl DashboardSnapshot {
    pub fn summary(&self, code: &CurrencyCode) -> Option<&CurrencySummary> {
        self.summaries.get(code)
    }

    pub fn to_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Chart data and summary for a single base currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SingleCurrencyView {
    pub period: Period,
    pub quote: CurrencyCode,
    pub base: CurrencyCode,
    /// Decimated for charting.
    pub series: Vec<RatePoint>,
    /// Computed on the full-resolution series.
    pub summary: CurrencySummary,
    pub interval_days: usize,
    pub data_points: usize,
}

impl SingleCurrencyView {
    pub fn to_json(&self) -> Result<String, CoreError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Merges, summarizes, aligns and decimates already-fetched rates.
///
/// Summaries come from the merged full-resolution series, before
/// decimation.
pub fn build_snapshot(
    period: Period,
    quote: CurrencyCode,
    pair: CurrencyPair,
    first: FetchedRates,
    second: FetchedRates,
) -> DashboardSnapshot {
    let first_series = merge_latest(first.history, first.latest);
    let second_series = merge_latest(second.history, second.latest);

    let mut summaries = BTreeMap::new();
    summaries.insert(pair.first().clone(), summarize(&first_series));
    summaries.insert(pair.second().clone(), summarize(&second_series));

    let aligned = align(&first_series, &second_series);
    let combined = decimate(&aligned);
    debug!(
        %pair,
        first_points = first_series.len(),
        second_points = second_series.len(),
        aligned = aligned.len(),
        combined = combined.len(),
        "dashboard assembled"
    );

    DashboardSnapshot {
        period,
        quote,
        pair,
        data_points: combined.len(),
        combined,
        summaries,
        interval_days: DECIMATION_STRIDE,
    }
}

/// Single-currency counterpart of [`build_snapshot`].
pub fn build_single_view(
    period: Period,
    quote: CurrencyCode,
    base: CurrencyCode,
    rates: FetchedRates,
) -> SingleCurrencyView {
    let series = merge_latest(rates.history, rates.latest);
    let summary = summarize(&series);
    let decimated = decimate(series.points());

    SingleCurrencyView {
        period,
        quote,
        base,
        data_points: decimated.len(),
        series: decimated,
        summary,
        interval_days: DECIMATION_STRIDE,
    }
}

/// Runs the fetch → merge → trend → align → decimate pipeline against a
/// [`RateSource`].
///
/// Each call owns all of its intermediate data; concurrent calls share
/// nothing but the source's providers.
#[derive(Clone)]
pub struct TrendPipeline {
    source: RateSource,
}

impl TrendPipeline {
    pub fn new(source: RateSource) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &RateSource {
        &self.source
    }

    async fn fetch(&self, period: Period, base: &CurrencyCode) -> FetchedRates {
        let (history, latest) = tokio::join!(
            self.source.fetch_history(period, base),
            self.source.fetch_latest(base)
        );
        FetchedRates::new(history, latest)
    }

    /// Dual-currency dashboard for `pair`. The four upstream calls run
    /// concurrently; a currency whose source fails ends up with an empty
    /// series and does not stop the other.
    pub async fn compute(&self, period: Period, pair: &CurrencyPair) -> DashboardSnapshot {
        let (first, second) = tokio::join!(
            self.fetch(period, pair.first()),
            self.fetch(period, pair.second())
        );

        build_snapshot(
            period,
            self.source.quote().clone(),
            pair.clone(),
            first,
            second,
        )
    }

    pub async fn compute_single(&self, period: Period, base: &CurrencyCode) -> SingleCurrencyView {
        let rates = self.fetch(period, base).await;
        build_single_view(period, self.source.quote().clone(), base.clone(), rates)
    }

    /// Computes a dashboard under a fresh request tag and publishes it unless
    /// a newer request was started in the meantime.
    pub async fn refresh(
        &self,
        publisher: &SnapshotPublisher<DashboardSnapshot>,
        period: Period,
        pair: &CurrencyPair,
    ) -> bool {
        let tag = publisher.begin();
        let snapshot = self.compute(period, pair).await;
        let published = publisher.publish(tag, snapshot);
        if published {
            info!(%pair, period = period.days(), tag = tag.sequence(), "dashboard published");
        }
        published
    }
}
