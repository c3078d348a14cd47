//! The rate pipeline: merge, trend, align, decimate, orchestrate.

pub mod align;
pub mod decimate;
pub mod merge;
pub mod orchestrator;
pub mod publish;
pub mod trend;

pub use align::align;
pub use decimate::{decimate, decimate_with_stride, DECIMATION_STRIDE};
pub use merge::merge_latest;
pub use orchestrator::{
    build_single_view, build_snapshot, DashboardSnapshot, FetchedRates, SingleCurrencyView,
    TrendPipeline,
};
pub use publish::{RequestTag, SnapshotPublisher, Tagged};
pub use trend::{classify, slope, summarize, TREND_THRESHOLD};
