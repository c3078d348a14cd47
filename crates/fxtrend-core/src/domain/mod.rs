//! # Domain Models
//!
//! Canonical types shared by the rate providers and the trend pipeline.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`CurrencyCode`] | Validated 3-letter currency code |
//! | [`CurrencyPair`] | Two distinct base currencies |
//! | [`Period`] | Selectable look-back window |
//! | [`RateDate`] | UTC calendar day |
//! | [`RatePoint`] | Rate quoted on one day |
//! | [`Series`] | Strictly date-ordered rate points |
//! | [`CombinedPoint`] | Both currencies' rates on a shared day |
//! | [`Trend`] | UP / DOWN / STABLE classification |
//! | [`CurrencySummary`] | Trend plus current rate |
//!
//! Construction validates every invariant; an out-of-order [`Series`] or a
//! non-positive rate cannot be built through the public API.

mod currency;
mod date;
mod models;
mod period;

pub use currency::{CurrencyCode, CurrencyPair};
pub use date::RateDate;
pub use models::{CombinedPoint, CurrencySummary, RatePoint, Series, Trend};
pub use period::Period;
