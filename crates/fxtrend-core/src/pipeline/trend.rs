use crate::{CurrencySummary, Series, Trend};

/// Slope magnitude, in rate units per observation, below which a series is
/// reported as stable.
pub const TREND_THRESHOLD: f64 = 0.001;

/// Ordinary least-squares slope of `rates` against their zero-based index.
///
/// Returns `None` for fewer than two observations or a zero denominator.
pub fn slope(rates: &[f64]) -> Option<f64> {
    if rates.len() < 2 {
        return None;
    }

    let n = rates.len() as f64;
    let (mut sum_x, mut sum_y, mut sum_xy, mut sum_xx) = (0.0, 0.0, 0.0, 0.0);
    for (index, &rate) in rates.iter().enumerate() {
        let x = index as f64;
        sum_x += x;
        sum_y += rate;
        sum_xy += x * rate;
        sum_xx += x * x;
    }

    let denominator = n * sum_xx - sum_x * sum_x;
    if denominator == 0.0 {
        return None;
    }
    Some((n * sum_xy - sum_x * sum_y) / denominator)
}

/// Classifies the direction of `series`. Calendar gaps are ignored: every
/// observation weighs the same.
pub fn classify(series: &Series) -> Trend {
    let rates: Vec<f64> = series.rates().collect();
    match slope(&rates) {
        Some(value) if value > TREND_THRESHOLD => Trend::Up,
        Some(value) if value < -TREND_THRESHOLD => Trend::Down,
        _ => Trend::Stable,
    }
}

/// Trend plus the last observed rate, absent for an empty series.
pub fn summarize(series: &Series) -> CurrencySummary {
    CurrencySummary {
        trend: classify(series),
        current_rate: series.last().map(|point| point.rate),
    }
}
