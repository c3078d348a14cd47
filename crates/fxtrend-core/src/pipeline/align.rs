use std::collections::HashMap;

use crate::{CombinedPoint, RateDate, Series};

/// Inner-joins two series on date, keeping `a`'s order.
pub fn align(a: &Series, b: &Series) -> Vec<CombinedPoint> {
    let lookup: HashMap<RateDate, f64> = b
        .points()
        .iter()
        .map(|point| (point.date, point.rate))
        .collect();

    a.points()
        .iter()
        .filter_map(|point| {
            lookup.get(&point.date).map(|rate_b| CombinedPoint {
                date: point.date,
                rate_a: point.rate,
                rate_b: *rate_b,
            })
        })
        .collect()
}
