use tracing::debug;

use crate::{RatePoint, Series};

/// Appends `latest` to `history` when it is strictly newer than the last
/// historical point. An empty history or an absent latest point returns the
/// history unchanged.
pub fn merge_latest(mut history: Series, latest: Option<RatePoint>) -> Series {
    let Some(latest) = latest else {
        return history;
    };
    if history.is_empty() {
        return history;
    }

    if let Err(error) = history.push(latest) {
        debug!(%error, date = %latest.date, "latest point already covered by history");
    }
    history
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RateDate;

    fn point(date: &str, rate: f64) -> RatePoint {
        RatePoint::new(RateDate::parse(date).expect("date"), rate).expect("point")
    }

    fn history() -> Series {
        Series::new(vec![
            point("2024-05-01", 4.00),
            point("2024-05-02", 4.01),
            point("2024-05-03", 4.02),
        ])
        .expect("history")
    }

    #[test]
    fn appends_strictly_newer_point() {
        let latest = point("2024-05-06", 4.05);
        let merged = merge_latest(history(), Some(latest));

        assert_eq!(merged.len(), 4);
        assert_eq!(merged.last(), Some(&latest));
        assert_eq!(&merged.points()[..3], history().points());
    }

    #[test]
    fn same_day_latest_is_not_appended() {
        let merged = merge_latest(history(), Some(point("2024-05-03", 4.10)));
        assert_eq!(merged, history());
    }

    #[test]
    fn older_latest_is_ignored() {
        let merged = merge_latest(history(), Some(point("2024-04-30", 3.90)));
        assert_eq!(merged, history());
    }

    #[test]
    fn absent_latest_returns_history() {
        assert_eq!(merge_latest(history(), None), history());
    }

    #[test]
    fn empty_history_stays_empty() {
        let merged = merge_latest(Series::empty(), Some(point("2024-05-06", 4.05)));
        assert!(merged.is_empty());
    }
}
