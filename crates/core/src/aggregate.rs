//! Rating aggregation.
//!
//! The database computes per-store `AVG`/`COUNT`; the per-owner rollup is
//! computed here from those per-store results.

use serde::Serialize;

/// Average and count of the ratings on one store.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    /// Arithmetic mean, unrounded. `None` when the store has no ratings.
    pub average_rating: Option<f64>,
    /// Number of ratings.
    pub rating_count: i64,
}

/// Overall average across the stores of one owner.
///
/// This is the mean of the per-store averages. A store with no ratings
/// contributes 0 rather than being skipped, so unrated stores lower the owner's
/// figure. An owner with no stores gets 0.
#[must_use]
pub fn owner_overall_average<I>(store_averages: I) -> f64
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, stores) = store_averages
        .into_iter()
        .fold((0.0_f64, 0_u32), |(sum, stores), avg| {
            (sum + avg.unwrap_or(0.0), stores + 1)
        });

    if stores == 0 {
        0.0
    } else {
        sum / f64::from(stores)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_serializes_null_average() {
        let json = serde_json::to_value(RatingSummary::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"averageRating": null, "ratingCount": 0})
        );
    }

    #[test]
    fn test_owner_average_counts_unrated_stores_as_zero() {
        let overall = owner_overall_average([Some(4.0), None]);
        assert!((overall - 2.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_owner_average_of_rated_stores() {
        let overall = owner_overall_average([Some(4.0), Some(3.0), Some(5.0)]);
        assert!((overall - 4.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_owner_average_without_stores() {
        assert!(owner_overall_average(Vec::new()).abs() < f64::EPSILON);
    }
}
