//! Star rating value.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Error returned when a rating is outside the 1-5 star range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Rating must be between 1 and 5")]
pub struct RatingValueError(pub i64);

/// A star rating between 1 and 5 inclusive.
///
/// ```
/// use store_ratings_core::RatingValue;
///
/// assert!(RatingValue::new(5).is_ok());
/// assert!(RatingValue::new(0).is_err());
/// assert!(RatingValue::new(6).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct RatingValue(u8);

impl RatingValue {
    /// Lowest allowed rating.
    pub const MIN: u8 = 1;
    /// Highest allowed rating.
    pub const MAX: u8 = 5;

    /// Create a rating, rejecting anything outside 1..=5.
    ///
    /// # Errors
    ///
    /// Returns `RatingValueError` when `value` is out of range.
    pub fn new(value: i64) -> Result<Self, RatingValueError> {
        u8::try_from(value)
            .ok()
            .filter(|v| (Self::MIN..=Self::MAX).contains(v))
            .map(Self)
            .ok_or(RatingValueError(value))
    }

    /// The number of stars.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// The value as stored in the `SMALLINT` column.
    #[must_use]
    pub fn as_i16(self) -> i16 {
        i16::from(self.0)
    }
}

impl fmt::Display for RatingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i16> for RatingValue {
    type Error = RatingValueError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        Self::new(i64::from(value))
    }
}

impl<'de> Deserialize<'de> for RatingValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = i64::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_full_range() {
        for stars in 1..=5 {
            assert_eq!(i64::from(RatingValue::new(stars).unwrap().get()), stars);
        }
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert_eq!(RatingValue::new(0), Err(RatingValueError(0)));
        assert_eq!(RatingValue::new(6), Err(RatingValueError(6)));
        assert_eq!(RatingValue::new(-3), Err(RatingValueError(-3)));
        assert_eq!(RatingValue::new(261), Err(RatingValueError(261)));
    }

    #[test]
    fn test_deserialize_validates() {
        let ok: RatingValue = serde_json::from_str("4").unwrap();
        assert_eq!(ok.get(), 4);
        assert!(serde_json::from_str::<RatingValue>("9").is_err());
    }

    #[test]
    fn test_from_database_column() {
        assert_eq!(RatingValue::try_from(3_i16).unwrap().as_i16(), 3);
        assert!(RatingValue::try_from(0_i16).is_err());
    }
}
