use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::error::{Error, Result};

pub type UserId = u64;
pub type MovieId = u64;

/// A single user's rating of a movie
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Rating {
    pub user_id: UserId,
    pub movie_id: MovieId,
    pub rating: f64,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

impl Rating {
    /// Create a rating, rejecting non-finite values
    pub fn new(user_id: UserId, movie_id: MovieId, rating: f64) -> Result<Self> {
        let rating = Self {
            user_id,
            movie_id,
            rating,
            date: None,
        };
        rating.validate()?;
        Ok(rating)
    }

    /// Create a rating with the moment it was given
    pub fn with_date(
        user_id: UserId,
        movie_id: MovieId,
        rating: f64,
        date: DateTime<Utc>,
    ) -> Result<Self> {
        let mut rating = Self::new(user_id, movie_id, rating)?;
        rating.date = Some(date);
        Ok(rating)
    }

    /// Check a rating that did not come through [`Rating::new`],
    /// e.g. one decoded from storage.
    pub fn validate(&self) -> Result<()> {
        if !self.rating.is_finite() {
            return Err(Error::data_shape(
                "rating",
                format!(
                    "user {} movie {} has non-finite value {}",
                    self.user_id, self.movie_id, self.rating
                ),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_rating_creation() {
        let rating = Rating::new(1, 10, 4.5).unwrap();
        assert_eq!(rating.user_id, 1);
        assert_eq!(rating.movie_id, 10);
        assert_eq!(rating.rating, 4.5);
        assert!(rating.date.is_none());
    }

    #[test]
    fn test_non_finite_rating_rejected() {
        for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = Rating::new(1, 10, value).unwrap_err();
            assert!(matches!(err, Error::DataShape { field: "rating", .. }));
        }
    }

    #[test]
    fn test_validate_catches_corrupt_record() {
        let corrupt = Rating {
            user_id: 3,
            movie_id: 7,
            rating: f64::NAN,
            date: None,
        };
        assert!(corrupt.validate().is_err());
    }

    #[test]
    fn test_with_date_roundtrips_through_json() {
        let date = Utc.with_ymd_and_hms(2006, 9, 29, 11, 9, 27).unwrap();
        let rating = Rating::with_date(75, 3, 1.0, date).unwrap();

        let json = serde_json::to_string(&rating).unwrap();
        let decoded: Rating = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, rating);
    }

    #[test]
    fn test_missing_date_defaults_to_none() {
        let decoded: Rating =
            serde_json::from_str(r#"{"user_id":1,"movie_id":2,"rating":3.5}"#).unwrap();
        assert!(decoded.date.is_none());
    }
}
