use serde::{Deserialize, Serialize};
use crate::error::{Error, Result};
use crate::rating::MovieId;

/// Round a coefficient to two decimal places.
///
/// Every persisted similarity goes through this, so two runs over the same
/// ratings always store bit-identical values.
#[inline]
pub fn round_to_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Directional similarity between two movies: how similar `movie_id` is to
/// `target_movie_id`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SimilarityRecord {
    pub movie_id: MovieId,
    pub target_movie_id: MovieId,
    pub similarity: f64,
}

impl SimilarityRecord {
    /// Create a record that is valid for persistence
    ///
    /// Rejects self-pairs, zero or non-finite similarity, and values outside
    /// `[-1, 1]`.
    pub fn new(movie_id: MovieId, target_movie_id: MovieId, similarity: f64) -> Result<Self> {
        let record = Self {
            movie_id,
            target_movie_id,
            similarity,
        };
        record.validate()?;
        Ok(record)
    }

    pub fn validate(&self) -> Result<()> {
        if self.movie_id == self.target_movie_id {
            return Err(Error::data_shape(
                "target_movie_id",
                format!("movie {} cannot be similar to itself", self.movie_id),
            ));
        }
        if !self.similarity.is_finite() || !(-1.0..=1.0).contains(&self.similarity) {
            return Err(Error::data_shape(
                "similarity",
                format!(
                    "{} -> {} has out-of-range value {}",
                    self.movie_id, self.target_movie_id, self.similarity
                ),
            ));
        }
        if self.similarity == 0.0 {
            return Err(Error::data_shape(
                "similarity",
                format!("{} -> {} has zero similarity", self.movie_id, self.target_movie_id),
            ));
        }
        Ok(())
    }

    /// The (source, target) pair identifying this record in a store
    #[inline]
    pub fn key(&self) -> (MovieId, MovieId) {
        (self.movie_id, self.target_movie_id)
    }
}

/// One recommended movie with its predicted rating
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RankingEntry {
    pub movie_id: MovieId,
    pub ranking: f64,
}
