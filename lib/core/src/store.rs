//! Storage seams consumed by the similarity engine and the ranker.
//!
//! Implementations live in `webfilmz-storage`. The traits are synchronous and
//! object safe so callers can hold a `&dyn Store` regardless of backend.

use crate::error::Result;
use crate::movie::Movie;
use crate::rating::{Rating, UserId};
use crate::recommendation::SimilarityRecord;

pub trait RatingStore: Send + Sync {
    fn insert_rating(&self, rating: &Rating) -> Result<()>;

    /// Insert a batch in order. Backends that can should write it atomically.
    fn insert_ratings(&self, ratings: &[Rating]) -> Result<()> {
        ratings.iter().try_for_each(|rating| self.insert_rating(rating))
    }

    /// All ratings in insertion order.
    ///
    /// With a `limit`, only the `limit` most recently inserted ratings are
    /// returned, still in insertion order.
    fn fetch_all_ratings(&self, limit: Option<usize>) -> Result<Vec<Rating>>;

    fn fetch_ratings_by_user(&self, user_id: UserId) -> Result<Vec<Rating>>;

    fn rating_count(&self) -> Result<usize>;
}

pub trait SimilarityStore: Send + Sync {
    /// Insert or replace the record for its (source, target) pair
    fn upsert_similarity(&self, record: &SimilarityRecord) -> Result<()>;

    fn fetch_all_similarities(&self) -> Result<Vec<SimilarityRecord>>;

    /// Drop every stored record, returning how many were removed
    fn clear_similarities(&self) -> Result<usize>;

    fn similarity_count(&self) -> Result<usize>;
}

pub trait MovieStore: Send + Sync {
    /// Insert or replace a movie by id
    fn insert_movie(&self, movie: &Movie) -> Result<()>;

    fn fetch_all_movies(&self) -> Result<Vec<Movie>>;
}

/// A backend providing every collaborator store
pub trait Store: RatingStore + SimilarityStore + MovieStore {}

impl<T: RatingStore + SimilarityStore + MovieStore + ?Sized> Store for T {}
