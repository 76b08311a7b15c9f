use ahash::AHashMap;
use parking_lot::RwLock;
use webfilmz_core::{
    Movie, MovieId, MovieStore, Rating, RatingStore, Result, SimilarityRecord, SimilarityStore,
    UserId,
};

#[derive(Default)]
struct Similarities {
    records: Vec<SimilarityRecord>,
    index: AHashMap<(MovieId, MovieId), usize>,
}

/// Volatile store kept entirely in process memory
#[derive(Default)]
pub struct MemoryStore {
    ratings: RwLock<Vec<Rating>>,
    movies: RwLock<Vec<Movie>>,
    similarities: RwLock<Similarities>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RatingStore for MemoryStore {
    fn insert_rating(&self, rating: &Rating) -> Result<()> {
        rating.validate()?;
        self.ratings.write().push(rating.clone());
        Ok(())
    }

    fn insert_ratings(&self, ratings: &[Rating]) -> Result<()> {
        for rating in ratings {
            rating.validate()?;
        }
        self.ratings.write().extend_from_slice(ratings);
        Ok(())
    }

    fn fetch_all_ratings(&self, limit: Option<usize>) -> Result<Vec<Rating>> {
        let ratings = self.ratings.read();
        let skip = limit.map_or(0, |l| ratings.len().saturating_sub(l));
        Ok(ratings[skip..].to_vec())
    }

    fn fetch_ratings_by_user(&self, user_id: UserId) -> Result<Vec<Rating>> {
        Ok(self
            .ratings
            .read()
            .iter()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }

    fn rating_count(&self) -> Result<usize> {
        Ok(self.ratings.read().len())
    }
}

impl SimilarityStore for MemoryStore {
    fn upsert_similarity(&self, record: &SimilarityRecord) -> Result<()> {
        record.validate()?;
        let mut guard = self.similarities.write();
        let sims = &mut *guard;
        match sims.index.get(&record.key()) {
            Some(&i) => sims.records[i] = *record,
            None => {
                sims.index.insert(record.key(), sims.records.len());
                sims.records.push(*record);
            }
        }
        Ok(())
    }

    fn fetch_all_similarities(&self) -> Result<Vec<SimilarityRecord>> {
        Ok(self.similarities.read().records.clone())
    }

    fn clear_similarities(&self) -> Result<usize> {
        let mut sims = self.similarities.write();
        let removed = sims.records.len();
        sims.records.clear();
        sims.index.clear();
        Ok(removed)
    }

    fn similarity_count(&self) -> Result<usize> {
        Ok(self.similarities.read().records.len())
    }
}

impl MovieStore for MemoryStore {
    fn insert_movie(&self, movie: &Movie) -> Result<()> {
        let mut movies = self.movies.write();
        match movies.iter_mut().find(|m| m.id == movie.id) {
            Some(existing) => *existing = movie.clone(),
            None => movies.push(movie.clone()),
        }
        Ok(())
    }

    fn fetch_all_movies(&self) -> Result<Vec<Movie>> {
        Ok(self.movies.read().clone())
    }
}
