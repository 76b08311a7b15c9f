//! Batch similarity engine
//!
//! Reads every rating, reshapes them into a [`RatingMatrix`], correlates each
//! pair of movies and persists the non-zero, non-self pairs.

use crate::pearson::pearson_correlation;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use webfilmz_core::{MovieId, RatingMatrix, RatingStore, Result, SimilarityRecord, SimilarityStore};

/// Number of ratings a run reads by default
pub const DEFAULT_RATING_LIMIT: usize = 3000;

/// Configuration for a similarity run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Upper bound on the ratings read per run. `None` reads everything.
    pub rating_limit: Option<usize>,
    /// Correlate rows of the pair triangle on the rayon pool
    pub parallel: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rating_limit: Some(DEFAULT_RATING_LIMIT),
            parallel: true,
        }
    }
}

/// Outcome of [`SimilarityEngine::run`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineReport {
    /// Ratings read from the store
    pub ratings: usize,
    /// Distinct movies in the matrix
    pub movies: usize,
    /// Unordered pairs correlated, self-pairs included
    pub pairs_compared: usize,
    /// Records left over from the previous run and removed
    pub records_cleared: usize,
    pub records_written: usize,
    /// Records whose write failed; each one is logged
    pub failures: usize,
}

/// Computes movie-to-movie Pearson similarities
#[derive(Debug, Clone, Default)]
pub struct SimilarityEngine {
    config: EngineConfig,
}

impl SimilarityEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Correlate every pair of movies in `matrix`.
    ///
    /// Each unordered pair is computed once and emitted in both directions.
    /// Zero coefficients and self-pairs are dropped. The result is sorted by
    /// (source, target) and does not depend on `parallel`.
    pub fn compute(&self, matrix: &RatingMatrix) -> Vec<SimilarityRecord> {
        self.compute_records(matrix).0
    }

    fn compute_records(&self, matrix: &RatingMatrix) -> (Vec<SimilarityRecord>, usize) {
        let movies: Vec<MovieId> = matrix.movies().collect();
        let n = movies.len();

        let row = |i: usize| -> Vec<(MovieId, MovieId, f64)> {
            let x = movies[i];
            movies[i..]
                .iter()
                .filter_map(|&y| {
                    let similarity = pearson_correlation(matrix, x, y);
                    // Self-correlation is computed like any other pair but never stored
                    (similarity != 0.0 && x != y).then_some((x, y, similarity))
                })
                .collect()
        };

        let pairs: Vec<(MovieId, MovieId, f64)> = if self.config.parallel {
            (0..n).into_par_iter().flat_map_iter(&row).collect()
        } else {
            (0..n).flat_map(&row).collect()
        };

        let mut records = Vec::with_capacity(pairs.len() * 2);
        for (x, y, similarity) in pairs {
            records.push(SimilarityRecord { movie_id: x, target_movie_id: y, similarity });
            records.push(SimilarityRecord { movie_id: y, target_movie_id: x, similarity });
        }
        records.sort_by_key(SimilarityRecord::key);

        (records, n * (n + 1) / 2)
    }

    /// Run a full batch against `store`.
    ///
    /// The previous similarity set is cleared before the new one is written,
    /// so a run always replaces rather than merges. A record that fails to
    /// write is logged and skipped; the run carries on with the next one.
    pub fn run<S>(&self, store: &S) -> Result<EngineReport>
    where
        S: RatingStore + SimilarityStore + ?Sized,
    {
        let ratings = store.fetch_all_ratings(self.config.rating_limit)?;
        for rating in &ratings {
            rating.validate()?;
        }

        let matrix = RatingMatrix::from_ratings(&ratings);
        debug!(
            ratings = ratings.len(),
            movies = matrix.movie_count(),
            "Rating matrix built"
        );

        let (records, pairs_compared) = self.compute_records(&matrix);
        let records_cleared = store.clear_similarities()?;

        let mut records_written = 0;
        let mut failures = 0;
        for record in &records {
            match store.upsert_similarity(record) {
                Ok(()) => records_written += 1,
                Err(e) => {
                    failures += 1;
                    warn!(
                        movie_id = record.movie_id,
                        target_movie_id = record.target_movie_id,
                        error = %e,
                        "Failed to persist similarity record"
                    );
                }
            }
        }

        let report = EngineReport {
            ratings: ratings.len(),
            movies: matrix.movie_count(),
            pairs_compared,
            records_cleared,
            records_written,
            failures,
        };
        info!(
            ratings = report.ratings,
            movies = report.movies,
            written = report.records_written,
            failures = report.failures,
            "Similarity run complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashSet;
    use webfilmz_core::{Error, Rating, UserId};

    /// Store double that can be told to reject specific writes
    #[derive(Default)]
    struct TestStore {
        ratings: Vec<Rating>,
        records: Mutex<Vec<SimilarityRecord>>,
        reject: HashSet<(MovieId, MovieId)>,
    }

    impl TestStore {
        fn with_ratings(ratings: Vec<Rating>) -> Self {
            Self { ratings, ..Default::default() }
        }
    }

    impl RatingStore for TestStore {
        fn insert_rating(&self, _rating: &Rating) -> Result<()> {
            unimplemented!()
        }

        fn fetch_all_ratings(&self, limit: Option<usize>) -> Result<Vec<Rating>> {
            let skip = limit.map_or(0, |l| self.ratings.len().saturating_sub(l));
            Ok(self.ratings[skip..].to_vec())
        }

        fn fetch_ratings_by_user(&self, user_id: UserId) -> Result<Vec<Rating>> {
            Ok(self.ratings.iter().filter(|r| r.user_id == user_id).cloned().collect())
        }

        fn rating_count(&self) -> Result<usize> {
            Ok(self.ratings.len())
        }
    }

    impl SimilarityStore for TestStore {
        fn upsert_similarity(&self, record: &SimilarityRecord) -> Result<()> {
            if self.reject.contains(&record.key()) {
                return Err(Error::Persistence("write rejected".to_string()));
            }
            self.records.lock().push(*record);
            Ok(())
        }

        fn fetch_all_similarities(&self) -> Result<Vec<SimilarityRecord>> {
            Ok(self.records.lock().clone())
        }

        fn clear_similarities(&self) -> Result<usize> {
            let mut records = self.records.lock();
            let n = records.len();
            records.clear();
            Ok(n)
        }

        fn similarity_count(&self) -> Result<usize> {
            Ok(self.records.lock().len())
        }
    }

    fn ratings(data: &[(u64, u64, f64)]) -> Vec<Rating> {
        data.iter()
            .map(|&(user, movie, value)| Rating::new(user, movie, value).unwrap())
            .collect()
    }

    fn sample_ratings() -> Vec<Rating> {
        ratings(&[
            (1, 1, 5.0), (1, 2, 3.0), (1, 3, 4.0),
            (2, 1, 4.0), (2, 2, 4.0), (2, 3, 2.0),
            (3, 1, 2.0), (3, 2, 5.0), (3, 3, 1.0),
            (4, 4, 3.0),
        ])
    }

    #[test]
    fn test_compute_emits_both_directions() {
        let engine = SimilarityEngine::default();
        let matrix = RatingMatrix::from_ratings(&sample_ratings());
        let records = engine.compute(&matrix);

        let forward = records.iter().find(|r| r.key() == (1, 2)).unwrap();
        let backward = records.iter().find(|r| r.key() == (2, 1)).unwrap();
        assert_eq!(forward.similarity, -0.98);
        assert_eq!(backward.similarity, -0.98);
    }

    #[test]
    fn test_compute_never_emits_self_pairs_or_zeros() {
        let engine = SimilarityEngine::default();
        let matrix = RatingMatrix::from_ratings(&sample_ratings());
        let records = engine.compute(&matrix);

        assert!(!records.is_empty());
        for record in &records {
            assert_ne!(record.movie_id, record.target_movie_id);
            assert_ne!(record.similarity, 0.0);
            assert!(record.validate().is_ok());
        }
        // Movie 4 shares no raters with anything
        assert!(records.iter().all(|r| r.movie_id != 4 && r.target_movie_id != 4));
    }

    #[test]
    fn test_compute_is_sorted() {
        let engine = SimilarityEngine::default();
        let records = engine.compute(&RatingMatrix::from_ratings(&sample_ratings()));
        let keys: Vec<_> = records.iter().map(SimilarityRecord::key).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let mut data = Vec::new();
        for user in 0..40u64 {
            for movie in 0..25u64 {
                if (user * 7 + movie * 3) % 4 != 0 {
                    data.push((user, movie, ((user * movie) % 5 + 1) as f64));
                }
            }
        }
        let matrix = RatingMatrix::from_ratings(&ratings(&data));

        let parallel = SimilarityEngine::new(EngineConfig { parallel: true, ..Default::default() });
        let sequential = SimilarityEngine::new(EngineConfig { parallel: false, ..Default::default() });
        assert_eq!(parallel.compute(&matrix), sequential.compute(&matrix));
    }

    #[test]
    fn test_compute_skips_overflowing_pairs() {
        let engine = SimilarityEngine::default();
        let matrix = RatingMatrix::from_ratings(&ratings(&[
            (1, 1, 1e200), (2, 1, 3e200),
            (1, 2, 2e200), (2, 2, 1e200),
        ]));
        let records = engine.compute(&matrix);
        assert!(records.iter().all(|r| r.similarity.is_finite()));
        assert!(records.is_empty());
    }

    #[test]
    fn test_empty_matrix_yields_nothing() {
        let engine = SimilarityEngine::default();
        assert!(engine.compute(&RatingMatrix::new()).is_empty());
    }

    #[test]
    fn test_run_persists_records() {
        let store = TestStore::with_ratings(sample_ratings());
        let engine = SimilarityEngine::default();

        let report = engine.run(&store).unwrap();
        let expected = engine.compute(&RatingMatrix::from_ratings(&sample_ratings()));

        assert_eq!(report.ratings, 10);
        assert_eq!(report.movies, 4);
        assert_eq!(report.pairs_compared, 10);
        assert_eq!(report.records_written, expected.len());
        assert_eq!(report.failures, 0);
        assert_eq!(store.fetch_all_similarities().unwrap(), expected);
    }

    #[test]
    fn test_run_tolerates_individual_write_failures() {
        let mut store = TestStore::with_ratings(sample_ratings());
        store.reject.insert((1, 2));
        let engine = SimilarityEngine::default();

        let report = engine.run(&store).unwrap();
        let stored = store.fetch_all_similarities().unwrap();

        assert_eq!(report.failures, 1);
        assert_eq!(report.records_written, stored.len());
        assert!(stored.iter().all(|r| r.key() != (1, 2)));
        // Writes after the failed one still happened
        assert!(stored.iter().any(|r| r.key() == (2, 1)));
    }

    #[test]
    fn test_run_replaces_previous_records() {
        let store = TestStore::with_ratings(sample_ratings());
        store.records.lock().push(SimilarityRecord::new(90, 91, 0.5).unwrap());
        let engine = SimilarityEngine::default();

        let first = engine.run(&store).unwrap();
        assert_eq!(first.records_cleared, 1);
        let after_first = store.fetch_all_similarities().unwrap();
        assert!(after_first.iter().all(|r| r.movie_id != 90));

        let second = engine.run(&store).unwrap();
        assert_eq!(second.records_cleared, after_first.len());
        assert_eq!(store.fetch_all_similarities().unwrap(), after_first);
    }

    #[test]
    fn test_run_respects_rating_limit() {
        let store = TestStore::with_ratings(sample_ratings());
        let engine = SimilarityEngine::new(EngineConfig { rating_limit: Some(4), parallel: false });

        let report = engine.run(&store).unwrap();
        assert_eq!(report.ratings, 4);
    }

    #[test]
    fn test_run_rejects_corrupt_rating() {
        let mut data = sample_ratings();
        data.push(Rating { user_id: 9, movie_id: 1, rating: f64::NAN, date: None });
        let store = TestStore::with_ratings(data);

        let err = SimilarityEngine::default().run(&store).unwrap_err();
        assert!(matches!(err, Error::DataShape { .. }));
        assert_eq!(store.similarity_count().unwrap(), 0);
    }
}
