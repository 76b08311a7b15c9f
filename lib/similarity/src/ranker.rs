//! Weighted-average ranker
//!
//! Predicts a user's rating for movies they have not seen as the
//! similarity-weighted average of their own ratings, then ranks the
//! predictions.

use ahash::AHashMap;
use std::cmp::Ordering;
use tracing::debug;
use webfilmz_core::{
    MovieId, RankingEntry, Rating, RatingStore, Result, SimilarityRecord, SimilarityStore, UserId,
};

/// Number of recommendations returned by default
pub const DEFAULT_HOWMANY: usize = 10;

/// Running sums for one candidate movie
#[derive(Debug, Clone, Copy)]
struct Candidate {
    movie_id: MovieId,
    score_sum: f64,
    weight_sum: f64,
}

/// Ranks unseen movies for a user from persisted similarity records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ranker {
    howmany: usize,
}

impl Default for Ranker {
    fn default() -> Self {
        Self::new(DEFAULT_HOWMANY)
    }
}

impl Ranker {
    pub fn new(howmany: usize) -> Self {
        Self { howmany }
    }

    pub fn howmany(&self) -> usize {
        self.howmany
    }

    /// Rank candidates for a user, returning at most `howmany` entries
    pub fn rank(&self, user_ratings: &[Rating], records: &[SimilarityRecord]) -> Vec<RankingEntry> {
        self.rank_top(user_ratings, records, self.howmany)
    }

    /// Rank candidates for a user.
    ///
    /// # Arguments
    /// * `user_ratings` - every rating of one user; a movie rated twice keeps
    ///   its first position and its last value
    /// * `records` - the persisted similarity records
    /// * `howmany` - maximum number of entries returned
    ///
    /// # Returns
    /// Movies the user has not rated, by predicted rating descending. Equal
    /// predictions keep the order in which their movies were first reached.
    pub fn rank_top(
        &self,
        user_ratings: &[Rating],
        records: &[SimilarityRecord],
        howmany: usize,
    ) -> Vec<RankingEntry> {
        if howmany == 0 || user_ratings.is_empty() || records.is_empty() {
            return Vec::new();
        }

        let mut rated: AHashMap<MovieId, usize> = AHashMap::with_capacity(user_ratings.len());
        let mut seen: Vec<(MovieId, f64)> = Vec::with_capacity(user_ratings.len());
        for rating in user_ratings {
            match rated.get(&rating.movie_id) {
                Some(&i) => seen[i].1 = rating.rating,
                None => {
                    rated.insert(rating.movie_id, seen.len());
                    seen.push((rating.movie_id, rating.rating));
                }
            }
        }

        let mut by_target: AHashMap<MovieId, Vec<&SimilarityRecord>> = AHashMap::new();
        for record in records {
            by_target.entry(record.target_movie_id).or_default().push(record);
        }

        let mut slots: AHashMap<MovieId, usize> = AHashMap::new();
        let mut candidates: Vec<Candidate> = Vec::new();
        for &(movie_id, rating) in &seen {
            let Some(similar) = by_target.get(&movie_id) else {
                continue;
            };

            for other in similar {
                let candidate_id = other.movie_id;
                if candidate_id == movie_id || rated.contains_key(&candidate_id) {
                    continue;
                }

                let slot = *slots.entry(candidate_id).or_insert_with(|| {
                    candidates.push(Candidate {
                        movie_id: candidate_id,
                        score_sum: 0.0,
                        weight_sum: 0.0,
                    });
                    candidates.len() - 1
                });
                let candidate = &mut candidates[slot];
                candidate.score_sum += rating * other.similarity;
                candidate.weight_sum += other.similarity;
            }
        }

        let mut rankings: Vec<RankingEntry> = candidates
            .into_iter()
            .filter(|c| c.weight_sum != 0.0)
            .map(|c| RankingEntry {
                movie_id: c.movie_id,
                ranking: c.score_sum / c.weight_sum,
            })
            .filter(|entry| entry.ranking.is_finite())
            .collect();

        // Stable: ties keep encounter order
        rankings.sort_by(|a, b| b.ranking.partial_cmp(&a.ranking).unwrap_or(Ordering::Equal));
        rankings.truncate(howmany);
        rankings
    }

    /// Fetch a user's ratings and all similarity records, then rank
    pub fn recommend<S>(&self, store: &S, user_id: UserId) -> Result<Vec<RankingEntry>>
    where
        S: RatingStore + SimilarityStore + ?Sized,
    {
        self.recommend_top(store, user_id, self.howmany)
    }

    pub fn recommend_top<S>(&self, store: &S, user_id: UserId, howmany: usize) -> Result<Vec<RankingEntry>>
    where
        S: RatingStore + SimilarityStore + ?Sized,
    {
        let user_ratings = store.fetch_ratings_by_user(user_id)?;
        for rating in &user_ratings {
            rating.validate()?;
        }
        let records = store.fetch_all_similarities()?;
        for record in &records {
            record.validate()?;
        }

        let rankings = self.rank_top(&user_ratings, &records, howmany);
        debug!(
            user_id,
            rated = user_ratings.len(),
            records = records.len(),
            returned = rankings.len(),
            "Ranked recommendations"
        );
        Ok(rankings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ratings(user: UserId, data: &[(MovieId, f64)]) -> Vec<Rating> {
        data.iter()
            .map(|&(movie, value)| Rating::new(user, movie, value).unwrap())
            .collect()
    }

    fn record(source: MovieId, target: MovieId, similarity: f64) -> SimilarityRecord {
        SimilarityRecord::new(source, target, similarity).unwrap()
    }

    fn ids(entries: &[RankingEntry]) -> Vec<MovieId> {
        entries.iter().map(|e| e.movie_id).collect()
    }

    #[test]
    fn test_single_neighbour() {
        let ranker = Ranker::default();
        let result = ranker.rank(&ratings(1, &[(1, 5.0)]), &[record(2, 1, 0.8)]);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].movie_id, 2);
        assert!((result[0].ranking - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_weighted_average() {
        let ranker = Ranker::default();
        let user = ratings(1, &[(1, 5.0), (2, 1.0)]);
        let records = [record(3, 1, 0.5), record(3, 2, 0.25)];

        let result = ranker.rank(&user, &records);
        // (5 * 0.5 + 1 * 0.25) / 0.75
        assert!((result[0].ranking - 2.75 / 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_rated_movies_never_recommended() {
        let ranker = Ranker::default();
        let user = ratings(1, &[(1, 5.0), (2, 4.0)]);
        let records = [
            record(2, 1, 0.9),
            record(1, 2, 0.9),
            record(3, 1, 0.4),
            record(4, 2, 0.7),
        ];

        let result = ranker.rank(&user, &records);
        assert_eq!(ids(&result), vec![3, 4]);
    }

    #[test]
    fn test_sorted_descending() {
        let ranker = Ranker::default();
        let user = ratings(1, &[(1, 5.0), (2, 1.0)]);
        let records = [
            record(3, 2, 0.9),
            record(4, 1, 0.6),
            record(5, 1, 0.3),
            record(5, 2, 0.3),
        ];

        let result = ranker.rank(&user, &records);
        assert_eq!(ids(&result), vec![4, 5, 3]);
        assert!(result.windows(2).all(|w| w[0].ranking >= w[1].ranking));
    }

    #[test]
    fn test_ties_keep_encounter_order() {
        let ranker = Ranker::default();
        let user = ratings(1, &[(1, 4.0)]);
        let records = [record(7, 1, 0.5), record(3, 1, 0.9), record(5, 1, 0.2)];

        let result = ranker.rank(&user, &records);
        assert_eq!(ids(&result), vec![7, 3, 5]);
    }

    #[test]
    fn test_zero_total_weight_dropped() {
        let ranker = Ranker::default();
        let user = ratings(1, &[(1, 5.0), (2, 3.0)]);
        let records = [record(3, 1, 0.5), record(3, 2, -0.5), record(4, 1, 0.1)];

        let result = ranker.rank(&user, &records);
        assert_eq!(ids(&result), vec![4]);
    }

    #[test]
    fn test_empty_records_yield_nothing() {
        let ranker = Ranker::default();
        assert!(ranker.rank(&ratings(1, &[(1, 5.0), (2, 2.0)]), &[]).is_empty());
    }

    #[test]
    fn test_empty_ratings_yield_nothing() {
        let ranker = Ranker::default();
        assert!(ranker.rank(&[], &[record(2, 1, 0.8)]).is_empty());
    }

    #[test]
    fn test_missing_similarity_contributes_nothing() {
        let ranker = Ranker::default();
        let user = ratings(1, &[(1, 5.0), (99, 1.0)]);
        let result = ranker.rank(&user, &[record(2, 1, 0.8)]);

        assert_eq!(ids(&result), vec![2]);
        assert!((result[0].ranking - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_top_k_bound() {
        let user = ratings(1, &[(1, 4.0)]);
        let records: Vec<_> = (2..30).map(|m| record(m, 1, 0.5)).collect();

        assert_eq!(Ranker::default().rank(&user, &records).len(), DEFAULT_HOWMANY);
        assert_eq!(Ranker::new(3).rank(&user, &records).len(), 3);
        assert!(Ranker::new(0).rank(&user, &records).is_empty());
        assert_eq!(Ranker::new(100).rank(&user, &records).len(), 28);
    }

    #[test]
    fn test_duplicate_rating_last_value_wins() {
        let ranker = Ranker::default();
        let user = ratings(1, &[(1, 1.0), (1, 4.0)]);
        let result = ranker.rank(&user, &[record(2, 1, 0.6)]);

        assert!((result[0].ranking - 4.0).abs() < 1e-12);
    }
}
