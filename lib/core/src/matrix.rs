use std::collections::BTreeMap;
use crate::rating::{MovieId, Rating, UserId};

/// Ratings reshaped by movie: `movie -> (user -> rating)`.
///
/// Both levels are ordered so that iteration, and therefore every result
/// derived from it, is deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RatingMatrix {
    movies: BTreeMap<MovieId, BTreeMap<UserId, f64>>,
}

impl RatingMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the matrix from a batch of ratings.
    ///
    /// A later rating for the same (movie, user) pair overwrites the earlier one.
    pub fn from_ratings(ratings: &[Rating]) -> Self {
        let mut matrix = Self::new();
        for rating in ratings {
            matrix.insert(rating.movie_id, rating.user_id, rating.rating);
        }
        matrix
    }

    /// Insert one rating, replacing any previous value for the pair
    pub fn insert(&mut self, movie_id: MovieId, user_id: UserId, rating: f64) {
        self.movies.entry(movie_id).or_default().insert(user_id, rating);
    }

    /// Movie ids in ascending order
    pub fn movies(&self) -> impl Iterator<Item = MovieId> + '_ {
        self.movies.keys().copied()
    }

    pub fn ratings_for(&self, movie_id: MovieId) -> Option<&BTreeMap<UserId, f64>> {
        self.movies.get(&movie_id)
    }

    pub fn movie_count(&self) -> usize {
        self.movies.len()
    }

    pub fn rating_count(&self) -> usize {
        self.movies.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    /// Users who rated both movies, ascending.
    /// Empty when either movie is unknown.
    pub fn mutual_raters(&self, x: MovieId, y: MovieId) -> Vec<UserId> {
        let (Some(xs), Some(ys)) = (self.movies.get(&x), self.movies.get(&y)) else {
            return Vec::new();
        };

        // Walk the smaller map and probe the larger one
        let (small, large) = if xs.len() <= ys.len() { (xs, ys) } else { (ys, xs) };
        small
            .keys()
            .filter(|user| large.contains_key(user))
            .copied()
            .collect()
    }

    /// The two movies' ratings for `users`, aligned by position
    pub fn aligned_vectors(&self, x: MovieId, y: MovieId, users: &[UserId]) -> (Vec<f64>, Vec<f64>) {
        let pick = |movie: MovieId| -> Vec<f64> {
            match self.movies.get(&movie) {
                Some(row) => users.iter().filter_map(|u| row.get(u).copied()).collect(),
                None => Vec::new(),
            }
        };
        (pick(x), pick(y))
    }
}
