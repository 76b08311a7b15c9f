// LMDB-backed store for ratings, movies and similarity records
use anyhow::Result;
use heed::byteorder::BE;
use heed::types::{Bytes, U64};
use heed::{Database, Env, EnvOpenOptions};
use std::path::Path;
use std::sync::Arc;
use webfilmz_core::{
    Error, Movie, MovieId, MovieStore, Rating, RatingStore, SimilarityRecord, SimilarityStore,
    UserId,
};

const DB_RATINGS: &str = "ratings";
const DB_USER_RATINGS: &str = "user_ratings";
const DB_MOVIES: &str = "movies";
const DB_SIMILARITIES: &str = "similarities";

pub const DEFAULT_MAP_SIZE: usize = 10 * 1024 * 1024 * 1024; // 10GB

/// `user ‖ sequence`, big-endian so one user's ratings are contiguous
fn user_rating_key(user_id: UserId, seq: u64) -> [u8; 16] {
    let mut key = [0u8; 16];
    key[..8].copy_from_slice(&user_id.to_be_bytes());
    key[8..].copy_from_slice(&seq.to_be_bytes());
    key
}

/// `source ‖ target`, big-endian so records iterate in (source, target) order
fn similarity_key(movie_id: MovieId, target_movie_id: MovieId) -> [u8; 16] {
    let mut key = [0u8; 16];
    key[..8].copy_from_slice(&movie_id.to_be_bytes());
    key[8..].copy_from_slice(&target_movie_id.to_be_bytes());
    key
}

pub struct LmdbStorage {
    env: Arc<Env>,
    ratings_db: Database<U64<BE>, Bytes>,
    user_ratings_db: Database<Bytes, Bytes>,
    movies_db: Database<U64<BE>, Bytes>,
    similarities_db: Database<Bytes, Bytes>,
}

impl LmdbStorage {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::with_map_size(path, DEFAULT_MAP_SIZE)
    }

    pub fn with_map_size<P: AsRef<Path>>(path: P, map_size: usize) -> Result<Self> {
        std::fs::create_dir_all(&path)?;

        let env = Arc::new(unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(8)
                .open(path)?
        });

        let mut wtxn = env.write_txn()?;
        let ratings_db = env.create_database(&mut wtxn, Some(DB_RATINGS))?;
        let user_ratings_db = env.create_database(&mut wtxn, Some(DB_USER_RATINGS))?;
        let movies_db = env.create_database(&mut wtxn, Some(DB_MOVIES))?;
        let similarities_db = env.create_database(&mut wtxn, Some(DB_SIMILARITIES))?;
        wtxn.commit()?;

        Ok(Self {
            env,
            ratings_db,
            user_ratings_db,
            movies_db,
            similarities_db,
        })
    }

    pub fn put_rating(&self, rating: &Rating) -> Result<u64> {
        self.put_ratings(std::slice::from_ref(rating))
    }

    /// Append ratings in one write transaction, returning the first sequence number
    pub fn put_ratings(&self, ratings: &[Rating]) -> Result<u64> {
        let mut wtxn = self.env.write_txn()?;
        let first = match self.ratings_db.last(&wtxn)? {
            Some((last, _)) => last + 1,
            None => 0,
        };
        for (seq, rating) in (first..).zip(ratings) {
            let data = bincode::serialize(rating)?;
            self.ratings_db.put(&mut wtxn, &seq, &data)?;
            self.user_ratings_db
                .put(&mut wtxn, &user_rating_key(rating.user_id, seq), &data)?;
        }
        wtxn.commit()?;
        Ok(first)
    }

    pub fn get_ratings(&self, limit: Option<usize>) -> Result<Vec<Rating>> {
        let rtxn = self.env.read_txn()?;
        let mut ratings = Vec::new();
        match limit {
            Some(limit) => {
                for result in self.ratings_db.rev_iter(&rtxn)?.take(limit) {
                    let (_, data) = result?;
                    ratings.push(bincode::deserialize(data)?);
                }
                ratings.reverse();
            }
            None => {
                for result in self.ratings_db.iter(&rtxn)? {
                    let (_, data) = result?;
                    ratings.push(bincode::deserialize(data)?);
                }
            }
        }
        Ok(ratings)
    }

    pub fn get_user_ratings(&self, user_id: UserId) -> Result<Vec<Rating>> {
        let rtxn = self.env.read_txn()?;
        let prefix = user_id.to_be_bytes();
        let mut ratings = Vec::new();
        for result in self.user_ratings_db.prefix_iter(&rtxn, &prefix[..])? {
            let (_, data) = result?;
            ratings.push(bincode::deserialize(data)?);
        }
        Ok(ratings)
    }

    pub fn count_ratings(&self) -> Result<usize> {
        let rtxn = self.env.read_txn()?;
        Ok(self.ratings_db.len(&rtxn)? as usize)
    }

    pub fn put_movie(&self, movie: &Movie) -> Result<()> {
        let data = bincode::serialize(movie)?;
        let mut wtxn = self.env.write_txn()?;
        self.movies_db.put(&mut wtxn, &movie.id, &data)?;
        wtxn.commit()?;
        Ok(())
    }

    pub fn get_movies(&self) -> Result<Vec<Movie>> {
        let rtxn = self.env.read_txn()?;
        let mut movies = Vec::new();
        for result in self.movies_db.iter(&rtxn)? {
            let (_, data) = result?;
            movies.push(bincode::deserialize(data)?);
        }
        Ok(movies)
    }

    pub fn put_similarity(&self, record: &SimilarityRecord) -> Result<()> {
        let data = bincode::serialize(record)?;
        let key = similarity_key(record.movie_id, record.target_movie_id);
        let mut wtxn = self.env.write_txn()?;
        self.similarities_db.put(&mut wtxn, &key[..], &data)?;
        wtxn.commit()?;
        Ok(())
    }

    pub fn get_similarities(&self) -> Result<Vec<SimilarityRecord>> {
        let rtxn = self.env.read_txn()?;
        let mut records = Vec::new();
        for result in self.similarities_db.iter(&rtxn)? {
            let (_, data) = result?;
            records.push(bincode::deserialize(data)?);
        }
        Ok(records)
    }

    pub fn clear_similarity_db(&self) -> Result<usize> {
        let mut wtxn = self.env.write_txn()?;
        let removed = self.similarities_db.len(&wtxn)? as usize;
        self.similarities_db.clear(&mut wtxn)?;
        wtxn.commit()?;
        Ok(removed)
    }

    pub fn count_similarities(&self) -> Result<usize> {
        let rtxn = self.env.read_txn()?;
        Ok(self.similarities_db.len(&rtxn)? as usize)
    }
}

fn storage_error(e: anyhow::Error) -> Error {
    Error::Storage(e.to_string())
}

impl RatingStore for LmdbStorage {
    fn insert_rating(&self, rating: &Rating) -> webfilmz_core::Result<()> {
        rating.validate()?;
        self.put_rating(rating).map(|_| ()).map_err(storage_error)
    }

    fn insert_ratings(&self, ratings: &[Rating]) -> webfilmz_core::Result<()> {
        for rating in ratings {
            rating.validate()?;
        }
        self.put_ratings(ratings).map(|_| ()).map_err(storage_error)
    }

    fn fetch_all_ratings(&self, limit: Option<usize>) -> webfilmz_core::Result<Vec<Rating>> {
        let ratings = self.get_ratings(limit).map_err(storage_error)?;
        for rating in &ratings {
            rating.validate()?;
        }
        Ok(ratings)
    }

    fn fetch_ratings_by_user(&self, user_id: UserId) -> webfilmz_core::Result<Vec<Rating>> {
        let ratings = self.get_user_ratings(user_id).map_err(storage_error)?;
        for rating in &ratings {
            rating.validate()?;
        }
        Ok(ratings)
    }

    fn rating_count(&self) -> webfilmz_core::Result<usize> {
        self.count_ratings().map_err(storage_error)
    }
}

impl SimilarityStore for LmdbStorage {
    fn upsert_similarity(&self, record: &SimilarityRecord) -> webfilmz_core::Result<()> {
        record.validate()?;
        self.put_similarity(record)
            .map_err(|e| Error::Persistence(e.to_string()))
    }

    fn fetch_all_similarities(&self) -> webfilmz_core::Result<Vec<SimilarityRecord>> {
        let records = self.get_similarities().map_err(storage_error)?;
        for record in &records {
            record.validate()?;
        }
        Ok(records)
    }

    fn clear_similarities(&self) -> webfilmz_core::Result<usize> {
        self.clear_similarity_db().map_err(storage_error)
    }

    fn similarity_count(&self) -> webfilmz_core::Result<usize> {
        self.count_similarities().map_err(storage_error)
    }
}

impl MovieStore for LmdbStorage {
    fn insert_movie(&self, movie: &Movie) -> webfilmz_core::Result<()> {
        self.put_movie(movie).map_err(storage_error)
    }

    fn fetch_all_movies(&self) -> webfilmz_core::Result<Vec<Movie>> {
        self.get_movies().map_err(storage_error)
    }
}
