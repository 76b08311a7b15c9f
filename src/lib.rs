//! # webfilmz
//!
//! Item-to-item movie recommendations from sparse user ratings.
//!
//! webfilmz correlates every pair of movies over the users who rated both
//! (Pearson), persists the non-zero pairs, and ranks a user's unseen movies
//! by the similarity-weighted average of their own ratings.
//!
//! ## Quick Start
//!
//! ### As a Server
//!
//! ```bash
//! webfilmz --data-dir ./data import --dataset-dir ./dataset
//! webfilmz --data-dir ./data build-comparison
//! webfilmz --data-dir ./data serve --http-port 8337
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use webfilmz::prelude::*;
//!
//! let storage = StorageManager::in_memory();
//! let store = storage.store();
//! for (user, movie, value) in [(1, 1, 5.0), (1, 2, 3.0), (2, 1, 4.0), (2, 2, 4.0), (3, 1, 2.0), (3, 2, 5.0)] {
//!     store.insert_rating(&Rating::new(user, movie, value).unwrap()).unwrap();
//! }
//!
//! let report = SimilarityEngine::default().run(store).unwrap();
//! assert_eq!(report.records_written, 2);
//!
//! store.insert_rating(&Rating::new(9, 1, 4.0).unwrap()).unwrap();
//! let ranked = Ranker::default().recommend(store, 9).unwrap();
//! assert_eq!(ranked[0].movie_id, 2);
//! ```
//!
//! ## Crate Structure
//!
//! - `webfilmz-core` - Data model (Rating, SimilarityRecord, RatingMatrix) and store traits
//! - `webfilmz-similarity` - Pearson similarity engine and weighted-average ranker
//! - `webfilmz-storage` - In-memory and LMDB stores, dataset import
//! - `webfilmz-api` - REST API

// Re-export core types
pub use webfilmz_core::{
    Rating, Movie, SimilarityRecord, RankingEntry, RatingMatrix,
    RatingStore, SimilarityStore, MovieStore, Store,
    UserId, MovieId,
    Error, Result,
};

// Re-export the engine and ranker
pub use webfilmz_similarity::{SimilarityEngine, EngineConfig, EngineReport, Ranker};

// Re-export storage
pub use webfilmz_storage::{StorageManager, ImportReport};

// Re-export API
pub use webfilmz_api::{RestApi, AppState};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Rating, Movie, SimilarityRecord, RankingEntry, RatingMatrix,
        RatingStore, SimilarityStore, MovieStore, Store,
        UserId, MovieId,
        Error, Result,
        SimilarityEngine, EngineConfig, EngineReport, Ranker,
        StorageManager, ImportReport,
        RestApi, AppState,
    };
}
