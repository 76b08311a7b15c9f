//! # webfilmz Similarity
//!
//! Item-to-item collaborative filtering for webfilmz.
//!
//! ## Features
//!
//! - **Pearson statistics**: correlation restricted to the users two movies share
//! - **Similarity engine**: batch job correlating every pair of movies
//! - **Ranker**: similarity-weighted average of a user's own ratings
//!
//! Both the engine and the ranker are pure functions over already-fetched
//! collections; `run` / `recommend` wrap them with store access.
//!
//! ## Example
//!
//! ```rust
//! use webfilmz_core::{Rating, RatingMatrix};
//! use webfilmz_similarity::{Ranker, SimilarityEngine};
//!
//! let ratings = vec![
//!     Rating::new(1, 1, 5.0).unwrap(), Rating::new(1, 2, 3.0).unwrap(),
//!     Rating::new(2, 1, 4.0).unwrap(), Rating::new(2, 2, 4.0).unwrap(),
//!     Rating::new(3, 1, 2.0).unwrap(), Rating::new(3, 2, 5.0).unwrap(),
//!     Rating::new(3, 3, 4.0).unwrap(), Rating::new(2, 3, 3.0).unwrap(),
//! ];
//! let records = SimilarityEngine::default().compute(&RatingMatrix::from_ratings(&ratings));
//!
//! let user = vec![Rating::new(9, 2, 4.0).unwrap()];
//! let ranked = Ranker::default().rank(&user, &records);
//! assert!(ranked.iter().all(|entry| entry.movie_id != 2));
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Ratings   │────>│   Engine    │────>│ Similarity  │
//! │   (store)   │     │  (Pearson)  │     │  records    │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!       │                                        │
//!       │ user ratings   ┌─────────────┐         │
//!       └───────────────>│   Ranker    │<────────┘
//!                        └─────────────┘
//!                               │
//!                        ┌─────────────┐
//!                        │  Rankings   │
//!                        └─────────────┘
//! ```

pub mod pearson;
pub mod engine;
pub mod ranker;

pub use pearson::{pearson, pearson_correlation};
pub use engine::{SimilarityEngine, EngineConfig, EngineReport, DEFAULT_RATING_LIMIT};
pub use ranker::{Ranker, DEFAULT_HOWMANY};
