//! # webfilmz Core
//!
//! Core data model for the webfilmz recommender.
//!
//! This crate provides the types shared by the similarity engine, the ranker
//! and the storage backends:
//!
//! - [`Rating`] - one user's rating of one movie
//! - [`RatingMatrix`] - ratings reshaped as `movie -> user -> rating`
//! - [`SimilarityRecord`] - a persisted, directional movie-to-movie similarity
//! - [`RankingEntry`] - one recommended movie with its predicted rating
//! - [`Movie`] - catalogue metadata
//! - [`store`] - the storage traits the engine and ranker consume
//!
//! ## Example
//!
//! ```rust
//! use webfilmz_core::{Rating, RatingMatrix};
//!
//! let ratings = vec![
//!     Rating::new(1, 10, 5.0).unwrap(),
//!     Rating::new(1, 20, 3.0).unwrap(),
//!     Rating::new(2, 10, 4.0).unwrap(),
//! ];
//! let matrix = RatingMatrix::from_ratings(&ratings);
//!
//! assert_eq!(matrix.movie_count(), 2);
//! assert_eq!(matrix.mutual_raters(10, 20), vec![1]);
//! ```

pub mod error;
pub mod rating;
pub mod movie;
pub mod matrix;
pub mod recommendation;
pub mod store;

pub use error::{Error, Result};
pub use rating::{Rating, UserId, MovieId};
pub use movie::{Movie, ImdbInfo, RottenTomatoesInfo};
pub use matrix::RatingMatrix;
pub use recommendation::{SimilarityRecord, RankingEntry, round_to_hundredths};
pub use store::{RatingStore, SimilarityStore, MovieStore, Store};
