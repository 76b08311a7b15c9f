//! # webfilmz API
//!
//! REST endpoints for the webfilmz recommender:
//!
//! - `GET /movies` - the movie catalogue
//! - `GET /recommendations/{user_id}?limit=N` - ranked unseen movies for a user
//! - `GET /tools/import-data` - import the tab-separated dataset
//! - `GET /tools/build-comparison` - recompute every movie-to-movie similarity

pub mod rest;

pub use rest::{configure, AppState, RestApi};
