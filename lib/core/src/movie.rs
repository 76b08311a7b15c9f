use serde::{Deserialize, Serialize};
use crate::rating::MovieId;

/// A movie in the catalogue
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub imdb: Option<ImdbInfo>,
    #[serde(default)]
    pub rotten_tomatoes: Option<RottenTomatoesInfo>,
}

impl Movie {
    pub fn new(id: MovieId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            year: None,
            imdb: None,
            rotten_tomatoes: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImdbInfo {
    pub id: Option<u64>,
    pub picture_url: Option<String>,
}

/// Critic and audience figures from Rotten Tomatoes.
/// Every figure is optional; the source data leaves many blank.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RottenTomatoesInfo {
    pub id: Option<String>,
    pub all_critics_rating: Option<f64>,
    pub all_critics_num_reviews: Option<u32>,
    pub all_critics_num_fresh: Option<u32>,
    pub all_critics_num_rotten: Option<u32>,
    pub all_critics_score: Option<f64>,
    pub top_critics_rating: Option<f64>,
    pub top_critics_num_reviews: Option<u32>,
    pub top_critics_num_fresh: Option<u32>,
    pub top_critics_num_rotten: Option<u32>,
    pub audience_rating: Option<f64>,
    pub audience_num_ratings: Option<u32>,
}
