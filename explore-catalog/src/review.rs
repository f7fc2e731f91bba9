use chrono::NaiveDate;
use explore_core::{CoreError, CoreResult, Record};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Review {
    pub id: u64,
    pub tour_id: u64,
    pub user_name: String,
    pub rating: f64,
    pub comment: String,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewReview {
    pub user_name: String,
    pub rating: f64,
    #[serde(default)]
    pub comment: String,
}

impl NewReview {
    /// The rating range is left open; only non-numeric values are refused.
    pub fn into_review(self, tour_id: u64, date: NaiveDate) -> CoreResult<Review> {
        if !self.rating.is_finite() {
            return Err(CoreError::ValidationError("Rating must be a number".to_string()));
        }
        Ok(Review {
            id: 0,
            tour_id,
            user_name: self.user_name,
            rating: self.rating,
            comment: self.comment,
            date,
        })
    }
}

impl Record for Review {
    type Patch = std::convert::Infallible;

    fn id(&self) -> u64 {
        self.id
    }

    fn set_id(&mut self, id: u64) {
        self.id = id;
    }

    fn apply(&mut self, patch: Self::Patch) {
        match patch {}
    }
}
