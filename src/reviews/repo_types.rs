use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

use crate::{errors::RepoError, store::ObjectId};

/// Review document as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub user_id: ObjectId,
    pub movie_id: String,
    pub review: String,
    pub rating: f64,
    pub favorite: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
}

/// Projection returned by the review listing; owner and date are dropped.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSummary {
    pub id: ObjectId,
    pub movie_id: String,
    pub review: String,
    pub rating: f64,
    pub favorite: bool,
}

impl From<Review> for ReviewSummary {
    fn from(r: Review) -> Self {
        Self {
            id: r.id,
            movie_id: r.movie_id,
            review: r.review,
            rating: r.rating,
            favorite: r.favorite,
        }
    }
}

/// Review about to be inserted; the store assigns the identifier.
#[derive(Debug, Clone)]
pub struct NewReview {
    pub user_id: ObjectId,
    pub movie_id: String,
    pub review: String,
    pub rating: f64,
    pub favorite: bool,
    pub date: OffsetDateTime,
}

impl NewReview {
    pub fn into_review(self, id: ObjectId) -> Review {
        Review {
            id,
            user_id: self.user_id,
            movie_id: self.movie_id,
            review: self.review,
            rating: self.rating,
            favorite: self.favorite,
            date: self.date,
        }
    }
}

/// The mutable part of a review.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewChanges {
    pub review: String,
    pub rating: f64,
    pub favorite: bool,
}

/// Row of the `reviews` table.
#[derive(Debug, FromRow)]
pub struct ReviewRow {
    pub id: String,
    pub user_id: String,
    pub movie_id: String,
    pub review: String,
    pub rating: f64,
    pub favorite: bool,
    pub date: OffsetDateTime,
}

impl TryFrom<ReviewRow> for Review {
    type Error = RepoError;

    fn try_from(r: ReviewRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id.parse().map_err(RepoError::store)?,
            user_id: r.user_id.parse().map_err(RepoError::store)?,
            movie_id: r.movie_id,
            review: r.review,
            rating: r.rating,
            favorite: r.favorite,
            date: r.date,
        })
    }
}
