use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::{errors::ApiError, store::ObjectId};

/// Body of `POST /reviews/nueva`. Presence is checked by [`CreateReviewRequest::validate`].
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    pub user_id: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub movie_id: Option<String>,
    pub review: Option<String>,
    pub rating: Option<f64>,
    pub favorite: Option<bool>,
}

/// A create request that passed presence checks.
#[derive(Debug, PartialEq)]
pub struct ValidCreate {
    pub user_id: String,
    pub movie_id: String,
    pub review: String,
    pub rating: f64,
    pub favorite: bool,
}

impl CreateReviewRequest {
    pub fn validate(self) -> Result<ValidCreate, ApiError> {
        let missing = || ApiError::BadRequest("Missing required fields to create the review".into());
        Ok(ValidCreate {
            user_id: self.user_id.filter(|s| !s.is_empty()).ok_or_else(missing)?,
            movie_id: self.movie_id.filter(|s| !s.is_empty()).ok_or_else(missing)?,
            review: self.review.filter(|s| !s.is_empty()).ok_or_else(missing)?,
            rating: self.rating.filter(|r| is_set(*r)).ok_or_else(missing)?,
            favorite: self.favorite.unwrap_or(false),
        })
    }
}

/// Body of `PUT /reviews/actualizar/:id`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateReviewRequest {
    pub review: Option<String>,
    pub rating: Option<f64>,
    pub favorite: Option<bool>,
}

#[derive(Debug, PartialEq)]
pub struct ValidUpdate {
    pub review: String,
    pub rating: f64,
    pub favorite: bool,
}

impl UpdateReviewRequest {
    pub fn validate(self) -> Result<ValidUpdate, ApiError> {
        let invalid = || ApiError::BadRequest("Please add a valid review".into());
        Ok(ValidUpdate {
            review: self.review.filter(|s| !s.trim().is_empty()).ok_or_else(invalid)?,
            rating: self.rating.filter(|r| is_set(*r)).ok_or_else(invalid)?,
            favorite: self.favorite.ok_or_else(invalid)?,
        })
    }
}

// zero and NaN count as "no rating given"
fn is_set(rating: f64) -> bool {
    rating != 0.0 && !rating.is_nan()
}

/// Catalog ids arrive as numbers from some clients; they are kept as strings.
fn string_or_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Null) | None => None,
        Some(other) => {
            return Err(serde::de::Error::custom(format!(
                "movieId must be a string or number, got {other}"
            )))
        }
    })
}

#[derive(Debug, Serialize)]
pub struct CreatedReviewResponse {
    pub id: ObjectId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Ok,
    Ko,
}

/// `{resultado: "ok" | "ko"}` for update and delete.
#[derive(Debug, Serialize)]
pub struct OutcomeResponse {
    #[serde(rename = "resultado")]
    pub outcome: Outcome,
}

impl OutcomeResponse {
    pub fn from_count(count: u64) -> Self {
        Self {
            outcome: if count > 0 { Outcome::Ok } else { Outcome::Ko },
        }
    }
}
