use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use tracing::{info, instrument};

use super::{
    dto::{CreateReviewRequest, CreatedReviewResponse, OutcomeResponse, UpdateReviewRequest},
    repo,
    repo_types::ReviewSummary,
};
use crate::{errors::ApiError, state::AppState};

pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/reviews", get(list_reviews))
        .route("/reviews/nueva", post(create_review))
        .route("/reviews/actualizar/:id", put(update_review))
        .route("/reviews/borrar/:id", delete(delete_review))
}

#[instrument(skip(state))]
pub async fn list_reviews(
    State(state): State<AppState>,
) -> Result<Json<Vec<ReviewSummary>>, ApiError> {
    let reviews = repo::list(state.store.as_ref()).await?;
    Ok(Json(reviews))
}

#[instrument(skip(state, payload))]
pub async fn create_review(
    State(state): State<AppState>,
    payload: Result<Json<CreateReviewRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedReviewResponse>), ApiError> {
    let Json(payload) = payload?;
    let req = payload.validate()?;
    let id = repo::create(
        state.store.as_ref(),
        &req.user_id,
        &req.movie_id,
        &req.review,
        req.rating,
        req.favorite,
    )
    .await?;

    info!(review_id = %id, user_id = %req.user_id, movie_id = %req.movie_id, "review created");
    Ok((StatusCode::CREATED, Json(CreatedReviewResponse { id })))
}

#[instrument(skip(state, payload))]
pub async fn update_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateReviewRequest>, JsonRejection>,
) -> Result<Json<OutcomeResponse>, ApiError> {
    let Json(payload) = payload?;
    let req = payload.validate()?;
    let modified = repo::update(state.store.as_ref(), &id, &req.review, req.rating, req.favorite)
        .await?;

    info!(review_id = %id, modified, "review update");
    Ok(Json(OutcomeResponse::from_count(modified)))
}

#[instrument(skip(state))]
pub async fn delete_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<OutcomeResponse>, ApiError> {
    let deleted = repo::delete(state.store.as_ref(), &id).await?;

    info!(review_id = %id, deleted, "review delete");
    Ok(Json(OutcomeResponse::from_count(deleted)))
}
