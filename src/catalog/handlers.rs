use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::{error, instrument};

use crate::{errors::ApiError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "first_page")]
    pub page: u32,
}
fn first_page() -> u32 {
    1
}

pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/api/genres", get(genres))
        .route("/api/popular_movies", get(popular_movies))
        .route("/api/now_playing_movies", get(now_playing_movies))
        .route("/api/movie/:id", get(movie))
        .route("/api/movie/:id/recommendations", get(recommendations))
}

fn upstream(message: &'static str) -> impl FnOnce(anyhow::Error) -> ApiError {
    move |e| {
        error!(error = ?e, "{message}");
        ApiError::Upstream(message.into())
    }
}

#[instrument(skip(state))]
pub async fn genres(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let body = state
        .catalog
        .genres()
        .await
        .map_err(upstream("Error fetching genres from TMDb"))?;
    Ok(Json(body))
}

#[instrument(skip(state))]
pub async fn popular_movies(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let body = state
        .catalog
        .popular()
        .await
        .map_err(upstream("Error fetching popular movies from TMDb"))?;
    Ok(Json(body))
}

#[instrument(skip(state))]
pub async fn now_playing_movies(
    State(state): State<AppState>,
    Query(q): Query<PageQuery>,
) -> Result<Json<Value>, ApiError> {
    let body = state
        .catalog
        .now_playing(q.page)
        .await
        .map_err(upstream("Error fetching now playing movies from TMDb"))?;
    Ok(Json(body))
}

#[instrument(skip(state))]
pub async fn movie(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let body = state
        .catalog
        .movie(&id)
        .await
        .map_err(upstream("Error fetching movie details"))?;
    Ok(Json(body))
}

#[instrument(skip(state))]
pub async fn recommendations(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let body = state
        .catalog
        .recommendations(&id)
        .await
        .map_err(upstream("Error fetching recommendations"))?;
    Ok(Json(body))
}
