use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    errors::ApiError,
    profile::{get_profile, Profile},
    sessions::{
        extractors::{expired_session_cookie, session_cookie},
        CurrentSession, Session,
    },
    state::AppState,
    users::{
        dto::{LoginRequest, LoginResponse},
        repo_types::User,
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    let user = User::find(
        state.store.as_ref(),
        state.config.password_scheme,
        &payload.username,
        &payload.password,
    )
    .await?
    .ok_or_else(|| {
        warn!(username = %payload.username, "login rejected");
        ApiError::NotFound("User not found or incorrect password".into())
    })?;

    let user_id = user.id;
    let profile = get_profile(state.store.as_ref(), &user_id.to_string()).await?;
    let token = state.sessions.insert(Session::new(user)).await;

    info!(%user_id, "user logged in");
    Ok((
        [(header::SET_COOKIE, session_cookie(token))],
        Json(LoginResponse {
            message: "Authentication successful".into(),
            user: profile,
        }),
    ))
}

#[instrument(skip(state, current))]
pub async fn logout(State(state): State<AppState>, current: CurrentSession) -> impl IntoResponse {
    state.sessions.remove(current.token).await;
    info!(user_id = %current.session.user.id, since = %current.session.created_at, "user logged out");
    (
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, expired_session_cookie())],
    )
}

#[instrument(skip(state, current))]
pub async fn me(
    State(state): State<AppState>,
    current: CurrentSession,
) -> Result<Json<Profile>, ApiError> {
    let profile = get_profile(state.store.as_ref(), &current.session.user.id.to_string()).await?;
    Ok(Json(profile))
}
