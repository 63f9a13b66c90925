use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use tracing::warn;
use uuid::Uuid;

use super::store::Session;
use crate::{errors::ApiError, state::AppState};

pub const SESSION_COOKIE: &str = "sid";

/// `Set-Cookie` value carrying a session token.
pub fn session_cookie(token: Uuid) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax")
}

/// `Set-Cookie` value that clears the session cookie.
pub fn expired_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

fn token_from_cookies(parts: &Parts) -> Option<Uuid> {
    parts
        .headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .flat_map(|h| h.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value).ok())
}

/// Resolves the session cookie to a live session.
pub struct CurrentSession {
    pub token: Uuid,
    pub session: Session,
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = token_from_cookies(parts)
            .ok_or_else(|| ApiError::Unauthorized("Not logged in".into()))?;

        match state.sessions.get(token).await {
            Some(session) => Ok(CurrentSession { token, session }),
            None => {
                warn!("unknown or expired session");
                Err(ApiError::Unauthorized("Not logged in".into()))
            }
        }
    }
}
