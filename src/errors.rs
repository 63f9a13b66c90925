use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::store::InvalidObjectId;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure kinds of the data-access layer.
///
/// "Nothing found" is never an error here: lookups return `None` and
/// update/delete report a zero count.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("invalid identifier: {0}")]
    Validation(String),

    #[error("data store unreachable")]
    Connection(#[source] BoxError),

    #[error("data store operation failed")]
    Store(#[source] BoxError),
}

impl RepoError {
    pub fn connection(e: impl Into<BoxError>) -> Self {
        Self::Connection(e.into())
    }

    pub fn store(e: impl Into<BoxError>) -> Self {
        Self::Store(e.into())
    }

    fn cause(&self) -> Option<String> {
        std::error::Error::source(self).map(|e| e.to_string())
    }
}

impl From<InvalidObjectId> for RepoError {
    fn from(e: InvalidObjectId) -> Self {
        Self::Validation(e.0)
    }
}

/// Wire shape of every error response: `{error, details?}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Repo(#[from] RepoError),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Upstream(String),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Repo(RepoError::Validation(_)) | ApiError::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Repo(RepoError::Connection(_)) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Repo(RepoError::Store(_)) | ApiError::Upstream(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    pub fn body(&self) -> ErrorBody {
        match self {
            ApiError::Repo(RepoError::Validation(id)) => ErrorBody {
                error: self.to_string(),
                details: Some(Value::String(id.clone())),
            },
            ApiError::Repo(e) => ErrorBody {
                error: e.to_string(),
                details: e.cause().map(Value::String),
            },
            other => ErrorBody {
                error: other.to_string(),
                details: None,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = self.body();
        if status.is_server_error() {
            tracing::error!(%status, error = %body.error, details = ?body.details, "request failed");
        }
        (status, Json(body)).into_response()
    }
}
