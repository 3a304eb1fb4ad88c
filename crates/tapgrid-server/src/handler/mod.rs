pub mod leaderboard;

use axum::{
    Json, Router,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::task::JoinError;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::service::leaderboard::{LeaderboardStore, StoreError};

/// JSON body returned with every error status.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Malformed request: {0}")]
    Malformed(#[from] JsonRejection),

    #[error("Leaderboard task failed: {0}")]
    Task(#[from] JoinError),
}

impl ApiError {
    fn to_status(&self) -> StatusCode {
        match self {
            ApiError::Store(err) => err.to_status(),
            ApiError::Malformed(_) => StatusCode::BAD_REQUEST,
            ApiError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Store(err) => err.into_response(),
            malformed @ ApiError::Malformed(_) => {
                tracing::debug!(error = %malformed, "Rejected request body");
                (malformed.to_status(), Json(ErrorBody::new(malformed.to_string())))
                    .into_response()
            }
            failed @ ApiError::Task(_) => {
                tracing::error!(error = %failed, "Leaderboard task did not complete");
                (failed.to_status(), Json(ErrorBody::new(failed.to_string()))).into_response()
            }
        }
    }
}

pub fn router(store: LeaderboardStore, cors: CorsLayer) -> Router {
    Router::new()
        .route("/api/leaderboard", get(leaderboard::get_top).post(leaderboard::submit))
        .with_state(store)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_failed_task_is_server_error() {
        let join_err = tokio::task::spawn_blocking::<_, ()>(|| panic!("store task panicked"))
            .await
            .unwrap_err();
        let response = ApiError::from(join_err).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
