use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::error;

use portal_types::api::ErrorResponse;

/// Handler failures. Clients only ever see the fixed `detail` text; the
/// wrapped cause goes to the log.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("database commit failed")]
    CommitFailed(#[source] anyhow::Error),

    #[error("database reset failed")]
    ResetFailed(#[source] anyhow::Error),

    #[error("database read failed")]
    ReadFailed(#[source] anyhow::Error),

    #[error("user not found")]
    UserNotFound,

    #[error("spawn_blocking join error")]
    Join(#[from] tokio::task::JoinError),
}

impl ApiError {
    fn status_and_detail(&self) -> (StatusCode, &'static str) {
        match self {
            Self::CommitFailed(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Database commit failed"),
            Self::ResetFailed(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Database reset failed"),
            Self::ReadFailed(_) | Self::Join(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            Self::UserNotFound => (StatusCode::NOT_FOUND, "User not found"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = self.status_and_detail();

        match &self {
            Self::CommitFailed(e) | Self::ResetFailed(e) | Self::ReadFailed(e) => {
                error!("{}: {:#}", self, e)
            }
            Self::Join(e) => error!("{}: {}", self, e),
            Self::UserNotFound => {}
        }

        (
            status,
            Json(ErrorResponse {
                detail: detail.to_string(),
            }),
        )
            .into_response()
    }
}
