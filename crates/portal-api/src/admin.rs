use axum::{Json, extract::State};
use tracing::{info, warn};

use portal_types::api::MessageResponse;

use crate::{ApiError, AppState};

/// Drop and recreate every table, then seed again. Unauthenticated.
pub async fn reset_database(
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, ApiError> {
    warn!("Database reset requested");

    let db = state.clone();
    let report = tokio::task::spawn_blocking(move || db.db.reset(&db.seed))
        .await?
        .map_err(ApiError::ResetFailed)?;

    info!(
        announcements = report.announcements,
        users = report.users,
        "Database reset complete"
    );

    Ok(Json(MessageResponse {
        message: "Database has been reset".to_string(),
    }))
}
