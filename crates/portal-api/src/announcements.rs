use axum::{Json, extract::State};
use tracing::info;

use portal_db::models::AnnouncementRow;
use portal_types::api::{AnnouncementResponse, NewAnnouncement};

use crate::{ApiError, AppState};

pub async fn list_announcements(
    State(state): State<AppState>,
) -> Result<Json<Vec<AnnouncementResponse>>, ApiError> {
    let db = state.clone();
    let rows = tokio::task::spawn_blocking(move || db.db.list_announcements())
        .await?
        .map_err(ApiError::ReadFailed)?;

    Ok(Json(rows.into_iter().map(to_response).collect()))
}

/// Persist one announcement. The insert runs in its own transaction; a
/// failed commit is rolled back and reported without detail.
pub async fn create_announcement(
    State(state): State<AppState>,
    Json(req): Json<NewAnnouncement>,
) -> Result<Json<AnnouncementResponse>, ApiError> {
    // Run blocking DB insert off the async runtime
    let db = state.clone();
    let row = tokio::task::spawn_blocking(move || {
        db.db.create_announcement(
            &req.author,
            &req.tag,
            &req.description,
            req.img_url.as_deref(),
        )
    })
    .await?
    .map_err(ApiError::CommitFailed)?;

    info!(id = row.id, tag = %row.tag, "Announcement created");
    Ok(Json(to_response(row)))
}

fn to_response(row: AnnouncementRow) -> AnnouncementResponse {
    AnnouncementResponse {
        id: row.id,
        author: row.author,
        tag: row.tag,
        description: row.description,
        img_url: row.img_url,
    }
}
