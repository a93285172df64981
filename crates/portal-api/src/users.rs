use axum::{
    Json,
    extract::{Path, State},
};

use portal_db::models::{UserDetail, UserRow};
use portal_types::api::{UserResponse, UserSummary};

use crate::{ApiError, AppState};

pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<Vec<UserSummary>>, ApiError> {
    let db = state.clone();
    let rows = tokio::task::spawn_blocking(move || db.db.list_users())
        .await?
        .map_err(ApiError::ReadFailed)?;

    Ok(Json(rows.into_iter().map(to_summary).collect()))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<UserResponse>, ApiError> {
    let db = state.clone();
    let detail = tokio::task::spawn_blocking(move || db.db.get_user(id))
        .await?
        .map_err(ApiError::ReadFailed)?
        .ok_or(ApiError::UserNotFound)?;

    let UserDetail {
        user,
        student_ids,
        mentor_ids,
        mentee_ids,
        teammate_ids,
    } = detail;

    Ok(Json(UserResponse {
        user: to_summary(user),
        student_ids,
        mentor_ids,
        mentee_ids,
        teammate_ids,
    }))
}

// Drops the password hash.
fn to_summary(row: UserRow) -> UserSummary {
    UserSummary {
        id: row.id,
        name: row.name,
        role: row.role,
        img_url: row.img_url,
        linkedin_url: row.linkedin_url,
        github_url: row.github_url,
        website_url: row.website_url,
        resume_url: row.resume_url,
        teacher_id: row.teacher_id,
    }
}
