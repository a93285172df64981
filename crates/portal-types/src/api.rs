use serde::{Deserialize, Serialize};

use crate::models::Role;

// -- Announcements --

/// Body of `POST /announcements/new`. Older clients send `user_name`
/// instead of `author`; both are accepted.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAnnouncement {
    #[serde(alias = "user_name")]
    pub author: String,
    pub tag: String,
    pub description: String,
    #[serde(default)]
    pub img_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncementResponse {
    pub id: i64,
    pub author: String,
    pub tag: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img_url: Option<String>,
}

// -- Users --

/// A user as listed by `GET /users`. The password hash never leaves the
/// storage layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: i64,
    pub name: String,
    pub role: Role,
    pub img_url: String,
    pub linkedin_url: String,
    pub github_url: String,
    #[serde(default)]
    pub website_url: Option<String>,
    #[serde(default)]
    pub resume_url: Option<String>,
    #[serde(default)]
    pub teacher_id: Option<i64>,
}

/// A user together with every relationship it takes part in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[serde(flatten)]
    pub user: UserSummary,
    pub student_ids: Vec<i64>,
    pub mentor_ids: Vec<i64>,
    pub mentee_ids: Vec<i64>,
    pub teammate_ids: Vec<i64>,
}

// -- Admin --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Error body, shaped like `{"detail": "..."}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}
