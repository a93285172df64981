//! Database row types. These map directly to SQLite rows.
//! Distinct from portal-types API models to keep the DB layer independent.

use portal_types::models::Role;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnouncementRow {
    pub id: i64,
    pub author: String,
    pub tag: String,
    pub description: String,
    pub img_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRow {
    pub id: i64,
    pub name: String,
    /// Argon2 PHC string.
    pub password: String,
    pub role: Role,
    pub img_url: String,
    pub linkedin_url: String,
    pub github_url: String,
    pub website_url: Option<String>,
    pub resume_url: Option<String>,
    pub teacher_id: Option<i64>,
}

/// A user plus the ids on the other end of each of its relationships.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDetail {
    pub user: UserRow,
    pub student_ids: Vec<i64>,
    pub mentor_ids: Vec<i64>,
    pub mentee_ids: Vec<i64>,
    pub teammate_ids: Vec<i64>,
}
