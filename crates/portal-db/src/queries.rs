use crate::Database;
use crate::models::{AnnouncementRow, UserDetail, UserRow};
use anyhow::{Result, anyhow};
use portal_types::models::Role;
use rusqlite::types::Type;
use rusqlite::{Connection, Row};

const USER_COLUMNS: &str = "id, name, password, role, img_url, linkedin_url, github_url, website_url, resume_url, teacher_id";

impl Database {
    // -- Announcements --

    pub fn list_announcements(&self) -> Result<Vec<AnnouncementRow>> {
        self.with_conn(query_announcements)
    }

    /// Insert one announcement and return it as stored, id included.
    pub fn create_announcement(
        &self,
        author: &str,
        tag: &str,
        description: &str,
        img_url: Option<&str>,
    ) -> Result<AnnouncementRow> {
        self.with_tx(|tx| {
            let id = insert_announcement(tx, author, tag, description, img_url)?;
            query_announcement_by_id(tx, id)?
                .ok_or_else(|| anyhow!("Announcement {} missing after insert", id))
        })
    }

    pub fn count_announcements(&self) -> Result<i64> {
        self.with_conn(|conn| {
            Ok(conn.query_row("SELECT COUNT(*) FROM announcements", [], |row| row.get(0))?)
        })
    }

    // -- Users --

    pub fn list_users(&self) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY id");
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], user_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_user(&self, id: i64) -> Result<Option<UserDetail>> {
        self.with_conn(|conn| {
            let Some(user) = query_user_by_id(conn, id)? else {
                return Ok(None);
            };

            Ok(Some(UserDetail {
                student_ids: query_ids(conn, "SELECT id FROM users WHERE teacher_id = ?1 ORDER BY id", id)?,
                mentor_ids: query_ids(
                    conn,
                    "SELECT mentor_id FROM mentor_links WHERE mentee_id = ?1 ORDER BY mentor_id",
                    id,
                )?,
                mentee_ids: query_ids(
                    conn,
                    "SELECT mentee_id FROM mentor_links WHERE mentor_id = ?1 ORDER BY mentee_id",
                    id,
                )?,
                teammate_ids: query_ids(
                    conn,
                    "SELECT teammate_id FROM teammate_links WHERE user_id = ?1 ORDER BY teammate_id",
                    id,
                )?,
                user,
            }))
        })
    }
}

pub(crate) fn insert_announcement(
    conn: &Connection,
    author: &str,
    tag: &str,
    description: &str,
    img_url: Option<&str>,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO announcements (author, tag, description, img_url) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![author, tag, description, img_url],
    )?;
    Ok(conn.last_insert_rowid())
}

fn announcement_from_row(row: &Row<'_>) -> rusqlite::Result<AnnouncementRow> {
    Ok(AnnouncementRow {
        id: row.get(0)?,
        author: row.get(1)?,
        tag: row.get(2)?,
        description: row.get(3)?,
        img_url: row.get(4)?,
    })
}

fn query_announcements(conn: &Connection) -> Result<Vec<AnnouncementRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, author, tag, description, img_url FROM announcements ORDER BY id",
    )?;

    let rows = stmt
        .query_map([], announcement_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn query_announcement_by_id(conn: &Connection, id: i64) -> Result<Option<AnnouncementRow>> {
    conn.query_row(
        "SELECT id, author, tag, description, img_url FROM announcements WHERE id = ?1",
        [id],
        announcement_from_row,
    )
    .optional()
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    let role: String = row.get(3)?;
    let role = role
        .parse::<Role>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?;

    Ok(UserRow {
        id: row.get(0)?,
        name: row.get(1)?,
        password: row.get(2)?,
        role,
        img_url: row.get(4)?,
        linkedin_url: row.get(5)?,
        github_url: row.get(6)?,
        website_url: row.get(7)?,
        resume_url: row.get(8)?,
        teacher_id: row.get(9)?,
    })
}

fn query_user_by_id(conn: &Connection, id: i64) -> Result<Option<UserRow>> {
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1");
    conn.query_row(&sql, [id], user_from_row).optional()
}

fn query_ids(conn: &Connection, sql: &str, id: i64) -> Result<Vec<i64>> {
    let mut stmt = conn.prepare(sql)?;
    let ids: Vec<i64> = stmt
        .query_map([id], |row| row.get(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(ids)
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
