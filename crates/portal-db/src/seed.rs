//! Initial rows for a fresh store.
//!
//! The seed document is JSON with an `announcements` list and a `users`
//! list. Users are addressed by `key` and point at each other by key through
//! `teacher`, `mentors`, `mentees` and `teammates`. A default document is
//! compiled in; a file on disk can replace it.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow};
use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
use portal_types::models::Role;
use rand_core::OsRng;
use rusqlite::Connection;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::queries::insert_announcement;

const BUNDLED_SEED: &str = include_str!("../seed/default.json");

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed seed document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("duplicate user key '{0}'")]
    DuplicateKey(String),

    #[error("user '{user}' references unknown user '{reference}'")]
    UnknownReference { user: String, reference: String },

    #[error("user '{0}' references itself")]
    SelfReference(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeedData {
    #[serde(default)]
    pub announcements: Vec<SeedAnnouncement>,
    #[serde(default)]
    pub users: Vec<SeedUser>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SeedAnnouncement {
    #[serde(alias = "user_name")]
    pub author: String,
    pub tag: String,
    pub description: String,
    #[serde(default)]
    pub img_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SeedUser {
    pub key: String,
    pub name: String,
    pub password: String,
    pub role: Role,
    pub img_url: String,
    pub linkedin_url: String,
    pub github_url: String,
    #[serde(default)]
    pub website_url: Option<String>,
    #[serde(default)]
    pub resume_url: Option<String>,
    #[serde(default)]
    pub teacher: Option<String>,
    #[serde(default)]
    pub mentors: Vec<String>,
    #[serde(default)]
    pub mentees: Vec<String>,
    #[serde(default)]
    pub teammates: Vec<String>,
}

/// Rows written by one seeding pass. All zero when every table was already
/// populated.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub announcements: usize,
    pub users: usize,
    pub mentor_links: usize,
    pub teammate_links: usize,
}

impl SeedData {
    /// The document compiled into the binary.
    pub fn bundled() -> Result<Self, SeedError> {
        Self::parse(BUNDLED_SEED)
    }

    pub fn from_path(path: &Path) -> Result<Self, SeedError> {
        let json = std::fs::read_to_string(path).map_err(|source| SeedError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&json)
    }

    /// Parse and check every cross-reference, so a bad document is rejected
    /// before anything touches the store.
    pub fn parse(json: &str) -> Result<Self, SeedError> {
        let data: SeedData = serde_json::from_str(json)?;
        data.validate()?;
        Ok(data)
    }

    fn validate(&self) -> Result<(), SeedError> {
        let mut keys = HashSet::new();
        for user in &self.users {
            if !keys.insert(user.key.as_str()) {
                return Err(SeedError::DuplicateKey(user.key.clone()));
            }
        }

        for user in &self.users {
            let references = user
                .teacher
                .iter()
                .chain(&user.mentors)
                .chain(&user.mentees)
                .chain(&user.teammates);

            for reference in references {
                if *reference == user.key {
                    return Err(SeedError::SelfReference(user.key.clone()));
                }
                if !keys.contains(reference.as_str()) {
                    return Err(SeedError::UnknownReference {
                        user: user.key.clone(),
                        reference: reference.clone(),
                    });
                }
            }
        }

        Ok(())
    }
}

/// Seed each empty table. Run it inside a transaction so a failure part way
/// through leaves nothing behind.
pub fn apply(conn: &Connection, seed: &SeedData) -> Result<SeedReport> {
    let mut report = SeedReport::default();

    if table_is_empty(conn, "announcements")? {
        for a in &seed.announcements {
            insert_announcement(conn, &a.author, &a.tag, &a.description, a.img_url.as_deref())?;
        }
        report.announcements = seed.announcements.len();
    } else {
        debug!("announcements already present, not seeding");
    }

    if table_is_empty(conn, "users")? {
        seed_users(conn, &seed.users, &mut report)?;
    } else {
        debug!("users already present, not seeding");
    }

    info!(
        announcements = report.announcements,
        users = report.users,
        mentor_links = report.mentor_links,
        teammate_links = report.teammate_links,
        "Seeding complete"
    );
    Ok(report)
}

fn table_is_empty(conn: &Connection, table: &str) -> Result<bool> {
    let sql = format!("SELECT EXISTS (SELECT 1 FROM {table})");
    let exists: bool = conn.query_row(&sql, [], |row| row.get(0))?;
    Ok(!exists)
}

fn seed_users(conn: &Connection, users: &[SeedUser], report: &mut SeedReport) -> Result<()> {
    let mut ids: HashMap<&str, i64> = HashMap::with_capacity(users.len());

    // Teachers may appear after their students, so teacher_id is filled in
    // on a second pass.
    for user in users {
        conn.execute(
            "INSERT INTO users (name, password, role, img_url, linkedin_url, github_url, website_url, resume_url)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                user.name,
                hash_password(&user.password)?,
                user.role.as_str(),
                user.img_url,
                user.linkedin_url,
                user.github_url,
                user.website_url,
                user.resume_url,
            ],
        )?;
        ids.insert(user.key.as_str(), conn.last_insert_rowid());
    }
    report.users = users.len();

    let id_of = |key: &str| {
        ids.get(key)
            .copied()
            .ok_or_else(|| anyhow!("seed user '{}' was not inserted", key))
    };

    let mut mentor_edges = BTreeSet::new();
    let mut teammate_edges = BTreeSet::new();

    for user in users {
        let me = id_of(user.key.as_str())?;

        if let Some(teacher) = &user.teacher {
            conn.execute(
                "UPDATE users SET teacher_id = ?1 WHERE id = ?2",
                [id_of(teacher.as_str())?, me],
            )?;
        }

        // (mentor, mentee); declaring either side yields the same edge
        for mentor in &user.mentors {
            mentor_edges.insert((id_of(mentor.as_str())?, me));
        }
        for mentee in &user.mentees {
            mentor_edges.insert((me, id_of(mentee.as_str())?));
        }

        for mate in &user.teammates {
            let other = id_of(mate.as_str())?;
            teammate_edges.insert((me, other));
            teammate_edges.insert((other, me));
        }
    }

    for (mentor, mentee) in &mentor_edges {
        conn.execute(
            "INSERT INTO mentor_links (mentor_id, mentee_id) VALUES (?1, ?2)",
            [*mentor, *mentee],
        )?;
    }
    for (user, mate) in &teammate_edges {
        conn.execute(
            "INSERT INTO teammate_links (user_id, teammate_id) VALUES (?1, ?2)",
            [*user, *mate],
        )?;
    }

    report.mentor_links = mentor_edges.len();
    report.teammate_links = teammate_edges.len();
    Ok(())
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!("failed to hash seed password: {}", e))?
        .to_string();
    Ok(hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;
    use argon2::{PasswordHash, PasswordVerifier};

    const TWO_USERS: &str = r#"{
        "announcements": [
            { "user_name": "Kimber", "tag": "@Homework", "description": "none this week" }
        ],
        "users": [
            {
                "key": "student", "name": "Student", "password": "pw-student", "role": "STUDENT",
                "imgUrl": "i", "linkedinUrl": "l", "githubUrl": "g",
                "teacher": "teacher", "mentors": ["teacher"], "teammates": []
            },
            {
                "key": "teacher", "name": "Teacher", "password": "pw-teacher", "role": "TEACHER",
                "imgUrl": "i", "linkedinUrl": "l", "githubUrl": "g",
                "mentees": ["student"]
            }
        ]
    }"#;

    #[test]
    fn bundled_document_is_valid() {
        let seed = SeedData::bundled().unwrap();
        assert_eq!(seed.announcements.len(), 3);
        assert_eq!(seed.users.len(), 5);
        assert_eq!(seed.announcements[0].tag, "@Homework");
    }

    #[test]
    fn report_counts_each_edge_once() {
        let db = Database::open_in_memory().unwrap();
        let report = db.seed(&SeedData::parse(TWO_USERS).unwrap()).unwrap();

        assert_eq!(
            report,
            SeedReport {
                announcements: 1,
                users: 2,
                mentor_links: 1,
                teammate_links: 0,
            }
        );
    }

    #[test]
    fn bundled_report_counts_both_teammate_directions() {
        let db = Database::open_in_memory().unwrap();
        let report = db.seed(&SeedData::bundled().unwrap()).unwrap();

        assert_eq!(report.users, 5);
        assert_eq!(report.mentor_links, 3);
        assert_eq!(report.teammate_links, 4);
    }

    #[test]
    fn passwords_are_stored_hashed() {
        let db = Database::open_in_memory().unwrap();
        db.seed(&SeedData::parse(TWO_USERS).unwrap()).unwrap();

        let student = db
            .list_users()
            .unwrap()
            .into_iter()
            .find(|u| u.name == "Student")
            .unwrap();
        assert_ne!(student.password, "pw-student");

        let parsed = PasswordHash::new(&student.password).unwrap();
        assert!(
            Argon2::default()
                .verify_password(b"pw-student", &parsed)
                .is_ok()
        );
    }

    #[test]
    fn missing_field_is_rejected() {
        let json = r#"{ "announcements": [ { "author": "Kimber", "tag": "@Help" } ] }"#;
        assert!(matches!(SeedData::parse(json), Err(SeedError::Parse(_))));
    }

    #[test]
    fn unknown_role_is_rejected() {
        let json = TWO_USERS.replace("\"TEACHER\"", "\"PRINCIPAL\"");
        assert!(matches!(SeedData::parse(&json), Err(SeedError::Parse(_))));
    }

    #[test]
    fn unknown_reference_is_rejected() {
        let json = TWO_USERS.replace("\"teacher\": \"teacher\"", "\"teacher\": \"nobody\"");
        assert!(matches!(
            SeedData::parse(&json),
            Err(SeedError::UnknownReference { reference, .. }) if reference == "nobody"
        ));
    }

    #[test]
    fn duplicate_key_is_rejected() {
        let json = TWO_USERS.replace("\"key\": \"teacher\"", "\"key\": \"student\"");
        assert!(matches!(
            SeedData::parse(&json),
            Err(SeedError::DuplicateKey(key)) if key == "student"
        ));
    }

    #[test]
    fn self_reference_is_rejected() {
        let json = TWO_USERS.replace("\"mentees\": [\"student\"]", "\"mentees\": [\"teacher\"]");
        assert!(matches!(
            SeedData::parse(&json),
            Err(SeedError::SelfReference(key)) if key == "teacher"
        ));
    }

    #[test]
    fn missing_seed_file_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SeedData::from_path(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, SeedError::Read { .. }));
    }

    #[test]
    fn failing_insert_writes_nothing() {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| {
            conn.execute_batch(
                "CREATE TRIGGER reject_users BEFORE INSERT ON users
                 BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
            )?;
            Ok(())
        })
        .unwrap();

        assert!(db.seed(&SeedData::parse(TWO_USERS).unwrap()).is_err());
        assert_eq!(db.count_announcements().unwrap(), 0);
    }
}
