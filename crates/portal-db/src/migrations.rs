use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS announcements (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            author      TEXT NOT NULL,
            tag         TEXT NOT NULL,
            description TEXT NOT NULL,
            img_url     TEXT
        );

        -- role is STUDENT, MENTOR or TEACHER; not constrained here
        CREATE TABLE IF NOT EXISTS users (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            name          TEXT NOT NULL,
            password      TEXT NOT NULL,
            role          TEXT NOT NULL,
            img_url       TEXT NOT NULL,
            linkedin_url  TEXT NOT NULL,
            github_url    TEXT NOT NULL,
            website_url   TEXT,
            resume_url    TEXT,
            teacher_id    INTEGER REFERENCES users(id) ON DELETE SET NULL
        );

        CREATE INDEX IF NOT EXISTS idx_users_teacher
            ON users(teacher_id);

        CREATE TABLE IF NOT EXISTS mentor_links (
            mentor_id   INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            mentee_id   INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            PRIMARY KEY (mentor_id, mentee_id)
        );

        CREATE INDEX IF NOT EXISTS idx_mentor_links_mentee
            ON mentor_links(mentee_id);

        CREATE TABLE IF NOT EXISTS teammate_links (
            user_id     INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            teammate_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            PRIMARY KEY (user_id, teammate_id)
        );
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}

/// Drop every portal table. Link tables go first so no foreign key is left
/// dangling mid-statement.
pub fn drop_all(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        DROP TABLE IF EXISTS teammate_links;
        DROP TABLE IF EXISTS mentor_links;
        DROP TABLE IF EXISTS users;
        DROP TABLE IF EXISTS announcements;
        ",
    )?;

    info!("All tables dropped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_names(conn: &Connection) -> Vec<String> {
        let mut stmt = conn
            .prepare(
                "SELECT name FROM sqlite_master
                 WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
                 ORDER BY name",
            )
            .unwrap();
        let names: Vec<String> = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .map(|r| r.unwrap())
            .collect();
        names
    }

    #[test]
    fn run_is_repeatable() {
        let conn = Connection::open_in_memory().unwrap();
        run(&conn).unwrap();
        run(&conn).unwrap();

        assert_eq!(
            table_names(&conn),
            vec!["announcements", "mentor_links", "teammate_links", "users"]
        );
    }

    #[test]
    fn drop_all_leaves_no_tables() {
        let conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "foreign_keys", "ON").unwrap();
        run(&conn).unwrap();
        drop_all(&conn).unwrap();

        assert!(table_names(&conn).is_empty());
    }

    #[test]
    fn link_rows_need_existing_users() {
        let conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "foreign_keys", "ON").unwrap();
        run(&conn).unwrap();

        let result = conn.execute(
            "INSERT INTO teammate_links (user_id, teammate_id) VALUES (1, 2)",
            [],
        );
        assert!(result.is_err());
    }
}
