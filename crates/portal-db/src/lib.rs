pub mod migrations;
pub mod models;
pub mod queries;
pub mod seed;

use anyhow::Result;
use rusqlite::{Connection, Transaction};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use tracing::{info, warn};

pub use seed::{SeedData, SeedError, SeedReport};

/// The one process-wide connection. Every caller gets it for the span of a
/// single closure, and the lock is dropped however that closure exits.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // WAL mode for concurrent reads
        conn.pragma_update(None, "journal_mode", "WAL")?;

        let db = Self::init(conn)?;
        info!("Database opened at {}", path.display());
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let db = Self::init(Connection::open_in_memory()?)?;
        info!("In-memory database opened");
        Ok(db)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        migrations::run(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| anyhow::anyhow!("DB lock poisoned: {}", e))
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.lock()?;
        f(&conn)
    }

    /// Run `f` inside a transaction. Commits when `f` succeeds; rolls back
    /// when `f` fails or the commit itself fails.
    pub fn with_tx<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T>,
    {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        match f(&tx) {
            Ok(value) => {
                // A failed commit drops the transaction, which rolls it back.
                tx.commit()?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback() {
                    warn!("Rollback failed: {}", rollback_err);
                }
                Err(e)
            }
        }
    }

    /// Seed every empty table from `seed`. Tables that already hold rows are
    /// left alone, so calling this on each start is harmless.
    pub fn seed(&self, seed: &SeedData) -> Result<SeedReport> {
        self.with_tx(|tx| seed::apply(tx, seed))
    }

    /// Drop every table, recreate the schema and seed it again, as one
    /// transaction.
    pub fn reset(&self, seed: &SeedData) -> Result<SeedReport> {
        self.with_tx(|tx| {
            migrations::drop_all(tx)?;
            migrations::run(tx)?;
            seed::apply(tx, seed)
        })
    }
}
