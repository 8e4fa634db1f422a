use crate::error::{StoreError, StoreResult};
use crate::load::LoadRecord;
use crate::store::LoadStore;
use chrono::{DateTime, Datelike, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const LOAD_SELECT_SQL: &str = "SELECT
    id, customer_id, transaction_id, load_amount, transaction_time, accepted
FROM loads";

pub fn setup_database(conn: &Connection) -> rusqlite::Result<()> {
    // Enable WAL mode for crash recovery (in-memory databases answer "memory")
    let _mode: String =
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;

    // ==========================================================================
    // Loads Table
    // transaction_time is fixed-width RFC3339 UTC, so text order is time order
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS loads (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            customer_id INTEGER NOT NULL,
            transaction_id INTEGER NOT NULL,
            load_amount INTEGER NOT NULL CHECK (load_amount > 0),
            transaction_time TEXT NOT NULL,
            accepted INTEGER NOT NULL,
            created_at DATETIME DEFAULT CURRENT_TIMESTAMP
        )",
        [],
    )?;

    // ==========================================================================
    // Indexes
    // ==========================================================================
    conn.execute(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_loads_customer_transaction
         ON loads(customer_id, transaction_id)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_loads_customer_time
         ON loads(customer_id, transaction_time)",
        [],
    )?;

    Ok(())
}

/// Canonical stored form: `2000-01-01T16:00:00.000000000Z`
///
/// Four-digit years only; `+10000-..` would sort before `9999-..` as text.
fn format_time(time: DateTime<Utc>) -> StoreResult<String> {
    if !(1..=9999).contains(&time.year()) {
        return Err(StoreError::Unavailable(format!(
            "transaction time {time} cannot be stored"
        )));
    }
    Ok(time.to_rfc3339_opts(SecondsFormat::Nanos, true))
}

fn read_load(row: &Row<'_>) -> rusqlite::Result<LoadRecord> {
    let time_str: String = row.get(4)?;
    let time = DateTime::parse_from_rfc3339(&time_str)
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?
        .with_timezone(&Utc);

    Ok(LoadRecord {
        id: Some(row.get(0)?),
        customer_id: row.get(1)?,
        transaction_id: row.get(2)?,
        amount: row.get(3)?,
        time,
        accepted: row.get(5)?,
    })
}

// ============================================================================
// SQLITE STORE
// ============================================================================

/// `LoadStore` over a single SQLite connection
pub struct SqliteLoadStore {
    conn: Mutex<Connection>,
}

impl SqliteLoadStore {
    /// Open (or create) the database file and make sure the schema exists.
    /// `":memory:"` gives a throwaway database.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn from_connection(conn: Connection) -> StoreResult<Self> {
        setup_database(&conn)?;
        Ok(SqliteLoadStore {
            conn: Mutex::new(conn),
        })
    }

    pub fn count(&self) -> StoreResult<i64> {
        let count = self
            .conn()
            .query_row("SELECT COUNT(*) FROM loads", [], |row| row.get(0))?;
        Ok(count)
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        // rusqlite rolls back anything half-done, so a poisoned lock is still usable
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl LoadStore for SqliteLoadStore {
    fn get(&self, id: i64) -> StoreResult<LoadRecord> {
        let conn = self.conn();
        let sql = format!("{LOAD_SELECT_SQL} WHERE id = ?1");
        Ok(conn.query_row(&sql, params![id], read_load)?)
    }

    fn find_by_customer_and_transaction(
        &self,
        customer_id: i64,
        transaction_id: i64,
    ) -> StoreResult<LoadRecord> {
        let conn = self.conn();
        let sql = format!("{LOAD_SELECT_SQL} WHERE customer_id = ?1 AND transaction_id = ?2");

        conn.query_row(&sql, params![customer_id, transaction_id], read_load)
            .optional()?
            .ok_or(StoreError::NoRecord)
    }

    fn find_by_customer_in_range(
        &self,
        customer_id: i64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> StoreResult<Vec<LoadRecord>> {
        let conn = self.conn();
        let mut stmt = conn.prepare_cached(&format!(
            "{LOAD_SELECT_SQL}
             WHERE customer_id = ?1 AND transaction_time >= ?2 AND transaction_time <= ?3"
        ))?;

        let loads = stmt
            .query_map(
                params![customer_id, format_time(start)?, format_time(end)?],
                read_load,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(loads)
    }

    fn append(&self, record: &LoadRecord) -> StoreResult<i64> {
        let time = format_time(record.time)?;
        let conn = self.conn();

        conn.execute(
            "INSERT INTO loads (customer_id, transaction_id, load_amount, transaction_time, accepted)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.customer_id,
                record.transaction_id,
                record.amount,
                time,
                record.accepted,
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    fn update(&self, record: &LoadRecord) -> StoreResult<()> {
        let id = record.id.ok_or(StoreError::NoRecord)?;
        let time = format_time(record.time)?;

        let changed = self.conn().execute(
            "UPDATE loads
             SET customer_id = ?1, transaction_id = ?2, load_amount = ?3,
                 transaction_time = ?4, accepted = ?5
             WHERE id = ?6",
            params![
                record.customer_id,
                record.transaction_id,
                record.amount,
                time,
                record.accepted,
                id,
            ],
        )?;

        if changed == 0 {
            return Err(StoreError::NoRecord);
        }
        Ok(())
    }
}
