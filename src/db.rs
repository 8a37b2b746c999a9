use crate::selection::SelectionStore;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// Open (or create) the local state database
pub fn open_database(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)
        .with_context(|| format!("Failed to open database: {:?}", db_path))?;
    setup_database(&conn)?;
    Ok(conn)
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // Enable WAL mode for crash recovery
    conn.pragma_update(None, "journal_mode", "WAL")?;

    // ==========================================================================
    // Key/Value Table (comparison selection and other small UI state)
    // ==========================================================================
    conn.execute(
        "CREATE TABLE IF NOT EXISTS kv_store (
            key TEXT PRIMARY KEY NOT NULL,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    Ok(())
}

/// Read one value and when it was last written
pub fn get_value(conn: &Connection, key: &str) -> Result<Option<(String, DateTime<Utc>)>> {
    let row = conn
        .query_row(
            "SELECT value, updated_at FROM kv_store WHERE key = ?1",
            params![key],
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
        )
        .optional()
        .with_context(|| format!("Failed to read key {}", key))?;

    match row {
        Some((value, updated_at)) => {
            let updated_at = DateTime::parse_from_rfc3339(&updated_at)
                .map(|t| t.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now());
            Ok(Some((value, updated_at)))
        }
        None => Ok(None),
    }
}

/// Insert or replace one value (single-statement, atomic per key)
pub fn put_value(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO kv_store (key, value, updated_at) VALUES (?1, ?2, ?3)
         ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        params![key, value, Utc::now().to_rfc3339()],
    )
    .with_context(|| format!("Failed to write key {}", key))?;
    Ok(())
}

// ============================================================================
// SQLITE SELECTION STORE
// ============================================================================

/// Comparison selection persisted in the kv_store table
pub struct SqliteSelectionStore {
    conn: Connection,
}

impl SqliteSelectionStore {
    pub fn new(conn: Connection) -> Result<Self> {
        setup_database(&conn)?;
        Ok(SqliteSelectionStore { conn })
    }

    pub fn open(db_path: &Path) -> Result<Self> {
        Ok(SqliteSelectionStore {
            conn: open_database(db_path)?,
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl SelectionStore for SqliteSelectionStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(get_value(&self.conn, key)?.map(|(value, _)| value))
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        put_value(&self.conn, key, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::{AddOutcome, CompareSelection, SELECTION_KEY};

    #[test]
    fn test_put_and_get_value() {
        let conn = Connection::open_in_memory().unwrap();
        setup_database(&conn).unwrap();

        assert!(get_value(&conn, "missing").unwrap().is_none());

        put_value(&conn, "k", "v1").unwrap();
        put_value(&conn, "k", "v2").unwrap();

        let (value, updated_at) = get_value(&conn, "k").unwrap().unwrap();
        assert_eq!(value, "v2");
        assert!(updated_at <= Utc::now());

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM kv_store", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1, "Upsert should keep one row per key");

        println!("✅ Key/value upsert test PASSED");
    }

    #[test]
    fn test_selection_survives_reopen() {
        let path = std::env::temp_dir().join(format!(
            "hospital_ratings_selection_{}.db",
            std::process::id()
        ));
        let _ = std::fs::remove_file(&path);

        {
            let store = SqliteSelectionStore::open(&path).unwrap();
            let mut selection = CompareSelection::load(Box::new(store));
            assert_eq!(selection.add("101"), AddOutcome::Added);
            assert_eq!(selection.add("202"), AddOutcome::Added);
        }

        let store = SqliteSelectionStore::open(&path).unwrap();
        assert_eq!(
            store.read(SELECTION_KEY).unwrap().as_deref(),
            Some(r#"["101","202"]"#)
        );
        let selection = CompareSelection::load(Box::new(store));
        assert_eq!(selection.to_ordered_list(), vec!["101", "202"]);

        let _ = std::fs::remove_file(&path);
        println!("✅ Selection persistence test PASSED");
    }
}
