use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::traits::RowStore;
use crate::types::{IdentityError, IdentityRow, Result};

pub const DB_SCHEMA_VERSION: i64 = 1;
pub const DB_NAME: &str = "Face2Name";
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

const TABLE_NAME: &str = "identities";

#[derive(Clone, Debug)]
pub struct SqliteRowStore {
    path: PathBuf,
    busy_timeout: Duration,
}

fn map_identity_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<IdentityRow> {
    let key: i64 = row.get(0)?;
    let name: Option<String> = row.get(1)?;
    Ok(IdentityRow { key, name })
}

fn db_upsert(conn: &Connection, row: &IdentityRow) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO identities (_id, name) VALUES (?1, ?2)",
        params![row.key, row.name],
    )?;
    Ok(())
}

fn db_select_by_key(conn: &Connection, key: i64) -> rusqlite::Result<Option<IdentityRow>> {
    conn.query_row(
        "SELECT _id, name FROM identities WHERE _id = ?1",
        params![key],
        map_identity_row,
    )
    .optional()
}

fn db_count(conn: &Connection) -> rusqlite::Result<u64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM identities", [], |row| row.get(0))?;
    Ok(count as u64)
}

fn db_exists(conn: &Connection, key: i64) -> rusqlite::Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM identities WHERE _id = ?1",
        params![key],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn db_delete_by_key(conn: &Connection, key: i64) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM identities WHERE _id = ?1", params![key])
}

fn db_delete_all(conn: &Connection) -> rusqlite::Result<usize> {
    conn.execute("DELETE FROM identities", [])
}

impl SqliteRowStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            busy_timeout: Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS),
        }
    }

    pub fn with_busy_timeout(mut self, busy_timeout: Duration) -> Self {
        self.busy_timeout = busy_timeout;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Opens the database and brings the schema up to [`DB_SCHEMA_VERSION`].
    pub fn init(&self) -> Result<()> {
        let mut conn = self.open()?;
        Self::migrate(&mut conn)
    }

    fn open(&self) -> rusqlite::Result<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(self.busy_timeout)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        Ok(conn)
    }

    fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.open()?;
        f(&conn)
    }

    fn migrate(conn: &mut Connection) -> Result<()> {
        let tx = conn.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;
        let version: i64 = tx.query_row("PRAGMA user_version", [], |row| row.get(0))?;

        if version == DB_SCHEMA_VERSION {
            return Ok(());
        }
        if version > DB_SCHEMA_VERSION {
            return Err(IdentityError::SchemaVersion {
                found: version,
                supported: DB_SCHEMA_VERSION,
            });
        }

        log::info!(
            "SQLite schema migration: {} -> {}",
            version,
            DB_SCHEMA_VERSION
        );

        tx.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {TABLE_NAME} (_id INTEGER PRIMARY KEY NOT NULL, name TEXT);"
        ))?;
        if version > 0 {
            Self::upgrade(&tx, version, DB_SCHEMA_VERSION)?;
        }
        tx.pragma_update(None, "user_version", DB_SCHEMA_VERSION)?;
        tx.commit()?;
        Ok(())
    }

    /// Hook for moving an existing database between schema versions.
    ///
    /// Version 1 is the only layout so far, so nothing needs to change.
    fn upgrade(_conn: &Connection, from: i64, to: i64) -> rusqlite::Result<()> {
        log::debug!("no schema changes between versions {} and {}", from, to);
        Ok(())
    }
}

impl RowStore for SqliteRowStore {
    fn create_schema_if_absent(&self) -> Result<()> {
        self.init()
    }

    fn upsert(&self, row: &IdentityRow) -> Result<()> {
        self.with_conn(|conn| Ok(db_upsert(conn, row)?))
    }

    fn for_each_row(&self, visit: &mut dyn FnMut(IdentityRow) -> Result<()>) -> Result<()> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT _id, name FROM identities")?;
            let mut rows = stmt.query([])?;
            while let Some(row) = rows.next()? {
                visit(map_identity_row(row)?)?;
            }
            Ok(())
        })
    }

    fn select_by_key(&self, key: i64) -> Result<Option<IdentityRow>> {
        self.with_conn(|conn| Ok(db_select_by_key(conn, key)?))
    }

    fn count_rows(&self) -> Result<u64> {
        self.with_conn(|conn| Ok(db_count(conn)?))
    }

    fn exists_by_key(&self, key: i64) -> Result<bool> {
        self.with_conn(|conn| Ok(db_exists(conn, key)?))
    }

    fn delete_by_key(&self, key: i64) -> Result<()> {
        let removed = self.with_conn(|conn| Ok(db_delete_by_key(conn, key)?))?;
        log::debug!("deleted {} identity row(s) for key {}", removed, key);
        Ok(())
    }

    fn delete_all(&self) -> Result<()> {
        let removed = self.with_conn(|conn| Ok(db_delete_all(conn)?))?;
        log::debug!("deleted {} identity row(s)", removed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::{Connection, OptionalExtension};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_temp_file(prefix: &str, ext: &str) -> std::path::PathBuf {
        let mut p = std::env::temp_dir();
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        p.push(format!("{}_{}_{}.{}", prefix, std::process::id(), nanos, ext));
        p
    }

    fn initialized(prefix: &str) -> SqliteRowStore {
        let store = SqliteRowStore::new(unique_temp_file(prefix, "db"));
        store.init().unwrap();
        store
    }

    #[test]
    fn sqlite_init_creates_identities_table() {
        let store = initialized("identity_init");
        assert!(store.path().exists());

        let conn = Connection::open(store.path()).unwrap();
        let table = conn
            .query_row(
                "SELECT name FROM sqlite_master WHERE type='table' AND name='identities'",
                [],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .unwrap();
        assert_eq!(table.as_deref(), Some("identities"));

        let version: i64 = conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap();
        assert_eq!(version, DB_SCHEMA_VERSION);
    }

    #[test]
    fn sqlite_init_is_idempotent() {
        let store = initialized("identity_init_twice");
        store.upsert(&IdentityRow::new(1, Some("kept".into()))).unwrap();
        store.create_schema_if_absent().unwrap();
        assert_eq!(store.count_rows().unwrap(), 1);
    }

    #[test]
    fn sqlite_init_adopts_existing_table_without_version() {
        let path = unique_temp_file("identity_legacy", "db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(
            "CREATE TABLE identities (_id INTEGER PRIMARY KEY NOT NULL, name TEXT);
             INSERT INTO identities (_id, name) VALUES (5, 'legacy');",
        )
        .unwrap();
        drop(conn);

        let store = SqliteRowStore::new(&path);
        store.init().unwrap();
        assert_eq!(
            store.select_by_key(5).unwrap(),
            Some(IdentityRow::new(5, Some("legacy".into())))
        );
    }

    #[test]
    fn sqlite_fails_on_newer_schema_version() {
        let path = unique_temp_file("identity_bad_version", "db");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch("PRAGMA user_version = 999;").unwrap();
        drop(conn);

        let err = SqliteRowStore::new(&path)
            .init()
            .expect_err("init should fail on version mismatch");
        assert!(matches!(
            err,
            IdentityError::SchemaVersion {
                found: 999,
                supported: DB_SCHEMA_VERSION
            }
        ));
    }

    #[test]
    fn sqlite_upsert_replaces_whole_row() {
        let store = initialized("identity_upsert");
        store.upsert(&IdentityRow::new(7, Some("Alice".into()))).unwrap();
        store.upsert(&IdentityRow::new(7, Some("Bob".into()))).unwrap();
        assert_eq!(
            store.select_by_key(7).unwrap(),
            Some(IdentityRow::new(7, Some("Bob".into())))
        );

        store.upsert(&IdentityRow::new(7, None)).unwrap();
        assert_eq!(store.select_by_key(7).unwrap(), Some(IdentityRow::new(7, None)));
        assert_eq!(store.count_rows().unwrap(), 1);
    }

    #[test]
    fn sqlite_exists_ignores_null_name() {
        let store = initialized("identity_exists");
        store.upsert(&IdentityRow::new(-3, None)).unwrap();
        assert!(store.exists_by_key(-3).unwrap());
        assert!(!store.exists_by_key(3).unwrap());
    }

    #[test]
    fn sqlite_select_all_returns_every_row() {
        let store = initialized("identity_select_all");
        assert!(store.select_all().unwrap().is_empty());

        for key in 1..=3 {
            store
                .upsert(&IdentityRow::new(key, Some(format!("person {key}"))))
                .unwrap();
        }
        let mut rows = store.select_all().unwrap();
        rows.sort_by_key(|r| r.key);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2], IdentityRow::new(3, Some("person 3".into())));

        // re-issuable
        assert_eq!(store.select_all().unwrap().len(), 3);
    }

    #[test]
    fn sqlite_for_each_row_stops_on_visitor_error() {
        let store = initialized("identity_visit_err");
        store.upsert(&IdentityRow::new(1, None)).unwrap();
        store.upsert(&IdentityRow::new(2, None)).unwrap();

        let mut seen = 0;
        let err = store
            .for_each_row(&mut |_row| {
                seen += 1;
                Err(IdentityError::TaskAborted("stop".into()))
            })
            .unwrap_err();
        assert_eq!(seen, 1);
        assert!(matches!(err, IdentityError::TaskAborted(_)));
    }

    #[test]
    fn sqlite_deletes_are_idempotent() {
        let store = initialized("identity_delete");
        store.upsert(&IdentityRow::new(1, Some("a".into()))).unwrap();
        store.upsert(&IdentityRow::new(2, Some("b".into()))).unwrap();

        store.delete_by_key(1).unwrap();
        store.delete_by_key(1).unwrap();
        assert!(!store.exists_by_key(1).unwrap());
        assert_eq!(store.count_rows().unwrap(), 1);

        store.delete_all().unwrap();
        store.delete_all().unwrap();
        assert_eq!(store.count_rows().unwrap(), 0);
    }

    #[test]
    fn sqlite_missing_directory_is_engine_failure() {
        let store = SqliteRowStore::new("/nonexistent-identity-dir/deeper/Face2Name");
        assert!(matches!(store.init(), Err(IdentityError::Engine(_))));
    }
}
