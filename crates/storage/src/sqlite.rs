//! SQLite version store
//!
//! One row per version in a single table. Rows of the same record are told
//! apart only by the surrogate `seq` column; the latest version is always the
//! max-`seq` row for an id. There is no separate "current record" table.
//!
//! ```text
//! record_versions
//!   seq            INTEGER PRIMARY KEY AUTOINCREMENT  -- never reused
//!   id             INTEGER NOT NULL                   -- external id
//!   data           TEXT NOT NULL                      -- JSON object
//!   updates        TEXT                               -- JSON, NULL on genesis
//!   effective_date TEXT NOT NULL                      -- UTC, fixed width
//!   created_date   TEXT NOT NULL                      -- UTC, fixed width
//! ```
//!
//! # Concurrency
//!
//! A single connection sits behind a mutex that is held for one statement
//! at a time. Multi-statement sequences (check-then-insert on create,
//! read-merge-append on update) additionally hold the record's entry in
//! [`RecordLocks`], so they never interleave for one id while other ids
//! keep going.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info};

use timetravel_core::{
    date, merge, Error, Record, RecordData, RecordHistory, RecordId, Result, Sequence, UpdateMap,
    VersionStore,
};

use crate::codec;
use crate::locks::RecordLocks;

/// Table holding every version
pub const TABLE_NAME: &str = "record_versions";

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS record_versions (
        seq INTEGER PRIMARY KEY AUTOINCREMENT,
        id INTEGER NOT NULL,
        data TEXT NOT NULL,
        updates TEXT,
        effective_date TEXT NOT NULL,
        created_date TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS record_versions_id_seq ON record_versions (id, seq);
";

const SELECT_COLUMNS: &str =
    "SELECT seq, id, data, updates, effective_date, created_date FROM record_versions";

fn storage_err(e: rusqlite::Error) -> Error {
    Error::storage(e.to_string())
}

/// Row as read from SQLite, before decoding
struct RawRow {
    seq: i64,
    id: i64,
    data: String,
    updates: Option<String>,
    effective_date: String,
    created_date: String,
}

impl RawRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(RawRow {
            seq: row.get(0)?,
            id: row.get(1)?,
            data: row.get(2)?,
            updates: row.get(3)?,
            effective_date: row.get(4)?,
            created_date: row.get(5)?,
        })
    }

    fn decode(self) -> Result<Record> {
        let id = RecordId::new(self.id).map_err(|_| {
            Error::serialization(format!("stored row has invalid id {}", self.id))
        })?;
        let seq = u64::try_from(self.seq).map_err(|_| {
            Error::serialization(format!("stored row has invalid seq {}", self.seq))
        })?;
        Ok(Record {
            id,
            data: codec::decode_data(&self.data)?,
            updates: codec::decode_updates(self.updates.as_deref())?,
            effective_date: codec::decode_timestamp(&self.effective_date)?,
            created_date: codec::decode_timestamp(&self.created_date)?,
            sequence: Sequence::new(seq),
        })
    }
}

/// Version store backed by a SQLite table
pub struct SqliteStore {
    conn: Mutex<Connection>,
    locks: RecordLocks,
    path: Option<PathBuf>,
}

impl SqliteStore {
    /// Open (or create) a database file
    ///
    /// Missing parent directories are created. The schema is created if it
    /// does not exist yet; existing history is kept.
    ///
    /// # Errors
    ///
    /// Returns `StorageUnavailable` if the file cannot be opened or the
    /// schema cannot be created.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::storage(format!("cannot create '{}': {}", parent.display(), e))
            })?;
        }
        let conn = Connection::open(path).map_err(storage_err)?;
        let store = Self::bootstrap(conn, Some(path.to_path_buf()))?;
        info!(
            target: "timetravel::store",
            path = %path.display(),
            versions = store.total_versions()?,
            "opened sqlite store"
        );
        Ok(store)
    }

    /// Open a private in-memory database
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(storage_err)?;
        Self::bootstrap(conn, None)
    }

    fn bootstrap(conn: Connection, path: Option<PathBuf>) -> Result<Self> {
        conn.execute_batch(SCHEMA).map_err(storage_err)?;
        Ok(Self {
            conn: Mutex::new(conn),
            locks: RecordLocks::new(),
            path,
        })
    }

    /// Database file path (`None` for in-memory databases)
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Total number of version rows
    pub fn total_versions(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .lock()
            .query_row("SELECT COUNT(*) FROM record_versions", [], |row| row.get(0))
            .map_err(storage_err)?;
        u64::try_from(count)
            .map_err(|_| Error::storage(format!("negative row count {}", count)))
    }

    fn exists(&self, id: RecordId) -> Result<bool> {
        self.conn
            .lock()
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM record_versions WHERE id = ?1)",
                params![id.get()],
                |row| row.get(0),
            )
            .map_err(storage_err)
    }

    fn query_one(&self, sql: &str, args: &[&dyn rusqlite::ToSql]) -> Result<Option<Record>> {
        let raw = self
            .conn
            .lock()
            .query_row(sql, args, RawRow::read)
            .optional()
            .map_err(storage_err)?;
        raw.map(RawRow::decode).transpose()
    }

    fn latest_row(&self, id: RecordId) -> Result<Option<Record>> {
        let sql = format!("{} WHERE id = ?1 ORDER BY seq DESC LIMIT 1", SELECT_COLUMNS);
        self.query_one(&sql, &[&id.get()])
    }

    fn earliest_row(&self, id: RecordId) -> Result<Option<Record>> {
        let sql = format!("{} WHERE id = ?1 ORDER BY seq ASC LIMIT 1", SELECT_COLUMNS);
        self.query_one(&sql, &[&id.get()])
    }

    /// Insert a version row and return it with its assigned sequence
    fn insert(&self, mut record: Record) -> Result<Record> {
        let data = codec::encode_data(&record.data)?;
        let updates = codec::encode_updates(record.updates.as_ref())?;
        let effective = codec::encode_timestamp(record.effective_date);
        let created = codec::encode_timestamp(record.created_date);

        let seq = {
            let conn = self.conn.lock();
            conn.execute(
                "INSERT INTO record_versions (id, data, updates, effective_date, created_date)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![record.id.get(), data, updates, effective, created],
            )
            .map_err(storage_err)?;
            conn.last_insert_rowid()
        };

        let seq = u64::try_from(seq)
            .map_err(|_| Error::storage(format!("invalid rowid {}", seq)))?;
        record.sequence = Sequence::new(seq);
        Ok(record)
    }
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("path", &self.path)
            .field("locked_ids", &self.locks.len())
            .finish()
    }
}

impl VersionStore for SqliteStore {
    fn create(&self, id: RecordId, data: RecordData) -> Result<Record> {
        self.locks.with_lock(id, || {
            if self.exists(id)? {
                return Err(Error::AlreadyExists { id: id.get() });
            }
            let genesis = Record::genesis(id, data, Sequence::ZERO, date::now());
            let record = self.insert(genesis)?;
            debug!(target: "timetravel::store", %id, seq = %record.sequence, "created record");
            Ok(record)
        })
    }

    fn get_latest(&self, id: RecordId) -> Result<Record> {
        self.latest_row(id)?.ok_or(Error::NotFound { id: id.get() })
    }

    fn get_at_effective_date(&self, id: RecordId, date: Option<NaiveDate>) -> Result<Record> {
        let Some(day) = date else {
            return self.get_latest(id);
        };
        let day = date::check_range(day)?;
        let cutoff = codec::encode_timestamp(date::last_instant_of_day(day));
        let sql = format!(
            "{} WHERE id = ?1 AND effective_date <= ?2 ORDER BY seq DESC LIMIT 1",
            SELECT_COLUMNS
        );
        match self.query_one(&sql, &[&id.get(), &cutoff])? {
            Some(record) => Ok(record),
            None => self
                .earliest_row(id)?
                .ok_or(Error::NotFound { id: id.get() }),
        }
    }

    fn get_all_versions(&self, id: RecordId) -> Result<RecordHistory> {
        let sql = format!("{} WHERE id = ?1 ORDER BY seq DESC", SELECT_COLUMNS);
        let raw_rows = {
            let conn = self.conn.lock();
            let mut stmt = conn.prepare(&sql).map_err(storage_err)?;
            let rows = stmt
                .query_map(params![id.get()], RawRow::read)
                .map_err(storage_err)?;
            let collected: rusqlite::Result<Vec<RawRow>> = rows.collect();
            collected.map_err(storage_err)?
        };

        let versions = raw_rows
            .into_iter()
            .map(RawRow::decode)
            .collect::<Result<Vec<_>>>()?;
        RecordHistory::new(versions).ok_or(Error::NotFound { id: id.get() })
    }

    fn append_update(
        &self,
        id: RecordId,
        updates: UpdateMap,
        effective_date: Option<NaiveDate>,
    ) -> Result<Record> {
        let effective_date = effective_date.map(date::check_range).transpose()?;
        self.locks.with_lock(id, || {
            let latest = self
                .latest_row(id)?
                .ok_or(Error::NotFound { id: id.get() })?;
            let data = merge(&latest.data, &updates);

            let now = date::now();
            let effective = effective_date.map(date::start_of_day).unwrap_or(now);
            let record = self.insert(Record::revision(
                id,
                data,
                updates,
                Sequence::ZERO,
                effective,
                now,
            ))?;
            debug!(target: "timetravel::store", %id, seq = %record.sequence, "appended version");
            Ok(record)
        })
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn id(raw: i64) -> RecordId {
        RecordId::new(raw).unwrap()
    }

    fn data(pairs: &[(&str, &str)]) -> RecordData {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn update(pairs: &[(&str, Option<&str>)]) -> UpdateMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.map(str::to_string)))
            .collect()
    }

    #[test]
    fn test_in_memory_create_and_get() {
        let store = SqliteStore::in_memory().unwrap();
        let created = store.create(id(1), data(&[("name", "Alice")])).unwrap();
        let fetched = store.get_latest(id(1)).unwrap();

        assert_eq!(created, fetched);
        assert!(fetched.is_genesis());
        assert!(store.path().is_none());
        assert_eq!(store.total_versions().unwrap(), 1);
    }

    #[test]
    fn test_create_twice_fails() {
        let store = SqliteStore::in_memory().unwrap();
        store.create(id(1), data(&[("a", "1")])).unwrap();
        assert_eq!(
            store.create(id(1), data(&[("a", "2")])).unwrap_err(),
            Error::AlreadyExists { id: 1 }
        );
        assert_eq!(store.get_latest(id(1)).unwrap().data, data(&[("a", "1")]));
    }

    #[test]
    fn test_update_stores_raw_update_map() {
        let store = SqliteStore::in_memory().unwrap();
        store.create(id(1), data(&[("name", "Bob"), ("age", "30")])).unwrap();

        let v2 = store.append_update(id(1), update(&[("age", None)]), None).unwrap();
        let fetched = store.get_latest(id(1)).unwrap();

        assert_eq!(fetched, v2);
        assert_eq!(fetched.data, data(&[("name", "Bob")]));
        assert_eq!(fetched.updates, Some(update(&[("age", None)])));
    }

    #[test]
    fn test_missing_record() {
        let store = SqliteStore::in_memory().unwrap();
        assert_eq!(store.get_latest(id(5)).unwrap_err(), Error::NotFound { id: 5 });
        assert_eq!(
            store.get_all_versions(id(5)).unwrap_err(),
            Error::NotFound { id: 5 }
        );
        assert_eq!(
            store.append_update(id(5), UpdateMap::new(), None).unwrap_err(),
            Error::NotFound { id: 5 }
        );
        assert_eq!(
            store
                .get_at_effective_date(id(5), date::parse_date("2024-01-01"))
                .unwrap_err(),
            Error::NotFound { id: 5 }
        );
    }

    #[test]
    fn test_open_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("data.db");

        let store = SqliteStore::open(&path).unwrap();
        store.create(id(1), RecordData::new()).unwrap();

        assert!(path.exists());
        assert_eq!(store.path(), Some(path.as_path()));
    }

    #[test]
    fn test_history_and_sequence_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.db");

        let last_seq = {
            let store = SqliteStore::open(&path).unwrap();
            store.create(id(1), data(&[("a", "1")])).unwrap();
            store
                .append_update(id(1), update(&[("b", Some("2"))]), None)
                .unwrap()
                .sequence
        };

        let store = SqliteStore::open(&path).unwrap();
        let history = store.get_all_versions(id(1)).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history.latest().data, data(&[("a", "1"), ("b", "2")]));

        let next = store.create(id(2), RecordData::new()).unwrap();
        assert!(next.sequence > last_seq);
    }

    #[test]
    fn test_corrupt_row_surfaces_serialization_error() {
        let store = SqliteStore::in_memory().unwrap();
        store
            .conn
            .lock()
            .execute(
                "INSERT INTO record_versions (id, data, updates, effective_date, created_date)
                 VALUES (7, 'not json', NULL, 'x', 'y')",
                [],
            )
            .unwrap();

        assert!(matches!(
            store.get_latest(id(7)),
            Err(Error::Serialization { .. })
        ));
    }

    #[test]
    fn test_debug_impl() {
        let store = SqliteStore::in_memory().unwrap();
        assert!(format!("{:?}", store).contains("SqliteStore"));
        assert_eq!(store.backend_name(), "sqlite");
    }
}
