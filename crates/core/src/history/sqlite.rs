use std::path::Path;
use std::sync::Mutex;

use chrono::DateTime;
use rusqlite::{params, Connection};

use super::{HistoryError, HistoryRecord, HistoryStore};
use crate::media::VideoId;

/// SQLite-backed history store
pub struct SqliteHistoryStore {
    conn: Mutex<Connection>,
}

impl SqliteHistoryStore {
    /// Create a new SQLite history store, creating the database file and
    /// tables if needed
    pub fn new(path: &Path) -> Result<Self, HistoryError> {
        let conn = Connection::open(path).map_err(|e| HistoryError::Database(e.to_string()))?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite history store (useful for testing)
    pub fn in_memory() -> Result<Self, HistoryError> {
        let conn =
            Connection::open_in_memory().map_err(|e| HistoryError::Database(e.to_string()))?;
        Self::init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn init_schema(conn: &Connection) -> Result<(), HistoryError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS downloads (
                video_id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                downloaded_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_downloads_downloaded_at ON downloads(downloaded_at);
            "#,
        )
        .map_err(|e| HistoryError::Database(e.to_string()))
    }

    fn row_to_record(
        video_id: String,
        title: String,
        downloaded_at: String,
    ) -> Result<HistoryRecord, HistoryError> {
        let video_id = VideoId::new(&video_id)
            .map_err(|e| HistoryError::Database(format!("invalid stored video id: {}", e)))?;
        let downloaded_at = DateTime::parse_from_rfc3339(&downloaded_at)
            .map_err(|e| HistoryError::Database(format!("invalid timestamp: {}", e)))?
            .into();
        Ok(HistoryRecord {
            video_id,
            title,
            downloaded_at,
        })
    }
}

impl HistoryStore for SqliteHistoryStore {
    fn get_by_id(&self, video_id: &VideoId) -> Result<Option<HistoryRecord>, HistoryError> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn
            .prepare("SELECT video_id, title, downloaded_at FROM downloads WHERE video_id = ?")
            .map_err(|e| HistoryError::Database(e.to_string()))?;

        let mut rows = stmt
            .query_map(params![video_id.as_str()], |row| {
                Ok((row.get::<_, String>(0)?, row.get(1)?, row.get(2)?))
            })
            .map_err(|e| HistoryError::Database(e.to_string()))?;

        match rows.next() {
            Some(row) => {
                let (id, title, at) = row.map_err(|e| HistoryError::Database(e.to_string()))?;
                Ok(Some(Self::row_to_record(id, title, at)?))
            }
            None => Ok(None),
        }
    }

    fn upsert(&self, record: &HistoryRecord) -> Result<(), HistoryError> {
        let conn = self.conn.lock().unwrap();

        conn.execute(
            "INSERT INTO downloads (video_id, title, downloaded_at) VALUES (?, ?, ?)
             ON CONFLICT(video_id) DO UPDATE SET title = excluded.title, downloaded_at = excluded.downloaded_at",
            params![
                record.video_id.as_str(),
                record.title,
                record.downloaded_at.to_rfc3339(),
            ],
        )
        .map_err(|e| HistoryError::Database(e.to_string()))?;

        Ok(())
    }

    fn list(&self) -> Result<Vec<HistoryRecord>, HistoryError> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn
            .prepare(
                "SELECT video_id, title, downloaded_at FROM downloads ORDER BY downloaded_at DESC",
            )
            .map_err(|e| HistoryError::Database(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get(1)?, row.get(2)?))
            })
            .map_err(|e| HistoryError::Database(e.to_string()))?;

        let mut records = Vec::new();
        for row in rows {
            let (id, title, at) = row.map_err(|e| HistoryError::Database(e.to_string()))?;
            records.push(Self::row_to_record(id, title, at)?);
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn record(id: &str, title: &str) -> HistoryRecord {
        HistoryRecord {
            video_id: VideoId::new(id).unwrap(),
            title: title.to_string(),
            downloaded_at: Utc::now(),
        }
    }

    #[test]
    fn test_get_missing_returns_none() {
        let store = SqliteHistoryStore::in_memory().unwrap();
        let id = VideoId::new("dQw4w9WgXcQ").unwrap();
        assert!(store.get_by_id(&id).unwrap().is_none());
    }

    #[test]
    fn test_upsert_and_get() {
        let store = SqliteHistoryStore::in_memory().unwrap();
        let rec = record("dQw4w9WgXcQ", "Never Gonna Give You Up");
        store.upsert(&rec).unwrap();

        let found = store.get_by_id(&rec.video_id).unwrap().unwrap();
        assert_eq!(found.video_id, rec.video_id);
        assert_eq!(found.title, rec.title);
    }

    #[test]
    fn test_upsert_same_id_refreshes_record() {
        let store = SqliteHistoryStore::in_memory().unwrap();
        let first = record("dQw4w9WgXcQ", "old title");
        store.upsert(&first).unwrap();

        let mut second = record("dQw4w9WgXcQ", "new title");
        second.downloaded_at = first.downloaded_at + Duration::hours(1);
        store.upsert(&second).unwrap();

        let all = store.list().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].title, "new title");
    }

    #[test]
    fn test_list_most_recent_first() {
        let store = SqliteHistoryStore::in_memory().unwrap();
        let now = Utc::now();

        let mut older = record("aaaaaaaaaaa", "older");
        older.downloaded_at = now - Duration::hours(2);
        store.upsert(&older).unwrap();

        let mut newer = record("bbbbbbbbbbb", "newer");
        newer.downloaded_at = now;
        store.upsert(&newer).unwrap();

        let all = store.list().unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].title, "newer");
        assert_eq!(all[1].title, "older");
    }

    #[test]
    fn test_file_based_store() {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("history.db");

        let store = SqliteHistoryStore::new(&db_path).unwrap();
        store.upsert(&record("dQw4w9WgXcQ", "song")).unwrap();

        assert!(db_path.exists());
        assert_eq!(store.list().unwrap().len(), 1);
    }
}
