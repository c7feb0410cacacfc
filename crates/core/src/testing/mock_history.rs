//! Mock history store for testing.

use std::collections::HashMap;
use std::sync::RwLock;

use crate::history::{HistoryError, HistoryRecord, HistoryStore};
use crate::media::VideoId;

/// Mock implementation of the HistoryStore trait.
#[derive(Debug, Default)]
pub struct MockHistoryStore {
    records: RwLock<HashMap<String, HistoryRecord>>,
    upserts: RwLock<usize>,
    /// When true, every operation fails.
    fail: RwLock<bool>,
}

impl MockHistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed a record, as if the video had been delivered before.
    pub fn insert_record(&self, record: HistoryRecord) {
        self.records
            .write()
            .unwrap()
            .insert(record.video_id.as_str().to_string(), record);
    }

    pub fn upsert_count(&self) -> usize {
        *self.upserts.read().unwrap()
    }

    /// Make every operation fail, simulating a broken database.
    pub fn set_fail(&self, fail: bool) {
        *self.fail.write().unwrap() = fail;
    }
}

impl HistoryStore for MockHistoryStore {
    fn get_by_id(&self, video_id: &VideoId) -> Result<Option<HistoryRecord>, HistoryError> {
        if *self.fail.read().unwrap() {
            return Err(HistoryError::Database("mock failure".to_string()));
        }
        Ok(self.records.read().unwrap().get(video_id.as_str()).cloned())
    }

    fn upsert(&self, record: &HistoryRecord) -> Result<(), HistoryError> {
        *self.upserts.write().unwrap() += 1;
        if *self.fail.read().unwrap() {
            return Err(HistoryError::Database("mock failure".to_string()));
        }
        self.records
            .write()
            .unwrap()
            .insert(record.video_id.as_str().to_string(), record.clone());
        Ok(())
    }

    fn list(&self) -> Result<Vec<HistoryRecord>, HistoryError> {
        if *self.fail.read().unwrap() {
            return Err(HistoryError::Database("mock failure".to_string()));
        }
        let mut records: Vec<_> = self.records.read().unwrap().values().cloned().collect();
        records.sort_by(|a, b| b.downloaded_at.cmp(&a.downloaded_at));
        Ok(records)
    }
}
