//! File-based stats storage.
//!
//! Each user is one pretty-printed JSON document, `<data_dir>/<user_id>.json`.
//! Writes go to a hidden temp file first and are renamed into place, so a
//! reader never sees a half-written record.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

use studydash_core::error::StoreError;
use studydash_core::model::{StatsRecord, UserStats};
use studydash_core::traits::StatsStore;

const MAX_USER_ID_LEN: usize = 64;

/// Check that a user id is safe to use as a file name.
///
/// Ids are 1 to 64 characters of `[A-Za-z0-9_.-]` and may not start with a
/// dot.
pub fn validate_user_id(user_id: &str) -> Result<(), StoreError> {
    let valid = !user_id.is_empty()
        && user_id.len() <= MAX_USER_ID_LEN
        && !user_id.starts_with('.')
        && user_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'));
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidUserId(user_id.to_string()))
    }
}

/// JSON-file stats store.
///
/// Saves are serialized within the process by a write lock; the revision
/// check happens under that lock.
#[derive(Debug)]
pub struct JsonFileStatsStore {
    data_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStatsStore {
    /// Open a store rooted at `data_dir`, creating the directory if needed.
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let data_dir = data_dir.into();
        if !data_dir.exists() {
            std::fs::create_dir_all(&data_dir).map_err(|e| StoreError::io(&data_dir, e))?;
        }
        Ok(Self {
            data_dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn record_path(&self, user_id: &str) -> PathBuf {
        self.data_dir.join(format!("{user_id}.json"))
    }

    fn temp_path(&self, user_id: &str) -> PathBuf {
        self.data_dir.join(format!(".{user_id}.json.tmp"))
    }

    /// Read a record, or `None` if the user has no file.
    async fn read_record(&self, user_id: &str) -> Result<Option<StatsRecord>, StoreError> {
        let path = self.record_path(user_id);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::io(&path, e)),
        };
        let record: StatsRecord = serde_json::from_str(&content)?;
        Ok(Some(record))
    }

    async fn atomic_write(&self, record: &StatsRecord) -> Result<(), StoreError> {
        let final_path = self.record_path(&record.user_id);
        let temp_path = self.temp_path(&record.user_id);

        let json = serde_json::to_string_pretty(record)?;

        {
            let mut file = tokio::fs::File::create(&temp_path)
                .await
                .map_err(|e| StoreError::io(&temp_path, e))?;
            file.write_all(json.as_bytes())
                .await
                .map_err(|e| StoreError::io(&temp_path, e))?;
            file.sync_all()
                .await
                .map_err(|e| StoreError::io(&temp_path, e))?;
        }

        tokio::fs::rename(&temp_path, &final_path)
            .await
            .map_err(|e| StoreError::io(&final_path, e))?;

        debug!("wrote {} at revision {}", final_path.display(), record.revision);
        Ok(())
    }
}

#[async_trait]
impl StatsStore for JsonFileStatsStore {
    async fn load_user_stats(&self, user_id: &str) -> Result<StatsRecord, StoreError> {
        validate_user_id(user_id)?;
        self.read_record(user_id)
            .await?
            .ok_or_else(|| StoreError::NotFound(user_id.to_string()))
    }

    async fn save_user_stats(&self, record: &StatsRecord) -> Result<u64, StoreError> {
        validate_user_id(&record.user_id)?;
        let _guard = self.write_lock.lock().await;

        let stored = self
            .read_record(&record.user_id)
            .await?
            .ok_or_else(|| StoreError::NotFound(record.user_id.clone()))?;
        if stored.revision != record.revision {
            return Err(StoreError::Conflict {
                user_id: record.user_id.clone(),
                expected: record.revision,
                found: stored.revision,
            });
        }

        let next = StatsRecord {
            user_id: record.user_id.clone(),
            stats: record.stats.clone(),
            revision: stored.revision + 1,
            updated_at: Some(Utc::now()),
        };
        self.atomic_write(&next).await?;
        Ok(next.revision)
    }

    async fn create_user_stats(
        &self,
        user_id: &str,
        stats: UserStats,
    ) -> Result<StatsRecord, StoreError> {
        validate_user_id(user_id)?;
        let _guard = self.write_lock.lock().await;

        if let Some(existing) = self.read_record(user_id).await? {
            return Err(StoreError::Conflict {
                user_id: user_id.to_string(),
                expected: 0,
                found: existing.revision,
            });
        }

        let mut record = StatsRecord::new(user_id, stats);
        record.updated_at = Some(Utc::now());
        self.atomic_write(&record).await?;
        Ok(record)
    }
}
