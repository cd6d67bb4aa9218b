//! In-memory stats storage.
//!
//! Records live in a map behind a tokio mutex and are lost when the store is
//! dropped. Used by tests and by callers that only need a process-local
//! ledger.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use studydash_core::error::StoreError;
use studydash_core::model::{StatsRecord, UserStats};
use studydash_core::traits::StatsStore;

/// In-memory stats store.
#[derive(Debug, Default)]
pub struct MemoryStatsStore {
    records: Mutex<HashMap<String, StatsRecord>>,
}

impl MemoryStatsStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of users in the store.
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    /// Whether the store holds no users.
    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

#[async_trait]
impl StatsStore for MemoryStatsStore {
    async fn load_user_stats(&self, user_id: &str) -> Result<StatsRecord, StoreError> {
        self.records
            .lock()
            .await
            .get(user_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(user_id.to_string()))
    }

    async fn save_user_stats(&self, record: &StatsRecord) -> Result<u64, StoreError> {
        let mut records = self.records.lock().await;
        let stored = records
            .get_mut(&record.user_id)
            .ok_or_else(|| StoreError::NotFound(record.user_id.clone()))?;

        if stored.revision != record.revision {
            return Err(StoreError::Conflict {
                user_id: record.user_id.clone(),
                expected: record.revision,
                found: stored.revision,
            });
        }

        stored.stats = record.stats.clone();
        stored.revision += 1;
        stored.updated_at = Some(Utc::now());
        Ok(stored.revision)
    }

    async fn create_user_stats(
        &self,
        user_id: &str,
        stats: UserStats,
    ) -> Result<StatsRecord, StoreError> {
        let mut records = self.records.lock().await;
        if let Some(existing) = records.get(user_id) {
            return Err(StoreError::Conflict {
                user_id: user_id.to_string(),
                expected: 0,
                found: existing.revision,
            });
        }

        let mut record = StatsRecord::new(user_id, stats);
        record.updated_at = Some(Utc::now());
        records.insert(user_id.to_string(), record.clone());
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use studydash_core::ledger::{Answer, ScoreLedger};

    #[tokio::test]
    async fn store_contract() {
        let store = MemoryStatsStore::new();
        crate::conformance::check_store_contract(&store).await;
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn concurrent_answers_do_not_lose_updates() {
        let store = Arc::new(MemoryStatsStore::new());
        let ledger = Arc::new(ScoreLedger::new(store.clone()));
        ledger.enroll("alice").await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let ledger = ledger.clone();
            handles.push(tokio::spawn(async move {
                // Retry on conflict until the answer lands.
                loop {
                    match ledger.record("alice", &Answer::correct("Math")).await {
                        Ok(_) => break,
                        Err(StoreError::Conflict { .. }) => tokio::task::yield_now().await,
                        Err(other) => panic!("unexpected store error: {other}"),
                    }
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let record = store.load_user_stats("alice").await.unwrap();
        assert_eq!(record.stats.points, 80);
        assert_eq!(record.stats.quiz_count, 8);
        assert_eq!(record.revision, 8);
        assert_eq!(record.stats.subject_scores().unwrap()["Math"], 80);
    }
}
