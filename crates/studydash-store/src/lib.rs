//! studydash-store — persistence for user stats.
//!
//! Both stores implement [`StatsStore`] with optimistic concurrency: a save
//! only lands if the record's revision still matches what is stored.

pub mod file;
pub mod memory;

pub use file::{validate_user_id, JsonFileStatsStore};
pub use memory::MemoryStatsStore;
pub use studydash_core::traits::StatsStore;

#[cfg(test)]
pub(crate) mod conformance {
    use studydash_core::error::StoreError;
    use studydash_core::model::UserStats;
    use studydash_core::traits::StatsStore;

    /// Behaviour every `StatsStore` must share.
    pub async fn check_store_contract<S: StatsStore>(store: &S) {
        assert!(matches!(
            store.load_user_stats("alice").await,
            Err(StoreError::NotFound(_))
        ));

        let created = store
            .create_user_stats("alice", UserStats::default())
            .await
            .unwrap();
        assert_eq!(created.revision, 0);
        assert!(created.updated_at.is_some());

        // Creating twice is a conflict.
        assert!(matches!(
            store.create_user_stats("alice", UserStats::default()).await,
            Err(StoreError::Conflict { .. })
        ));

        let mut loaded = store.load_user_stats("alice").await.unwrap();
        assert_eq!(loaded.stats, UserStats::default());
        loaded.stats.points = 10;
        assert_eq!(store.save_user_stats(&loaded).await.unwrap(), 1);

        let reloaded = store.load_user_stats("alice").await.unwrap();
        assert_eq!(reloaded.revision, 1);
        assert_eq!(reloaded.stats.points, 10);

        // `loaded` still carries revision 0.
        let err = store.save_user_stats(&loaded).await.unwrap_err();
        assert!(matches!(
            err,
            StoreError::Conflict {
                expected: 0,
                found: 1,
                ..
            }
        ));

        let mut ghost = reloaded.clone();
        ghost.user_id = "bob".into();
        assert!(matches!(
            store.save_user_stats(&ghost).await,
            Err(StoreError::NotFound(_))
        ));
    }
}
