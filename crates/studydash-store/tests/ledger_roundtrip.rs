//! Ledger operations persisted through the JSON file store.

use std::sync::Arc;

use studydash_core::error::StoreError;
use studydash_core::ledger::{Answer, ScoreLedger, SubjectOutcome};
use studydash_core::model::UserStats;
use studydash_core::traits::StatsStore;
use studydash_store::JsonFileStatsStore;
use tempfile::TempDir;

fn ledger_in(dir: &TempDir) -> ScoreLedger<Arc<JsonFileStatsStore>> {
    let store = JsonFileStatsStore::open(dir.path()).unwrap();
    ScoreLedger::new(Arc::new(store))
}

#[tokio::test]
async fn answers_accumulate_across_store_instances() {
    let dir = TempDir::new().unwrap();

    let ledger = ledger_in(&dir);
    ledger.enroll("alice").await.unwrap();
    ledger.record("alice", &Answer::correct("Math")).await.unwrap();
    ledger
        .record("alice", &Answer::incorrect("Math"))
        .await
        .unwrap();
    drop(ledger);

    let ledger = ledger_in(&dir);
    let receipt = ledger
        .record("alice", &Answer::correct("Science"))
        .await
        .unwrap();
    assert_eq!(receipt.points, 20);
    assert_eq!(receipt.quiz_count, 3);
    assert_eq!(receipt.quiz_average, 66);

    let record = ledger.snapshot("alice").await.unwrap();
    assert_eq!(record.revision, 3);
    let chart = record.stats.subject_chart();
    assert!(chart.contains(&("Math".to_string(), 5)));
    assert!(chart.contains(&("Science".to_string(), 10)));
}

#[tokio::test]
async fn corrupt_blob_is_persisted_unchanged() {
    let dir = TempDir::new().unwrap();
    let ledger = ledger_in(&dir);

    let broken = UserStats {
        subject_scores: "not-json".into(),
        ..UserStats::default()
    };
    ledger
        .store()
        .create_user_stats("bob", broken)
        .await
        .unwrap();

    let receipt = ledger.record("bob", &Answer::correct("Math")).await.unwrap();
    assert_eq!(receipt.points, 10);
    assert!(matches!(receipt.subject, SubjectOutcome::Skipped { .. }));

    let record = ledger.snapshot("bob").await.unwrap();
    assert_eq!(record.stats.subject_scores, "not-json");
    assert_eq!(record.stats.points, 10);
    assert_eq!(record.stats.quiz_average, 100);
}

#[tokio::test]
async fn unknown_user_is_not_found() {
    let dir = TempDir::new().unwrap();
    let ledger = ledger_in(&dir);

    let err = ledger
        .record("ghost", &Answer::correct("Math"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(id) if id == "ghost"));
}

#[tokio::test]
async fn stale_record_is_rejected() {
    let dir = TempDir::new().unwrap();
    let ledger = ledger_in(&dir);
    ledger.enroll("carol").await.unwrap();

    let stale = ledger.snapshot("carol").await.unwrap();
    ledger
        .record("carol", &Answer::correct("History"))
        .await
        .unwrap();

    let err = ledger.store().save_user_stats(&stale).await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict { .. }));
}
