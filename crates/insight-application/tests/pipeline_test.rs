mod common;

use std::collections::BTreeSet;
use std::sync::Arc;

use common::{FixedAnalyzer, GatedAnalyzer, Harness, pdf, record, three_records};
use insight_core::dataset::{InsightRow, TableKind};
use insight_core::session::SessionId;
use insight_infrastructure::{DataLoader, DerivedTables, UnavailableAnalyzer};

#[tokio::test]
async fn test_successful_run_commits_all_tables() {
    let harness = Harness::new(Arc::new(FixedAnalyzer::new(three_records())));
    let id = harness.store.create_session().await.unwrap();
    harness
        .ingestor
        .ingest(&id, vec![pdf("a.pdf", b"%PDF-a"), pdf("b.pdf", b"%PDF-b")])
        .await
        .unwrap();

    let outcome = harness.runner.run(&id).await.unwrap();

    assert_eq!(outcome.insight_count, 3);
    assert!(!outcome.still_dirty);
    let record = harness.store.get_session(&id).await.unwrap();
    assert_eq!(record.insight_count, 3);
    assert!(!record.dirty);
    assert!(record.last_processed_at.is_some());
    assert_eq!(
        record.processed_artifacts,
        TableKind::ALL.into_iter().collect::<BTreeSet<_>>()
    );
    for kind in TableKind::ALL {
        assert!(record.derived_dir.join(kind.file_name()).is_file());
    }

    let dataset = DataLoader::new().load(&record.derived_dir);
    assert_eq!(dataset.insights.len(), 3);
    assert_eq!(dataset.summary().domains_covered, 2);
    assert_eq!(dataset.summary().time_periods, 3);
}

#[tokio::test]
async fn test_empty_result_leaves_session_untouched() {
    let harness = Harness::new(Arc::new(FixedAnalyzer::new(Vec::new())));
    let id = harness.store.create_session().await.unwrap();
    harness.ingestor.ingest(&id, vec![pdf("a.pdf", b"x")]).await.unwrap();
    let before = harness.store.get_session(&id).await.unwrap();

    let err = harness.runner.run(&id).await.unwrap_err();

    assert!(err.is_empty_result());
    let after = harness.store.get_session(&id).await.unwrap();
    assert_eq!(after, before);
    assert!(after.dirty);
    assert_eq!(std::fs::read_dir(&after.derived_dir).unwrap().count(), 0);
}

#[tokio::test]
async fn test_unavailable_analyzer_does_not_block_ingestion() {
    let harness = Harness::new(Arc::new(UnavailableAnalyzer::new()));
    let id = harness.store.create_session().await.unwrap();

    let report = harness.ingestor.ingest(&id, vec![pdf("a.pdf", b"x")]).await.unwrap();
    assert_eq!(report.accepted, vec!["a.pdf"]);

    let before = harness.store.get_session(&id).await.unwrap();
    let err = harness.runner.run(&id).await.unwrap_err();
    assert!(err.is_unavailable());
    assert_eq!(harness.store.get_session(&id).await.unwrap(), before);
}

#[tokio::test]
async fn test_unavailable_is_reported_before_unknown_session() {
    let harness = Harness::new(Arc::new(UnavailableAnalyzer::new()));
    let err = harness.runner.run(&SessionId::from("nope")).await.unwrap_err();
    assert!(err.is_unavailable());
}

#[tokio::test]
async fn test_unknown_session_is_not_found() {
    let harness = Harness::new(Arc::new(FixedAnalyzer::new(three_records())));
    let err = harness.runner.run(&SessionId::from("nope")).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_ingest_after_run_marks_dirty_again() {
    let harness = Harness::new(Arc::new(FixedAnalyzer::new(three_records())));
    let id = harness.store.create_session().await.unwrap();
    harness.ingestor.ingest(&id, vec![pdf("a.pdf", b"x")]).await.unwrap();
    harness.runner.run(&id).await.unwrap();
    assert!(!harness.store.get_session(&id).await.unwrap().dirty);

    harness.ingestor.ingest(&id, vec![pdf("c.pdf", b"y")]).await.unwrap();

    let record = harness.store.get_session(&id).await.unwrap();
    assert!(record.dirty);
    assert_eq!(record.insight_count, 3);
}

#[tokio::test]
async fn test_reprocessing_replaces_tables() {
    let analyzer = Arc::new(FixedAnalyzer::new(vec![record("Energy", "2050", "grids")]));
    let harness = Harness::new(analyzer.clone());
    let id = harness.store.create_session().await.unwrap();
    let record = harness.store.get_session(&id).await.unwrap();
    DerivedTables::new(&record.derived_dir)
        .write(&DataLoader::new().load(&record.derived_dir))
        .unwrap();

    harness.runner.run(&id).await.unwrap();
    harness.runner.run(&id).await.unwrap();

    assert_eq!(analyzer.calls(), 2);
    let rows: Vec<InsightRow> = DerivedTables::new(&record.derived_dir)
        .table(TableKind::Insights)
        .load()
        .unwrap()
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].domain, "Energy");
    let leftovers: Vec<_> = std::fs::read_dir(&record.derived_dir)
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[tokio::test]
async fn test_upload_during_run_keeps_session_dirty() {
    let analyzer = Arc::new(GatedAnalyzer::new(three_records()));
    let harness = Harness::new(analyzer.clone());
    let id = harness.store.create_session().await.unwrap();
    harness.ingestor.ingest(&id, vec![pdf("a.pdf", b"x")]).await.unwrap();

    let runner = harness.runner.clone();
    let run_id = id.clone();
    let run = tokio::spawn(async move { runner.run(&run_id).await });

    analyzer.started.notified().await;
    harness.ingestor.ingest(&id, vec![pdf("late.pdf", b"y")]).await.unwrap();
    analyzer.release.notify_one();

    let outcome = run.await.unwrap().unwrap();
    assert!(outcome.still_dirty);
    let record = harness.store.get_session(&id).await.unwrap();
    assert!(record.dirty);
    assert_eq!(record.insight_count, 3);
    assert_eq!(record.uploaded_files, vec!["a.pdf", "late.pdf"]);
}

#[tokio::test]
async fn test_session_removed_mid_run_commits_nothing() {
    let analyzer = Arc::new(GatedAnalyzer::new(three_records()));
    let harness = Harness::new(analyzer.clone());
    let id = harness.store.create_session().await.unwrap();
    harness.ingestor.ingest(&id, vec![pdf("a.pdf", b"x")]).await.unwrap();
    let record = harness.store.get_session(&id).await.unwrap();

    let runner = harness.runner.clone();
    let run_id = id.clone();
    let run = tokio::spawn(async move { runner.run(&run_id).await });

    analyzer.started.notified().await;
    harness.store.remove_session(&id).await;
    analyzer.release.notify_one();

    let err = run.await.unwrap().unwrap_err();
    // The derived dir is gone by the time tables are staged
    assert!(err.is_filesystem(), "{}", err);
    assert!(!record.session_dir.exists());
    assert!(!harness.store.contains(&id).await);
}

#[tokio::test]
async fn test_staging_failure_keeps_previous_tables() {
    let analyzer = Arc::new(FixedAnalyzer::new(three_records()));
    let harness = Harness::new(analyzer.clone());
    let id = harness.store.create_session().await.unwrap();
    harness.ingestor.ingest(&id, vec![pdf("a.pdf", b"x")]).await.unwrap();
    harness.runner.run(&id).await.unwrap();
    harness.ingestor.ingest(&id, vec![pdf("b.pdf", b"y")]).await.unwrap();

    let before = harness.store.get_session(&id).await.unwrap();
    let read_tables = || -> Vec<Vec<u8>> {
        TableKind::ALL
            .iter()
            .map(|kind| std::fs::read(before.derived_dir.join(kind.file_name())).unwrap())
            .collect()
    };
    let tables_before = read_tables();
    // A directory squatting on the pattern temp path makes the fourth table fail
    std::fs::create_dir(before.derived_dir.join(".pattern.csv.tmp")).unwrap();

    let err = harness.runner.run(&id).await.unwrap_err();

    assert!(err.is_filesystem(), "{}", err);
    assert_eq!(analyzer.calls(), 2);
    assert_eq!(read_tables(), tables_before);
    let after = harness.store.get_session(&id).await.unwrap();
    assert_eq!(after, before);
    assert!(after.dirty);
    for name in [".insights.csv.tmp", ".domain.csv.tmp", ".temporal.csv.tmp"] {
        assert!(!before.derived_dir.join(name).exists(), "{} left behind", name);
    }
}
