mod common;

use common::{memory_store, services, ScriptedLlm, TableEmbedder};
use resolver_core::config::LoaderConfig;
use resolver_core::idmap::storage_id;
use resolver_core::loader::{load_csv, load_rows, read_rows};
use std::time::{Duration, Instant};

#[tokio::test]
async fn load_continues_past_failed_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("elements.csv");
    std::fs::write(
        &path,
        "UUID,name,category,dataSource\n\
         DE01,血糖,实验室检查,WS 363\n\
         DE02,坏数据,,WS 363\n\
         DE03,收缩压,,WS 363\n\
         DE04,,,WS 363\n",
    )
    .unwrap();

    let store = memory_store();
    let svc = services(
        ScriptedLlm::new("体格检查").failing_on("坏数据"),
        TableEmbedder::new(vec![0.2, 0.4, 0.6]),
        store.clone(),
    );
    let cfg = LoaderConfig {
        delay_ms: 0,
        ..LoaderConfig::default()
    };

    let summary = load_csv(&svc, &path, &cfg).await.unwrap();
    assert_eq!(summary.total, 4);
    assert_eq!(summary.created, 2);
    assert_eq!(summary.failed, 2);
    assert!(summary.finished_at >= summary.started_at);

    let rows: Vec<_> = summary.failures.iter().map(|f| f.row).collect();
    assert_eq!(rows, [2, 4]);
    assert_eq!(summary.failures[0].external_id.as_deref(), Some("DE02"));
    assert_eq!(summary.failures[1].external_id, None);

    // The CSV category wins over classification.
    assert_eq!(store.get(&storage_id("DE01")).unwrap().category, "实验室检查");
    assert_eq!(store.get(&storage_id("DE03")).unwrap().category, "体格检查");
    assert!(store.get(&storage_id("DE02")).is_none());
}

#[tokio::test]
async fn delay_is_applied_after_each_pipeline_call() {
    let csv = "UUID,name,dataSource\nDE01,血糖,WS 363\nDE02,收缩压,WS 363\n";
    let rows = read_rows(csv.as_bytes(), &LoaderConfig::default()).unwrap();
    let svc = services(
        ScriptedLlm::new("实验室检查"),
        TableEmbedder::new(vec![1.0, 0.0, 0.0]),
        memory_store(),
    );

    let started = Instant::now();
    let summary = load_rows(&svc, rows, Duration::from_millis(30)).await;
    assert_eq!(summary.created, 2);
    assert!(started.elapsed() >= Duration::from_millis(60));
}

#[tokio::test]
async fn missing_file_is_an_error() {
    let svc = services(
        ScriptedLlm::new("实验室检查"),
        TableEmbedder::new(vec![1.0, 0.0, 0.0]),
        memory_store(),
    );
    let err = load_csv(
        &svc,
        std::path::Path::new("/nonexistent/elements.csv"),
        &LoaderConfig::default(),
    )
    .await
    .unwrap_err();
    assert!(err.to_string().contains("opening"));
}
