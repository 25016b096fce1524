//! End-to-end tests for the HTTP surface

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use std::path::Path;
use stresscraft::bench::RunTracker;
use stresscraft::config::ServiceConfig;
use stresscraft::server::{router, AppState};
use tempfile::{tempdir, TempDir};
use tower::ServiceExt;

fn test_config(dir: &TempDir) -> ServiceConfig {
    ServiceConfig::default()
        .with_write_dir(dir.path().join("write"))
        .with_log_file(dir.path().join("status.log"))
        .with_cgroup_root(dir.path().join("cgroup"))
}

async fn get(app: &Router, uri: &str) -> (StatusCode, String) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(body.to_vec()).unwrap())
}

fn count_files(dir: &Path) -> usize {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries.count(),
        Err(_) => 0,
    }
}

#[tokio::test]
async fn test_status_before_any_run() {
    let dir = tempdir().unwrap();
    let app = router(AppState::new(&test_config(&dir)));

    let (status, body) = get(&app, "/write-status").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "No log found");

    let (_, again) = get(&app, "/write-status").await;
    assert_eq!(body, again);
}

#[tokio::test]
async fn test_small_write_test() {
    let dir = tempdir().unwrap();
    let app = router(AppState::new(&test_config(&dir)));

    let (status, body) = get(&app, "/write-test?count=100&size=1").await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["filesWritten"], 100);
    assert_eq!(json["fileSizeKB"], 1);
    assert!((json["totalSizeMB"].as_f64().unwrap() - 0.0977).abs() < 1e-3);
    assert!(json["durationMs"].is_u64());

    let write_dir = dir.path().join("write");
    assert_eq!(count_files(&write_dir), 100);
    for entry in std::fs::read_dir(&write_dir).unwrap() {
        assert_eq!(entry.unwrap().metadata().unwrap().len(), 1024);
    }

    let (_, log) = get(&app, "/write-status").await;
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines[0], "Write test started - 100 files of 1KB each");
    assert_eq!(lines.iter().filter(|l| l.starts_with("Completed: 100 / 100")).count(), 1);
    assert!(!log.contains("Current Progress"));
}

#[tokio::test]
async fn test_defaults_apply_when_params_missing() {
    let dir = tempdir().unwrap();
    let app = router(AppState::new(&test_config(&dir)));

    let (status, body) = get(&app, "/write-test?size=1").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["filesWritten"], 100);
}

#[tokio::test]
async fn test_checkpoints_for_large_run() {
    let dir = tempdir().unwrap();
    let app = router(AppState::new(&test_config(&dir)));

    let (status, _) = get(&app, "/write-test?count=2500&size=10").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(count_files(&dir.path().join("write")), 2500);

    let (_, log) = get(&app, "/write-status").await;
    let progress: Vec<&str> = log.lines().filter(|l| l.starts_with("Progress: ")).collect();
    assert_eq!(progress.len(), 3);
    assert!(progress[0].starts_with("Progress: 1000 / 2500 (40.0%)"));
    assert!(progress[1].starts_with("Progress: 2000 / 2500 (80.0%)"));
    assert!(progress[2].starts_with("Progress: 2500 / 2500 (100.0%)"));

    let completed: Vec<&str> = log.lines().filter(|l| l.starts_with("Completed: ")).collect();
    assert_eq!(completed.len(), 1);
    assert!(completed[0].starts_with("Completed: 2500 / 2500 (100.0%) - Total time: "));
}

#[tokio::test]
async fn test_non_positive_params_rejected_without_io() {
    let dir = tempdir().unwrap();
    let app = router(AppState::new(&test_config(&dir)));

    for uri in [
        "/write-test?count=0&size=1",
        "/write-test?count=10&size=0",
        "/write-test?count=-5&size=1",
    ] {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        let json: Value = serde_json::from_str(&body).unwrap();
        assert!(json["error"].as_str().unwrap().contains("must be positive"));
    }

    assert!(!dir.path().join("write").exists());
    assert!(!dir.path().join("status.log").exists());
    let (_, status_body) = get(&app, "/write-status").await;
    assert_eq!(status_body, "No log found");
}

#[tokio::test]
async fn test_non_positive_params_keep_previous_log() {
    let dir = tempdir().unwrap();
    let app = router(AppState::new(&test_config(&dir)));

    get(&app, "/write-test?count=3&size=1").await;
    let (_, before) = get(&app, "/write-status").await;

    let (status, _) = get(&app, "/write-test?count=0&size=1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, after) = get(&app, "/write-status").await;
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_malformed_params_rejected() {
    let dir = tempdir().unwrap();
    let app = router(AppState::new(&test_config(&dir)));

    let (status, body) = get(&app, "/write-test?count=lots&size=1").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert!(json["error"].as_str().unwrap().starts_with("Invalid argument"));
    assert!(!dir.path().join("write").exists());
}

#[tokio::test]
async fn test_oversized_request_rejected() {
    let dir = tempdir().unwrap();
    let app = router(AppState::new(&test_config(&dir)));

    let (status, _) = get(&app, "/write-test?count=1&size=2048000").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!dir.path().join("write").exists());
}

#[tokio::test]
async fn test_conflict_while_run_active() {
    let dir = tempdir().unwrap();
    let tracker = RunTracker::new();
    let app = router(AppState::with_tracker(&test_config(&dir), tracker.clone()));

    let active = tracker.begin(10).unwrap();
    active.record_progress(4);

    let (status, body) = get(&app, "/write-test?count=5&size=1").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body.contains("already running"));
    assert!(!dir.path().join("write").exists());

    // the active run is untouched
    let state = tracker.snapshot().unwrap();
    assert_eq!(state.run_id, active.run_id());
    assert_eq!(state.files_written, 4);
}

#[tokio::test]
async fn test_live_progress_line_for_active_run() {
    let dir = tempdir().unwrap();
    let config = test_config(&dir);
    std::fs::write(&config.log_file, "Write test started - 10 files of 1KB each\n").unwrap();

    let tracker = RunTracker::new();
    let app = router(AppState::with_tracker(&config, tracker.clone()));
    let active = tracker.begin(10).unwrap();
    active.record_progress(4);

    let (status, body) = get(&app, "/write-status").await;
    assert_eq!(status, StatusCode::OK);
    let last = body.lines().last().unwrap();
    assert!(last.starts_with("Current Progress: 4 / 10 (40.0%) - Elapsed: "));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_status_never_overshoots() {
    let dir = tempdir().unwrap();
    let config = test_config(&dir).with_progress_interval(250);
    let app = router(AppState::new(&config));

    let runner = {
        let app = app.clone();
        tokio::spawn(async move { get(&app, "/write-test?count=3000&size=1").await })
    };

    while !runner.is_finished() {
        let (status, body) = get(&app, "/write-status").await;
        assert_eq!(status, StatusCode::OK);
        for line in body.lines().filter(|l| l.starts_with("Current Progress: ")) {
            let counts: Vec<u64> = line
                .trim_start_matches("Current Progress: ")
                .split(" (")
                .next()
                .unwrap()
                .split(" / ")
                .map(|n| n.parse().unwrap())
                .collect();
            assert!(counts[0] <= counts[1]);
            assert_eq!(counts[1], 3000);
            assert!(!line.contains("Elapsed: -"));
        }
        tokio::task::yield_now().await;
    }

    let (status, _) = runner.await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(count_files(&dir.path().join("write")), 3000);
}

#[tokio::test]
async fn test_host_info_shape() {
    let dir = tempdir().unwrap();
    let config = test_config(&dir);
    std::fs::create_dir_all(&config.cgroup_root).unwrap();
    std::fs::write(config.cgroup_root.join("cpu.max"), "100000 100000\n").unwrap();

    let app = router(AppState::new(&config));
    let (status, body) = get(&app, "/host-info").await;
    assert_eq!(status, StatusCode::OK);

    let json: Value = serde_json::from_str(&body).unwrap();
    assert!(json["cpu"]["logicalCores"].as_u64().unwrap() >= 1);
    assert_eq!(json["cpu"]["cpuLimit"], 1.0);
    assert!(json["memory"]["totalMemBytes"].as_u64().unwrap() > 0);
    assert_eq!(json["memory"]["memoryLimit"], "unlimited");
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let dir = tempdir().unwrap();
    let app = router(AppState::new(&test_config(&dir)));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/write-status")
                .header(header::ORIGIN, "http://dashboard.example:3010")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "*"
    );
}

#[tokio::test]
async fn test_health() {
    let dir = tempdir().unwrap();
    let app = router(AppState::new(&test_config(&dir)));

    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "ok");
}
