//! Fetching session exports from disk, config files, and the app refresh path

use std::sync::Arc;
use std::time::Duration;

use research_replay::graph::{JsonFileSource, SessionSource, SessionStatus, SourceError};
use research_replay::replay::ViewMode;
use research_replay::ui::AppEvent;
use research_replay::{App, Config};
use tempfile::TempDir;

use super::common::fixtures::{open_session, write_session, CLOSED_SESSION};

#[tokio::test]
async fn json_file_source_reads_an_export() {
    let dir = TempDir::new().unwrap();
    let path = write_session(dir.path(), "session.json", CLOSED_SESSION);

    let source = JsonFileSource::new(&path);
    assert_eq!(source.describe(), path.display().to_string());

    let export = source.fetch().await.unwrap();
    assert_eq!(export.status(), SessionStatus::Closed);
    assert_eq!(export.session.query.as_deref(), Some("sleep and memory"));
    assert_eq!(export.events.len(), 3);

    let graph = export.into_graph();
    assert_eq!(graph.entities.len(), 6);
    assert_eq!(graph.untimestamped_count(), 1);
}

#[tokio::test]
async fn missing_file_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    let source = JsonFileSource::new(dir.path().join("nope.json"));
    match source.fetch().await {
        Err(SourceError::Io { path, .. }) => assert!(path.ends_with("nope.json")),
        other => panic!("expected Io error, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_json_is_a_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = write_session(dir.path(), "broken.json", r#"{ "branches": [ { "query": 1 } ] }"#);
    let err = JsonFileSource::new(&path).fetch().await.unwrap_err();
    assert!(matches!(err, SourceError::Parse { .. }));
    assert!(err.to_string().contains("Failed to parse session export"));
}

#[test]
fn config_file_overrides_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[playback]
default_speed = 4.0
seek_step_percent = 10.0

[session]
refresh_interval_secs = 5
warn_missing_timestamps = false
"#,
    )
    .unwrap();

    let config = Config::load_from(&path).unwrap();
    assert_eq!(config.speed_range.default, 4.0);
    assert_eq!(config.seek_step, 0.1);
    assert_eq!(config.refresh_interval, Duration::from_secs(5));
    assert!(!config.warn_missing_timestamps);
    // Untouched keys keep their defaults
    assert_eq!(config.frame_interval, Config::default().frame_interval);
}

#[test]
fn invalid_config_file_is_reported() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[playback\ndefault_speed = ").unwrap();
    let err = Config::load_from(&path).unwrap_err();
    assert!(err.to_string().contains("Failed to parse config"));
}

async fn fetched(app: &mut App) {
    loop {
        let event = tokio::time::timeout(Duration::from_secs(5), app.next_event())
            .await
            .expect("refresh timed out")
            .expect("event channel closed");
        let done = matches!(event, AppEvent::SessionFetched { .. });
        app.handle_app_event(event);
        if done {
            return;
        }
    }
}

#[tokio::test]
async fn refresh_picks_up_a_closed_session() {
    let dir = TempDir::new().unwrap();
    let open = open_session();
    let path = write_session(dir.path(), "session.json", &open);
    let source = Arc::new(JsonFileSource::new(&path));
    let export = source.fetch().await.unwrap();

    let mut app = App::new(Config::default(), source, export);
    assert!(!app.controller().can_replay());

    write_session(dir.path(), "session.json", CLOSED_SESSION);
    app.request_refresh();
    fetched(&mut app).await;

    assert!(app.controller().can_replay());
    assert!(app.last_error().is_none());
    app.enter_replay().unwrap();
    assert_eq!(app.controller().mode(), ViewMode::Replay);
}

#[tokio::test]
async fn reopened_session_drops_replay_with_a_notice() {
    let dir = TempDir::new().unwrap();
    let path = write_session(dir.path(), "session.json", CLOSED_SESSION);
    let source = Arc::new(JsonFileSource::new(&path));
    let export = source.fetch().await.unwrap();

    let mut app = App::new(Config::default(), source, export);
    app.enter_replay().unwrap();

    write_session(dir.path(), "session.json", &open_session());
    app.request_refresh();
    fetched(&mut app).await;

    assert_eq!(app.controller().mode(), ViewMode::Live);
    assert_eq!(app.notice(), Some("Session reopened; showing live view"));
}

#[tokio::test]
async fn failed_refresh_keeps_the_last_graph() {
    let dir = TempDir::new().unwrap();
    let path = write_session(dir.path(), "session.json", CLOSED_SESSION);
    let source = Arc::new(JsonFileSource::new(&path));
    let export = source.fetch().await.unwrap();

    let mut app = App::new(Config::default(), source, export);
    std::fs::remove_file(&path).unwrap();
    app.request_refresh();
    fetched(&mut app).await;

    let error = app.last_error().expect("refresh error recorded");
    assert!(error.contains("Failed to read session export"));
    assert_eq!(app.controller().graph().entities.len(), 6);
}
