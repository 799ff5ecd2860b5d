//! Integration tests for concurrent file analysis and file watching
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use laser_gcode_tools::config::Args;
use laser_gcode_tools::watch::{resolve, FileWatcher};
use laser_gcode_tools::{analyze_files, Config, PowerMode};
use tokio::fs;

fn summary_config(files: &[PathBuf], dir: &std::path::Path) -> Config {
    let mut argv = vec!["gcode-tools".to_string(), "summary".to_string()];
    argv.extend(files.iter().map(|f| f.display().to_string()));
    Config::from_args_with_user_config(Args::parse_from(argv), dir, None).expect("config")
}

#[tokio::test]
async fn test_missing_file_does_not_affect_others() {
    let dir = tempfile::tempdir().expect("tempdir");
    let first = dir.path().join("first.nc");
    let missing = dir.path().join("missing.nc");
    let last = dir.path().join("last.gcode");

    fs::write(&first, "G1 X10 F4000\nS500\nG1 Y10\n").await.expect("write first");
    fs::write(&last, "M104 S200\nG1 Z0.2 F1500\n").await.expect("write last");

    let files = vec![first.clone(), missing.clone(), last.clone()];
    let outcomes = analyze_files(&files, &summary_config(&files, dir.path())).await;

    assert_eq!(outcomes.len(), 3);
    assert_eq!(outcomes[0].path, first);
    assert_eq!(outcomes[1].path, missing);
    assert_eq!(outcomes[2].path, last);

    let report = outcomes[0].result.as_ref().expect("first file analyzed");
    assert_eq!(report.summary.filename, "first.nc");
    assert_eq!(report.summary.max_feed_rate, 4000.0);
    assert_eq!(report.summary.max_power, 500.0);

    let err = outcomes[1].result.as_ref().expect_err("missing file fails");
    assert!(err.is_io());

    let report = outcomes[2].result.as_ref().expect("last file analyzed");
    assert_eq!(report.summary.max_power, 0.0);
    assert_eq!(report.layer_count, 1);
    assert_eq!(report.thermal.most_common_temperature, Some(200.0));
}

#[tokio::test]
async fn test_project_config_applies_to_batch() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join(".gcode-tools.toml"), "power_mode = \"next-move\"\n")
        .await
        .expect("write config");

    let file = dir.path().join("job.nc");
    fs::write(&file, "G1 X1 S300\n").await.expect("write job");

    let files = vec![file];
    let config = summary_config(&files, dir.path());
    assert!(config.has_project_config());
    assert_eq!(config.machine_options(&[]).power_mode, PowerMode::NextMove);

    let outcomes = analyze_files(&files, &config).await;
    let report = outcomes[0].result.as_ref().expect("analyzed");
    assert_eq!(report.summary.max_power, 300.0);
}

#[tokio::test]
async fn test_watcher_reports_changed_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("watched.nc");
    fs::write(&path, "G1 X1\n").await.expect("write initial file");

    let mut watcher = FileWatcher::new(std::slice::from_ref(&path)).expect("create watcher");

    // Give the backend a moment to register the directory
    tokio::time::sleep(Duration::from_millis(200)).await;
    fs::write(&path, "G1 X2\n").await.expect("rewrite file");

    let changed = tokio::time::timeout(Duration::from_secs(5), watcher.next_change())
        .await
        .expect("change reported before timeout");
    assert_eq!(changed, Some(resolve(&path)));
}

#[tokio::test]
async fn test_watcher_ignores_other_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("watched.nc");
    fs::write(&path, "G1 X1\n").await.expect("write initial file");

    let mut watcher = FileWatcher::new(std::slice::from_ref(&path)).expect("create watcher");
    tokio::time::sleep(Duration::from_millis(200)).await;
    fs::write(dir.path().join("other.nc"), "G1 X2\n")
        .await
        .expect("write unrelated file");

    let changed = tokio::time::timeout(Duration::from_millis(800), watcher.next_change()).await;
    assert!(changed.is_err(), "unrelated file should not be reported");
}
