//! Watching input files for changes
//!
//! Editors often save by replacing the file, so the parent directories are
//! watched and events are filtered down to the files of interest.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::error::Result;

/// Quiet period that groups the burst of events a single save produces
const DEBOUNCE: Duration = Duration::from_millis(200);

/// Events from the file watcher
#[derive(Debug)]
enum WatcherEvent {
    FileChanged(PathBuf),
    WatcherError(notify::Error),
}

/// Watches a fixed set of files
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    rx: mpsc::UnboundedReceiver<WatcherEvent>,
}

impl FileWatcher {
    pub fn new(files: &[PathBuf]) -> Result<Self> {
        let targets: HashSet<PathBuf> = files.iter().map(|f| resolve(f)).collect();
        let (tx, rx) = mpsc::unbounded_channel();

        let filter = targets.clone();
        let mut watcher = RecommendedWatcher::new(
            move |res: std::result::Result<Event, notify::Error>| match res {
                Ok(event) => {
                    if let EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) =
                        event.kind
                    {
                        for path in event.paths {
                            if filter.contains(&path) {
                                let _ = tx.send(WatcherEvent::FileChanged(path));
                            }
                        }
                    }
                }
                Err(e) => {
                    let _ = tx.send(WatcherEvent::WatcherError(e));
                }
            },
            Config::default().with_poll_interval(Duration::from_secs(1)),
        )?;

        let dirs: HashSet<&Path> = targets.iter().filter_map(|t| t.parent()).collect();
        for dir in dirs {
            watcher.watch(dir, RecursiveMode::NonRecursive)?;
            log::debug!("Watching {}", dir.display());
        }

        Ok(Self {
            _watcher: watcher,
            rx,
        })
    }

    /// Wait for the next change to a watched file
    ///
    /// Returns `None` once the watcher has shut down. Errors reported by the
    /// watcher are logged and skipped.
    pub async fn next_change(&mut self) -> Option<PathBuf> {
        loop {
            match self.rx.recv().await? {
                WatcherEvent::FileChanged(path) => {
                    tokio::time::sleep(DEBOUNCE).await;
                    while self.rx.try_recv().is_ok() {}
                    log::info!("File changed: {}", path.display());
                    return Some(path);
                }
                WatcherEvent::WatcherError(e) => {
                    log::error!("File watcher error: {}", e);
                }
            }
        }
    }
}

/// The path notify will report for `path`
pub fn resolve(path: &Path) -> PathBuf {
    std::fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
