//! File watching for live settings reload.
//!
//! The parent directory of every settings file is watched, so files that do
//! not exist yet are picked up once they are created.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

/// Events from the settings watcher
#[derive(Debug)]
pub enum SettingsEvent {
    Changed(PathBuf),
    Error(notify::Error),
}

/// Keeps the underlying watcher alive; dropping it stops watching
pub struct SettingsWatcher {
    _watcher: RecommendedWatcher,
    directories: Vec<PathBuf>,
}

impl std::fmt::Debug for SettingsWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SettingsWatcher")
            .field("directories", &self.directories)
            .finish()
    }
}

impl SettingsWatcher {
    pub fn directories(&self) -> &[PathBuf] {
        &self.directories
    }
}

/// Start watching `files`. Only events touching one of them are forwarded.
pub fn watch_settings_files(
    files: &[PathBuf],
) -> Result<(SettingsWatcher, mpsc::UnboundedReceiver<SettingsEvent>)> {
    let (tx, rx) = mpsc::unbounded_channel();
    let targets: HashSet<PathBuf> = files.iter().cloned().collect();

    let mut watcher = RecommendedWatcher::new(
        move |res: Result<Event, notify::Error>| match res {
            Ok(event) => {
                if let EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) =
                    event.kind
                {
                    for path in event.paths {
                        if is_target(&targets, &path) {
                            let _ = tx.send(SettingsEvent::Changed(path));
                        }
                    }
                }
            }
            Err(e) => {
                let _ = tx.send(SettingsEvent::Error(e));
            }
        },
        Config::default().with_poll_interval(Duration::from_secs(1)),
    )
    .context("Failed to create settings watcher")?;

    let mut directories = Vec::new();
    for dir in files.iter().filter_map(|file| file.parent()) {
        if dir.exists() && !directories.iter().any(|d: &PathBuf| d == dir) {
            watcher
                .watch(dir, RecursiveMode::NonRecursive)
                .with_context(|| format!("Failed to watch {}", dir.display()))?;
            directories.push(dir.to_path_buf());
        }
    }

    Ok((
        SettingsWatcher {
            _watcher: watcher,
            directories,
        },
        rx,
    ))
}

fn is_target(targets: &HashSet<PathBuf>, path: &Path) -> bool {
    if targets.contains(path) {
        return true;
    }
    // Events may carry canonicalized paths (e.g. /private/var on macOS)
    let Some(event_dir) = path.parent().and_then(|dir| dir.canonicalize().ok()) else {
        return false;
    };
    targets.iter().any(|target| {
        target.file_name() == path.file_name()
            && target
                .parent()
                .and_then(|dir| dir.canonicalize().ok())
                .is_some_and(|dir| dir == event_dir)
    })
}
