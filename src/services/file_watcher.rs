//! Screenshot watcher for `claimwatch watch`.
//!
//! Monitors `screenshots/` recursively for new or rewritten PNG files and
//! broadcasts them, debounced, as `(map, path)` events. The map is the name
//! of the directory directly below `screenshots/`.

use notify::{Config, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, Mutex};

use crate::models::MapId;

/// Quiet period before a changed file is reported
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// A screenshot ready to be checked
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScreenshotEvent {
    pub map_id: MapId,
    pub path: PathBuf,
}

/// Watches the screenshots directory
pub struct ScreenshotWatcher {
    sender: broadcast::Sender<ScreenshotEvent>,
    /// Handle to the watcher (kept alive)
    _watcher: RecommendedWatcher,
}

impl ScreenshotWatcher {
    /// Start watching `root`, which must exist.
    pub fn new(root: &Path, debounce: Duration) -> Result<Self, notify::Error> {
        let (sender, _) = broadcast::channel(64);
        let watcher = Self::start_watcher(root, debounce, sender.clone())?;
        tracing::info!(path = %root.display(), "Screenshot watcher started");
        Ok(Self {
            sender,
            _watcher: watcher,
        })
    }

    fn start_watcher(
        root: &Path,
        debounce: Duration,
        sender: broadcast::Sender<ScreenshotEvent>,
    ) -> Result<RecommendedWatcher, notify::Error> {
        let (tx, mut rx) = mpsc::channel::<PathBuf>(256);

        let root_owned = root.to_path_buf();
        tokio::spawn(async move {
            let pending: Arc<Mutex<HashSet<PathBuf>>> = Arc::new(Mutex::new(HashSet::new()));
            let pending_clone = pending.clone();

            tokio::spawn(async move {
                loop {
                    tokio::time::sleep(debounce).await;
                    let mut guard = pending_clone.lock().await;
                    if guard.is_empty() {
                        continue;
                    }
                    let mut paths: Vec<PathBuf> = guard.drain().collect();
                    drop(guard);
                    paths.sort();
                    for path in paths {
                        match map_for_path(&root_owned, &path) {
                            Some(map_id) => {
                                tracing::debug!(map_id = %map_id, path = %path.display(), "Screenshot changed");
                                let _ = sender.send(ScreenshotEvent { map_id, path });
                            }
                            None => {
                                tracing::debug!(path = %path.display(), "Ignoring file outside a map directory");
                            }
                        }
                    }
                }
            });

            while let Some(path) = rx.recv().await {
                pending.lock().await.insert(path);
            }
        });

        let mut watcher = RecommendedWatcher::new(
            move |res: Result<notify::Event, notify::Error>| {
                let Ok(event) = res else {
                    return;
                };
                if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
                    return;
                }
                for path in event.paths {
                    if is_png(&path) {
                        let _ = tx.blocking_send(path);
                    }
                }
            },
            Config::default(),
        )?;

        watcher.watch(root, RecursiveMode::Recursive)?;

        Ok(watcher)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ScreenshotEvent> {
        self.sender.subscribe()
    }
}

fn is_png(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.eq_ignore_ascii_case("png"))
        .unwrap_or(false)
}

/// Map owning `path`: the first component below `root`, when it is a valid
/// map id and the file sits directly inside it.
pub fn map_for_path(root: &Path, path: &Path) -> Option<MapId> {
    let relative = path.strip_prefix(root).ok()?;
    let mut components = relative.components();
    let dir = components.next()?.as_os_str().to_str()?;
    components.next()?;
    if components.next().is_some() {
        return None;
    }
    MapId::parse(dir).ok()
}
