//! Data directory watcher for hot reload.

use std::path::{Path, PathBuf};
use std::time::Duration;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

/// A watcher that reports changed `.toml` files in the data directory.
///
/// It only signals; the receiving loop performs the reload on its own thread.
pub struct ConfigWatcher {
    dir: PathBuf,
    change_tx: mpsc::UnboundedSender<PathBuf>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher.
    ///
    /// Returns the watcher and a receiver for changed file paths.
    pub fn new(dir: &Path) -> (Self, mpsc::UnboundedReceiver<PathBuf>) {
        let (change_tx, change_rx) = mpsc::unbounded_channel();

        (Self {
            dir: dir.to_path_buf(),
            change_tx,
        }, change_rx)
    }

    /// Start watching the directory in a background thread.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.change_tx.clone();

        let mut watcher = RecommendedWatcher::new(move |res: notify::Result<Event>| {
            match res {
                Ok(event) => {
                    if !(event.kind.is_modify() || event.kind.is_create()) {
                        return;
                    }
                    for path in event.paths.into_iter().filter(|p| is_document(p)) {
                        tracing::debug!(path = %path.display(), "Document change detected");
                        let _ = tx.send(path);
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            }
        }, Config::default().with_poll_interval(Duration::from_secs(2)))?;

        watcher.watch(&self.dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.dir, "Config watcher started");
        Ok(watcher)
    }
}

/// Backups (`.bak`) and temporary save files are not documents.
fn is_document(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "toml")
}
