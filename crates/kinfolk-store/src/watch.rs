use crate::error::Result;
use crate::paths::is_contact_file;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(100);

/// Coalesces bursts of triggers into one callback, fired once `delay` has passed without a
/// new trigger.
pub struct Debouncer {
    tx: Sender<()>,
    stopped: Arc<AtomicBool>,
}

impl Debouncer {
    pub fn spawn<F>(delay: Duration, mut callback: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<()>();
        let stopped = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stopped);
        thread::spawn(move || {
            while rx.recv().is_ok() {
                loop {
                    match rx.recv_timeout(delay) {
                        Ok(()) => continue,
                        Err(RecvTimeoutError::Timeout) => break,
                        Err(RecvTimeoutError::Disconnected) => return,
                    }
                }
                if stop_flag.load(Ordering::Acquire) {
                    return;
                }
                callback();
            }
        });
        Self { tx, stopped }
    }

    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }

    fn sender(&self) -> Sender<()> {
        self.tx.clone()
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.stopped.store(true, Ordering::Release);
    }
}

/// Keeps a folder subscription alive. Dropping it unsubscribes.
pub struct WatchHandle {
    _watcher: RecommendedWatcher,
    _debouncer: Debouncer,
}

/// Watches `dir` (not its subfolders) and calls `on_change` once per burst of contact file
/// changes.
pub fn watch_folder<F>(dir: &Path, delay: Duration, on_change: F) -> Result<WatchHandle>
where
    F: FnMut() + Send + 'static,
{
    let debouncer = Debouncer::spawn(delay, on_change);
    let tx = debouncer.sender();
    let mut watcher = notify::recommended_watcher(move |result: notify::Result<Event>| {
        match result {
            Ok(event) if is_relevant(&event) => {
                let _ = tx.send(());
            }
            Ok(_) => {}
            Err(err) => tracing::warn!(error = %err, "file watcher error"),
        }
    })?;
    watcher.watch(dir, RecursiveMode::NonRecursive)?;
    tracing::debug!(folder = %dir.display(), "watching contacts folder");

    Ok(WatchHandle {
        _watcher: watcher,
        _debouncer: debouncer,
    })
}

fn is_relevant(event: &Event) -> bool {
    matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    ) && (event.paths.is_empty() || event.paths.iter().any(|path| is_contact_file(path)))
}
