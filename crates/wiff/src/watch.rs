//! Working-tree watcher.
//!
//! notify events (minus anything under `.git`) coalesce through a
//! capacity-1 channel; a 300 ms debounce that restarts on every new
//! burst then posts a single reload event to the main loop. Watcher
//! errors terminate the task silently; the viewer keeps working without
//! live reload.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{sync_channel, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use notify::{EventKind, RecursiveMode, Watcher};

use crate::events::AppEvent;

const DEBOUNCE: Duration = Duration::from_millis(300);

/// Spawn the watcher task for the repository root.
pub fn spawn(root: PathBuf, tx: Sender<AppEvent>) {
    thread::spawn(move || {
        let (raw_tx, raw_rx) = sync_channel::<()>(1);

        let mut watcher = match notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            let Ok(event) = res else { return };
            if !is_relevant(&event.kind) {
                return;
            }
            if event.paths.iter().all(|p| is_git_internal(p)) {
                return;
            }
            // try_send coalesces bursts; a full buffer means a reload
            // is already queued.
            let _ = raw_tx.try_send(());
        }) {
            Ok(watcher) => watcher,
            Err(err) => {
                log::warn!("watcher init failed: {err}");
                return;
            }
        };

        if let Err(err) = watcher.watch(&root, RecursiveMode::Recursive) {
            log::warn!("watcher cannot watch {}: {err}", root.display());
            return;
        }
        log::info!("watching {}", root.display());

        while raw_rx.recv().is_ok() {
            // Restart the debounce window on every further event.
            loop {
                match raw_rx.recv_timeout(DEBOUNCE) {
                    Ok(()) => continue,
                    Err(RecvTimeoutError::Timeout) => {
                        if tx.send(AppEvent::Reload).is_err() {
                            return;
                        }
                        break;
                    }
                    Err(RecvTimeoutError::Disconnected) => return,
                }
            }
        }
    });
}

fn is_relevant(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    )
}

fn is_git_internal(path: &Path) -> bool {
    path.components().any(|c| c.as_os_str() == ".git")
}
