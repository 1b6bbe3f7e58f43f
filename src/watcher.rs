//! Debounced filesystem change monitor.
//!
//! Watches the directory containing the target save file and triggers the
//! automatic backup path when the file's content changes, at most once per
//! debounce window. If the directory does not exist yet (the game has not
//! created its save folder), the monitor polls for it on a fixed interval
//! and subscribes once it appears.

use crate::engine::BackupEngine;
use crate::error::BackupError;
use notify::event::{EventKind, ModifyKind};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time;

/// Minimum gap between two automatic-backup triggers.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_secs(5);
/// Poll interval while the target directory does not exist.
const DIR_POLL_INTERVAL: Duration = Duration::from_secs(10);
/// Settling delay between stop and start on restart, so the previous
/// subscription is fully released before a new one is created.
const RESTART_SETTLE: Duration = Duration::from_secs(1);

/// Drops triggers that arrive too soon after the previous one.
///
/// A trigger is admitted when the last *admitted* trigger is at least one
/// window in the past; in-window triggers are dropped, not queued. The
/// timestamp is mutex-guarded: change callbacks and user-initiated triggers
/// can race, and a near-simultaneous second trigger must observe the
/// just-set value.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    last: Mutex<Option<Instant>>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last: Mutex::new(None),
        }
    }

    /// Records a trigger observed at `now` and reports whether it should
    /// fire.
    pub fn admit_at(&self, now: Instant) -> bool {
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());
        match *last {
            Some(prev) if now.duration_since(prev) < self.window => false,
            _ => {
                *last = Some(now);
                true
            }
        }
    }

    pub fn admit(&self) -> bool {
        self.admit_at(Instant::now())
    }
}

enum WatchOutcome {
    /// Shutdown was requested.
    Shutdown,
    /// The event source went away; re-check the directory and resubscribe.
    Lost,
    /// The subscription could not be established.
    SetupFailed,
}

/// Lifecycle handle for the change monitor.
///
/// `start` spawns the watch task on the current tokio runtime; `stop`
/// signals it and waits until the watch subscription has been released.
pub struct FileWatcher {
    engine: BackupEngine,
    debouncer: Arc<Debouncer>,
    task: Option<(watch::Sender<bool>, JoinHandle<()>)>,
}

impl FileWatcher {
    pub fn new(engine: BackupEngine) -> Self {
        Self {
            engine,
            debouncer: Arc::new(Debouncer::new(DEBOUNCE_WINDOW)),
            task: None,
        }
    }

    /// Spawns the watch task. No-op if it is already running.
    pub fn start(&mut self) {
        if self.task.is_some() {
            return;
        }
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let engine = self.engine.clone();
        let debouncer = Arc::clone(&self.debouncer);
        let handle = tokio::spawn(run_watch_loop(engine, debouncer, shutdown_rx));
        self.task = Some((shutdown_tx, handle));
    }

    /// Signals shutdown and waits for the watch task to finish. The notify
    /// subscription is dropped by the task before it exits.
    pub async fn stop(&mut self) {
        if let Some((shutdown_tx, handle)) = self.task.take() {
            let _ = shutdown_tx.send(true);
            let _ = handle.await;
            log::info!("file watch stopped");
        }
    }

    /// Stop, settle, start again.
    pub async fn restart(&mut self) {
        self.stop().await;
        time::sleep(RESTART_SETTLE).await;
        self.start();
    }

    /// True while the watch task is actually alive; a task that bailed out
    /// (for example after a failed subscription) no longer counts.
    pub fn is_running(&self) -> bool {
        self.task
            .as_ref()
            .is_some_and(|(_, handle)| !handle.is_finished())
    }
}

async fn run_watch_loop(
    engine: BackupEngine,
    debouncer: Arc<Debouncer>,
    mut shutdown: watch::Receiver<bool>,
) {
    let target = engine.target_file().to_path_buf();
    let Some(dir) = target.parent().map(Path::to_path_buf) else {
        log::error!("target file has no parent directory: {}", target.display());
        return;
    };

    loop {
        if !dir.exists() {
            log::info!(
                "target directory does not exist yet, waiting for it: {}",
                dir.display()
            );
            if !wait_for_directory(&dir, &mut shutdown).await {
                return;
            }
            log::info!("target directory appeared: {}", dir.display());
        }
        match watch_directory(&engine, &target, &dir, &debouncer, &mut shutdown).await {
            WatchOutcome::Shutdown | WatchOutcome::SetupFailed => return,
            WatchOutcome::Lost => {}
        }
    }
}

/// Polls for `dir` on a fixed interval. Returns false if shutdown was
/// requested before the directory appeared.
async fn wait_for_directory(dir: &Path, shutdown: &mut watch::Receiver<bool>) -> bool {
    let mut ticker = time::interval(DIR_POLL_INTERVAL);
    ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = shutdown.changed() => return false,
            _ = ticker.tick() => {
                if dir.exists() {
                    return true;
                }
            }
        }
    }
}

/// Subscribes to `dir` and dispatches matching events until shutdown or
/// loss of the event source. Returning drops the notify watcher, which
/// releases the subscription.
async fn watch_directory(
    engine: &BackupEngine,
    target: &Path,
    dir: &Path,
    debouncer: &Arc<Debouncer>,
    shutdown: &mut watch::Receiver<bool>,
) -> WatchOutcome {
    let (event_tx, mut event_rx) = mpsc::channel::<notify::Result<Event>>(64);
    let mut watcher = match RecommendedWatcher::new(
        move |res| {
            // Called from notify's own thread, outside the runtime.
            let _ = event_tx.blocking_send(res);
        },
        notify::Config::default(),
    ) {
        Ok(watcher) => watcher,
        Err(err) => {
            log::error!("{}", BackupError::WatchSetupFailed(err));
            return WatchOutcome::SetupFailed;
        }
    };
    if let Err(err) = watcher.watch(dir, RecursiveMode::NonRecursive) {
        log::error!("{}", BackupError::WatchSetupFailed(err));
        return WatchOutcome::SetupFailed;
    }
    log::info!("watching for changes: {}", target.display());

    loop {
        tokio::select! {
            _ = shutdown.changed() => return WatchOutcome::Shutdown,
            received = event_rx.recv() => match received {
                None => {
                    log::warn!("watch event source closed, resubscribing");
                    return WatchOutcome::Lost;
                }
                Some(Ok(event)) => handle_event(engine, target, debouncer, &event),
                Some(Err(err)) => log::warn!("watch error: {err}"),
            }
        }
    }
}

fn handle_event(engine: &BackupEngine, target: &Path, debouncer: &Debouncer, event: &Event) {
    if !is_content_change(&event.kind) {
        return;
    }
    if !event.paths.iter().any(|path| path == target) {
        return;
    }
    log::info!("change detected: {}", target.display());

    // The window is measured from the last initiated backup, so the
    // timestamp is recorded here, before the copy runs.
    if !debouncer.admit() {
        log::debug!("change within debounce window, dropped");
        return;
    }
    let engine = engine.clone();
    tokio::task::spawn_blocking(move || match engine.run_auto_backup() {
        Ok(Some(path)) => log::debug!("automatic backup finished: {}", path.display()),
        Ok(None) => {}
        Err(err) => log::warn!("automatic backup failed: {err}"),
    });
}

/// Content writes only. Creates, removes, renames and attribute-only
/// events on the watched directory never trigger a backup.
fn is_content_change(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Modify(ModifyKind::Data(_)) | EventKind::Modify(ModifyKind::Any)
    )
}
