use crate::config::WatcherSection;
use crate::error::{KeyIndexError, Result};
use crate::event::FileEvent;
use crate::key_index::IndexOutcome;
use crate::project::ProjectIndexer;
use log::{debug, info, warn};
use notify::event::{ModifyKind, RenameMode};
use notify::{
    Config as NotifyConfig, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time;

const DEFAULT_REASON: &str = "fs_event";

#[derive(Debug, Clone)]
pub struct IndexUpdate {
    pub completed_at: SystemTime,
    pub duration_ms: u64,
    /// Pending changes or submitted events processed.
    pub changes: usize,
    /// How many of them changed the store.
    pub applied: usize,
    /// Indexed files after the update.
    pub files: usize,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct WatcherHealth {
    pub last_update: Option<SystemTime>,
    pub last_duration_ms: Option<u64>,
    pub pending_changes: usize,
    pub indexing: bool,
    pub updates: u64,
    pub watcher_errors: u64,
}

impl WatcherHealth {
    const fn initial() -> Self {
        Self {
            last_update: None,
            last_duration_ms: None,
            pending_changes: 0,
            indexing: false,
            updates: 0,
            watcher_errors: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct StreamingIndexerConfig {
    pub debounce: Duration,
    pub max_batch_wait: Duration,
    pub notify_poll_interval: Duration,
}

impl Default for StreamingIndexerConfig {
    fn default() -> Self {
        Self::from(&WatcherSection::default())
    }
}

impl From<&WatcherSection> for StreamingIndexerConfig {
    fn from(section: &WatcherSection) -> Self {
        Self {
            debounce: section.debounce(),
            max_batch_wait: section.max_batch_wait(),
            notify_poll_interval: section.poll_interval(),
        }
    }
}

/// Keeps a project's key index current.
///
/// A single task owns every mutation: raw file-system events are debounced
/// and applied in arrival order, host-submitted [`FileEvent`]s are applied
/// as they arrive. Queries read the project's [`crate::KeyIndex`] directly.
#[derive(Clone)]
pub struct StreamingIndexer {
    inner: Arc<StreamingIndexerInner>,
}

struct StreamingIndexerInner {
    command_tx: mpsc::Sender<WatcherCommand>,
    update_tx: broadcast::Sender<IndexUpdate>,
    health_tx: watch::Sender<WatcherHealth>,
    _watcher: std::sync::Mutex<Option<RecommendedWatcher>>,
}

enum WatcherCommand {
    Submit(FileEvent),
    Flush { reason: String },
    Shutdown,
}

impl StreamingIndexer {
    /// Watch the project root for changes.
    ///
    /// Must be called inside a tokio runtime. The initial scan is not run
    /// here; call [`ProjectIndexer::index`] first.
    pub fn start(project: Arc<ProjectIndexer>, config: StreamingIndexerConfig) -> Result<Self> {
        let (event_tx, event_rx) = mpsc::channel(1024);
        let watcher = create_fs_watcher(project.root(), event_tx, config.notify_poll_interval)?;
        Ok(Self::spawn(project, config, event_rx, Some(watcher)))
    }

    /// Run the update loop without an OS watcher; the host feeds it through
    /// [`StreamingIndexer::submit`].
    #[must_use]
    pub fn start_unwatched(project: Arc<ProjectIndexer>, config: StreamingIndexerConfig) -> Self {
        let (_event_tx, event_rx) = mpsc::channel(1);
        Self::spawn(project, config, event_rx, None)
    }

    fn spawn(
        project: Arc<ProjectIndexer>,
        config: StreamingIndexerConfig,
        event_rx: mpsc::Receiver<notify::Result<Event>>,
        watcher: Option<RecommendedWatcher>,
    ) -> Self {
        let (command_tx, command_rx) = mpsc::channel(64);
        let (health_tx, _) = watch::channel(WatcherHealth::initial());
        let (update_tx, _) = broadcast::channel(32);

        spawn_update_loop(
            project,
            config,
            event_rx,
            command_rx,
            update_tx.clone(),
            health_tx.clone(),
        );

        Self {
            inner: Arc::new(StreamingIndexerInner {
                command_tx,
                update_tx,
                health_tx,
                _watcher: std::sync::Mutex::new(watcher),
            }),
        }
    }

    pub async fn submit(&self, event: FileEvent) -> Result<()> {
        self.send(WatcherCommand::Submit(event)).await
    }

    /// Apply pending file-system changes now instead of after the debounce.
    pub async fn flush(&self, reason: impl Into<String>) -> Result<()> {
        self.send(WatcherCommand::Flush {
            reason: reason.into(),
        })
        .await
    }

    async fn send(&self, command: WatcherCommand) -> Result<()> {
        self.inner
            .command_tx
            .send(command)
            .await
            .map_err(|e| KeyIndexError::Other(format!("index update loop stopped: {e}")))
    }

    #[must_use]
    pub fn subscribe_updates(&self) -> broadcast::Receiver<IndexUpdate> {
        self.inner.update_tx.subscribe()
    }

    #[must_use]
    pub fn health_snapshot(&self) -> WatcherHealth {
        self.inner.health_tx.subscribe().borrow().clone()
    }
}

impl Drop for StreamingIndexer {
    fn drop(&mut self) {
        if Arc::strong_count(&self.inner) == 1 {
            let _ = self.inner.command_tx.try_send(WatcherCommand::Shutdown);
        }
    }
}

fn create_fs_watcher(
    root: &Path,
    sender: mpsc::Sender<notify::Result<Event>>,
    poll_interval: Duration,
) -> Result<RecommendedWatcher> {
    let root = root.to_path_buf();
    let mut watcher = RecommendedWatcher::new(
        move |res| {
            let _ = sender.blocking_send(res);
        },
        NotifyConfig::default().with_poll_interval(poll_interval),
    )?;
    watcher.watch(&root, RecursiveMode::Recursive)?;
    info!("Watching {}", root.display());
    Ok(watcher)
}

fn spawn_update_loop(
    project: Arc<ProjectIndexer>,
    config: StreamingIndexerConfig,
    mut event_rx: mpsc::Receiver<notify::Result<Event>>,
    mut command_rx: mpsc::Receiver<WatcherCommand>,
    update_tx: broadcast::Sender<IndexUpdate>,
    health_tx: watch::Sender<WatcherHealth>,
) {
    tokio::spawn(async move {
        let mut state = DebounceState::new(config.debounce, config.max_batch_wait);
        let mut health = WatcherHealth::initial();

        loop {
            let next_deadline = state.next_deadline();

            tokio::select! {
                Some(event) = event_rx.recv() => {
                    match event {
                        Ok(event) => {
                            if handle_event(&project, &event, &mut state) {
                                health.pending_changes = state.pending();
                                health_tx.send_replace(health.clone());
                            }
                        }
                        Err(err) => {
                            warn!("Watcher error: {err}");
                            health.watcher_errors += 1;
                            health_tx.send_replace(health.clone());
                        }
                    }
                }
                Some(cmd) = command_rx.recv() => {
                    match cmd {
                        WatcherCommand::Submit(event) => {
                            let started = Instant::now();
                            let applied = usize::from(project.apply(event));
                            publish(&project, &mut health, &health_tx, &update_tx, UpdateSummary {
                                started,
                                changes: 1,
                                applied,
                                reason: "submitted".to_string(),
                            });
                        }
                        WatcherCommand::Flush { reason } => {
                            state.force_run(reason);
                        }
                        WatcherCommand::Shutdown => break,
                    }
                }
                () = async {
                    if let Some(deadline) = next_deadline {
                        time::sleep_until(deadline).await;
                    }
                }, if state.should_run() && next_deadline.is_some() => {
                    health.indexing = true;
                    health_tx.send_replace(health.clone());

                    let started = Instant::now();
                    let (changes, reason) = state.take();
                    let total = changes.len();
                    let applied = apply_changes(&project, changes).await;
                    info!("Applied {applied} of {total} file changes ({reason})");
                    publish(&project, &mut health, &health_tx, &update_tx, UpdateSummary {
                        started,
                        changes: total,
                        applied,
                        reason,
                    });
                }
                else => break,
            }
        }
        debug!("Index update loop for {} stopped", project.root().display());
    });
}

struct UpdateSummary {
    started: Instant,
    changes: usize,
    applied: usize,
    reason: String,
}

fn publish(
    project: &ProjectIndexer,
    health: &mut WatcherHealth,
    health_tx: &watch::Sender<WatcherHealth>,
    update_tx: &broadcast::Sender<IndexUpdate>,
    summary: UpdateSummary,
) {
    #[allow(clippy::cast_possible_truncation)]
    let duration_ms = summary.started.elapsed().as_millis() as u64;
    let now = SystemTime::now();
    health.last_update = Some(now);
    health.last_duration_ms = Some(duration_ms);
    health.indexing = false;
    health.pending_changes = 0;
    health.updates += 1;
    health_tx.send_replace(health.clone());
    let _ = update_tx.send(IndexUpdate {
        completed_at: now,
        duration_ms,
        changes: summary.changes,
        applied: summary.applied,
        files: project.keys().store().len(),
        reason: summary.reason,
    });
}

/// A file-system change waiting for the debounce window to close.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PendingChange {
    Upsert(PathBuf),
    /// Upsert if the path still exists, remove otherwise.
    Refresh(PathBuf),
    Remove(PathBuf),
    Rename { from: PathBuf, to: PathBuf },
}

fn classify_event(event: &Event) -> Vec<PendingChange> {
    let paths = event.paths.iter().cloned();
    match &event.kind {
        EventKind::Create(_) => paths.map(PendingChange::Upsert).collect(),
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) if event.paths.len() >= 2 => {
            vec![PendingChange::Rename {
                from: event.paths[0].clone(),
                to: event.paths[1].clone(),
            }]
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::From)) => {
            paths.map(PendingChange::Remove).collect()
        }
        EventKind::Modify(ModifyKind::Name(RenameMode::To)) => {
            paths.map(PendingChange::Upsert).collect()
        }
        EventKind::Modify(ModifyKind::Name(_)) | EventKind::Any => {
            paths.map(PendingChange::Refresh).collect()
        }
        EventKind::Modify(ModifyKind::Metadata(_)) => Vec::new(),
        EventKind::Modify(_) => paths.map(PendingChange::Upsert).collect(),
        EventKind::Remove(_) => paths.map(PendingChange::Remove).collect(),
        EventKind::Access(_) | EventKind::Other => Vec::new(),
    }
}

fn is_relevant_path(project: &ProjectIndexer, path: &Path) -> bool {
    project
        .identity_for(path)
        .is_some_and(|identity| project.filter().is_relevant(&identity))
}

/// Drops changes outside the root or inside ignored directories; a rename
/// across that boundary degrades to a remove or an upsert.
fn relevant_change(project: &ProjectIndexer, change: PendingChange) -> Option<PendingChange> {
    let relevant = match &change {
        PendingChange::Rename { from, to } => {
            match (is_relevant_path(project, from), is_relevant_path(project, to)) {
                (true, true) => true,
                (true, false) => return Some(PendingChange::Remove(from.clone())),
                (false, true) => return Some(PendingChange::Upsert(to.clone())),
                (false, false) => false,
            }
        }
        PendingChange::Upsert(path) | PendingChange::Refresh(path) | PendingChange::Remove(path) => {
            is_relevant_path(project, path)
        }
    };
    relevant.then_some(change)
}

fn handle_event(project: &ProjectIndexer, event: &Event, state: &mut DebounceState) -> bool {
    let mut recorded = false;
    for change in classify_event(event) {
        if let Some(change) = relevant_change(project, change) {
            recorded |= state.record(change);
        }
    }
    recorded
}

/// Apply changes in order; returns how many changed the store.
async fn apply_changes(project: &ProjectIndexer, changes: Vec<PendingChange>) -> usize {
    let mut applied = 0;
    for change in changes {
        applied += match change {
            PendingChange::Upsert(path) => upsert(project, &path).await,
            PendingChange::Refresh(path) => {
                if tokio::fs::metadata(&path).await.is_ok() {
                    upsert(project, &path).await
                } else {
                    remove(project, &path)
                }
            }
            PendingChange::Remove(path) => remove(project, &path),
            PendingChange::Rename { from, to } => rename(project, &from, &to).await,
        };
    }
    applied
}

async fn upsert(project: &ProjectIndexer, path: &Path) -> usize {
    let is_dir = tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_dir())
        .unwrap_or(false);
    if is_dir {
        let files = project.scanner().scan_dir(path);
        return project.index_paths(&files).await.indexed;
    }
    match project.index_path(path).await {
        Some(IndexOutcome::Indexed { .. } | IndexOutcome::ParseFailed) => 1,
        Some(IndexOutcome::Skipped) | None => 0,
    }
}

fn remove(project: &ProjectIndexer, path: &Path) -> usize {
    project.identity_for(path).map_or(0, |identity| {
        usize::from(project.apply(FileEvent::Deleted { identity }))
    })
}

async fn rename(project: &ProjectIndexer, from: &Path, to: &Path) -> usize {
    let (Some(from_id), Some(to_id)) = (project.identity_for(from), project.identity_for(to))
    else {
        return 0;
    };

    let to_is_dir = tokio::fs::metadata(to)
        .await
        .map(|meta| meta.is_dir())
        .unwrap_or(false);
    if to_is_dir {
        let dropped = remove(project, from);
        return dropped + upsert(project, to).await;
    }

    if project.apply(FileEvent::Renamed {
        from: from_id,
        to: to_id,
    }) {
        1
    } else {
        // atomic saves rename a temp file over the target
        upsert(project, to).await
    }
}

struct DebounceState {
    debounce: Duration,
    max_batch: Duration,
    pending: Vec<PendingChange>,
    last_event: Option<Instant>,
    first_event: Option<Instant>,
    reason: Option<String>,
    force_immediate: bool,
}

impl DebounceState {
    const fn new(debounce: Duration, max_batch: Duration) -> Self {
        Self {
            debounce,
            max_batch,
            pending: Vec::new(),
            last_event: None,
            first_event: None,
            reason: None,
            force_immediate: false,
        }
    }

    /// Queue a change; an exact repeat of the latest change is dropped.
    fn record(&mut self, change: PendingChange) -> bool {
        let now = Instant::now();
        self.last_event = Some(now);
        self.first_event.get_or_insert(now);
        if self.pending.last() == Some(&change) {
            return false;
        }
        self.pending.push(change);
        true
    }

    fn force_run(&mut self, reason: String) {
        self.reason = Some(reason);
        self.force_immediate = true;
    }

    fn pending(&self) -> usize {
        self.pending.len()
    }

    fn should_run(&self) -> bool {
        self.force_immediate || !self.pending.is_empty()
    }

    fn next_deadline(&self) -> Option<time::Instant> {
        if !self.should_run() {
            return None;
        }

        if self.force_immediate {
            return Some(time::Instant::now());
        }

        let mut deadline = None;

        if let Some(last) = self.last_event {
            deadline = Some(last + self.debounce);
        }

        if let Some(first) = self.first_event {
            let forced = first + self.max_batch;
            deadline = Some(match deadline {
                Some(current) if forced < current => forced,
                Some(current) => current,
                None => forced,
            });
        }

        deadline.map(time::Instant::from_std)
    }

    /// Drain pending changes and reset the window.
    fn take(&mut self) -> (Vec<PendingChange>, String) {
        let changes = std::mem::take(&mut self.pending);
        let reason = self
            .reason
            .take()
            .unwrap_or_else(|| DEFAULT_REASON.to_string());
        self.last_event = None;
        self.first_event = None;
        self.force_immediate = false;
        (changes, reason)
    }
}
