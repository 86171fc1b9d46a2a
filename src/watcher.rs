//! Watch mode: re-applies the classifier to files as they appear.
//!
//! ```text
//!  notify callback ──► events  ─┐
//!                  └─► errors  ─┼─► run_event_loop ─► Reconciler::handle
//!  ctrlc handler  ───► interrupt┘        (single thread, select!)
//! ```
//!
//! Events for the same path inside [`DEBOUNCE_WINDOW`] are suppressed. All
//! state lives on the loop's thread, so nothing here is locked.

use crate::classifier::{Classification, Classifier};
use crate::file_category::is_sentinel_category;
use crate::file_organizer::{FileOrganizer, OrganizeError};
use crate::output::OutputFormatter;
use crossbeam_channel::{Receiver, select};
use notify::event::{EventKind, ModifyKind, RenameMode};
use notify::{RecursiveMode, Watcher};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Minimum spacing between two accepted events for one path.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(500);

/// Table size above which stale entries are swept.
const EVICTION_THRESHOLD: usize = 1024;

/// Entries older than this many windows are swept.
const EVICTION_AGE_WINDOWS: u32 = 4;

/// Errors that prevent watch mode from starting.
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// The directory to watch does not exist.
    #[error("directory does not exist: {}", .0.display())]
    RootNotFound(PathBuf),
    /// The filesystem notifier could not be created or attached.
    #[error("failed to start file watcher: {0}")]
    Init(#[from] notify::Error),
    /// The interrupt handler could not be installed.
    #[error("failed to install interrupt handler: {0}")]
    Signal(#[from] ctrlc::Error),
}

/// Last accepted event time per path.
#[derive(Debug)]
pub struct DebounceTable {
    window: Duration,
    last_accepted: HashMap<PathBuf, Instant>,
}

impl Default for DebounceTable {
    fn default() -> Self {
        Self::new(DEBOUNCE_WINDOW)
    }
}

impl DebounceTable {
    /// Creates an empty table with the given window.
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_accepted: HashMap::new(),
        }
    }

    /// Accepts the event if `path` has no accepted event within the window
    /// before `now`, recording `now` as its new timestamp.
    pub fn accept(&mut self, path: &Path, now: Instant) -> bool {
        if let Some(last) = self.last_accepted.get(path)
            && now.saturating_duration_since(*last) < self.window
        {
            return false;
        }

        if self.last_accepted.len() >= EVICTION_THRESHOLD {
            self.evict(now);
        }
        self.last_accepted.insert(path.to_path_buf(), now);
        true
    }

    /// Drops entries that are several windows old. Such entries would be
    /// accepted again anyway.
    fn evict(&mut self, now: Instant) {
        let max_age = self.window * EVICTION_AGE_WINDOWS;
        let before = self.last_accepted.len();
        self.last_accepted
            .retain(|_, last| now.saturating_duration_since(*last) < max_age);
        tracing::debug!(
            evicted = before - self.last_accepted.len(),
            remaining = self.last_accepted.len(),
            "swept debounce table"
        );
    }

    /// Number of paths with a recorded event.
    pub fn len(&self) -> usize {
        self.last_accepted.len()
    }

    /// Returns true if no event has been recorded.
    pub fn is_empty(&self) -> bool {
        self.last_accepted.is_empty()
    }
}

/// The kinds of change the reconciler distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// A file appeared, either created in place or renamed into the root.
    Create,
    /// File content changed.
    Write,
    /// Anything else (remove, rename away, metadata, access).
    Other,
}

impl From<&EventKind> for ChangeKind {
    fn from(kind: &EventKind) -> Self {
        match kind {
            EventKind::Create(_)
            | EventKind::Modify(ModifyKind::Name(
                RenameMode::To | RenameMode::Both | RenameMode::Any,
            )) => ChangeKind::Create,
            EventKind::Modify(ModifyKind::Data(_)) | EventKind::Modify(ModifyKind::Any) => {
                ChangeKind::Write
            }
            _ => ChangeKind::Other,
        }
    }
}

/// What the reconciler did with one event.
#[derive(Debug)]
pub enum WatchOutcome {
    /// Not a create or write event.
    IgnoredKind,
    /// Duplicate inside the debounce window.
    Suppressed,
    /// The path vanished or is not a regular file.
    NotAFile,
    /// An ignore pattern matched.
    Excluded,
    /// The file name has no extension.
    NoExtension,
    /// The extension has no mapping.
    UnknownExtension(String),
    /// Mapped to a category that is never relocated.
    SkippedCategory(String),
    /// The file already sits at its destination.
    AlreadyInPlace,
    /// Dry-run: the file would be moved to this destination.
    WouldMove(PathBuf),
    /// The file was moved to this destination.
    Moved(PathBuf),
    /// The move failed.
    Failed(OrganizeError),
}

/// Counters for a watch session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WatchStats {
    /// Files moved, or that would be moved in dry-run mode.
    pub moved: usize,
    /// Accepted events that led to no move.
    pub skipped: usize,
    /// Duplicate events dropped by the debounce table.
    pub suppressed: usize,
    /// Moves that failed.
    pub failed: usize,
}

/// Applies the classifier to individual change events under one root.
pub struct Reconciler {
    root: PathBuf,
    classifier: Classifier,
    dry_run: bool,
    debounce: DebounceTable,
    stats: WatchStats,
}

impl Reconciler {
    /// Creates a reconciler that files into category folders under `root`.
    pub fn new(root: impl Into<PathBuf>, classifier: Classifier, dry_run: bool) -> Self {
        Self {
            root: root.into(),
            classifier,
            dry_run,
            debounce: DebounceTable::default(),
            stats: WatchStats::default(),
        }
    }

    /// The watched root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Counters accumulated so far.
    pub fn stats(&self) -> WatchStats {
        self.stats
    }

    /// Handles an event observed now.
    pub fn handle(&mut self, path: &Path, kind: ChangeKind) -> WatchOutcome {
        self.handle_at(path, kind, Instant::now())
    }

    /// Handles an event observed at `now`.
    pub fn handle_at(&mut self, path: &Path, kind: ChangeKind, now: Instant) -> WatchOutcome {
        let outcome = self.reconcile(path, kind, now);
        match &outcome {
            WatchOutcome::IgnoredKind => {}
            WatchOutcome::Suppressed => self.stats.suppressed += 1,
            WatchOutcome::WouldMove(_) | WatchOutcome::Moved(_) => self.stats.moved += 1,
            WatchOutcome::Failed(_) => self.stats.failed += 1,
            _ => self.stats.skipped += 1,
        }
        outcome
    }

    fn reconcile(&mut self, path: &Path, kind: ChangeKind, now: Instant) -> WatchOutcome {
        if kind == ChangeKind::Other {
            return WatchOutcome::IgnoredKind;
        }

        if !self.debounce.accept(path, now) {
            return WatchOutcome::Suppressed;
        }

        // The event and this stat are not atomic; the file may be gone already.
        match fs::metadata(path) {
            Ok(metadata) if metadata.is_file() => {}
            _ => return WatchOutcome::NotAFile,
        }

        let category = match self.classifier.classify(path) {
            Classification::Excluded => return WatchOutcome::Excluded,
            Classification::NoExtension => return WatchOutcome::NoExtension,
            Classification::Unknown { extension } => {
                return WatchOutcome::UnknownExtension(extension);
            }
            Classification::Mapped { category } if is_sentinel_category(&category) => {
                return WatchOutcome::SkippedCategory(category);
            }
            Classification::Mapped { category } => category,
        };

        let Some(file_name) = path.file_name() else {
            return WatchOutcome::NotAFile;
        };
        let destination = self.root.join(&category).join(file_name);

        if destination == path {
            return WatchOutcome::AlreadyInPlace;
        }

        if self.dry_run {
            return WatchOutcome::WouldMove(destination);
        }

        match FileOrganizer::move_file(path, &destination) {
            Ok(()) => WatchOutcome::Moved(destination),
            Err(e) => WatchOutcome::Failed(e),
        }
    }
}

/// Why the event loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// The notifier's event channel closed.
    ChannelClosed,
    /// An interrupt was received.
    Interrupted,
}

/// Drives `reconciler` from the notifier's channels until the event channel
/// closes or an interrupt arrives. Pending events are not flushed.
pub fn run_event_loop(
    reconciler: &mut Reconciler,
    events: &Receiver<notify::Event>,
    errors: &Receiver<notify::Error>,
    interrupt: &Receiver<()>,
) -> LoopExit {
    let never = crossbeam_channel::never();
    let mut errors_open = true;

    loop {
        let error_source = if errors_open { errors } else { &never };
        select! {
            recv(interrupt) -> _ => {
                tracing::info!("interrupt received, stopping watch");
                return LoopExit::Interrupted;
            }
            recv(events) -> msg => match msg {
                Ok(event) => {
                    let kind = ChangeKind::from(&event.kind);
                    for path in &event.paths {
                        let outcome = reconciler.handle(path, kind);
                        report(path, &outcome);
                    }
                }
                Err(_) => {
                    tracing::info!("notification channel closed, stopping watch");
                    return LoopExit::ChannelClosed;
                }
            },
            recv(error_source) -> msg => match msg {
                Ok(e) => {
                    tracing::warn!("[ERROR] watcher error: {}", e);
                    OutputFormatter::warning(&format!("Watcher error: {}", e));
                }
                Err(_) => errors_open = false,
            },
        }
    }
}

fn report(path: &Path, outcome: &WatchOutcome) {
    match outcome {
        WatchOutcome::IgnoredKind => {}
        WatchOutcome::Suppressed => {
            tracing::debug!(file = %path.display(), "duplicate event suppressed");
        }
        WatchOutcome::NotAFile => {
            tracing::debug!(file = %path.display(), "not a regular file, dropped");
        }
        WatchOutcome::Excluded => {
            tracing::debug!(file = %path.display(), "excluded by ignore pattern");
        }
        WatchOutcome::NoExtension => {
            tracing::debug!(file = %path.display(), "no extension, skipped");
        }
        WatchOutcome::UnknownExtension(ext) => {
            tracing::debug!(file = %path.display(), extension = %ext, "unknown extension, skipped");
        }
        WatchOutcome::SkippedCategory(category) => {
            tracing::debug!(file = %path.display(), category = %category, "category is not relocated");
        }
        WatchOutcome::AlreadyInPlace => {
            tracing::debug!(file = %path.display(), "already in place");
        }
        WatchOutcome::WouldMove(destination) => {
            tracing::info!(source = %path.display(), destination = %destination.display(), "[DRY-RUN] would move");
            OutputFormatter::dry_run_notice(&format!(
                "Would move: {} -> {}",
                path.display(),
                destination.display()
            ));
        }
        WatchOutcome::Moved(destination) => {
            tracing::info!(source = %path.display(), destination = %destination.display(), "[MOVE] moved");
            OutputFormatter::success(&format!(
                "Moved: {} -> {}",
                path.display(),
                destination.display()
            ));
        }
        WatchOutcome::Failed(e) => {
            tracing::error!(file = %path.display(), "[ERROR] move failed: {}", e);
            OutputFormatter::error(&format!("Failed to move {}: {}", path.display(), e));
        }
    }
}

/// Watches the reconciler's root until Ctrl+C or the notifier shuts down.
///
/// Only the root itself is watched; category folders are not.
///
/// # Errors
///
/// Returns `WatchError` if the root is missing, the notifier cannot be
/// attached, or the interrupt handler cannot be installed.
pub fn watch(mut reconciler: Reconciler) -> Result<WatchStats, WatchError> {
    let root = reconciler.root().to_path_buf();
    if !root.is_dir() {
        return Err(WatchError::RootNotFound(root));
    }

    let (event_tx, event_rx) = crossbeam_channel::unbounded();
    let (error_tx, error_rx) = crossbeam_channel::unbounded();
    let mut watcher =
        notify::recommended_watcher(move |res: notify::Result<notify::Event>| match res {
            Ok(event) => {
                let _ = event_tx.send(event);
            }
            Err(e) => {
                let _ = error_tx.send(e);
            }
        })?;
    watcher.watch(&root, RecursiveMode::NonRecursive)?;

    let (interrupt_tx, interrupt_rx) = crossbeam_channel::bounded(1);
    ctrlc::set_handler(move || {
        let _ = interrupt_tx.try_send(());
    })?;

    tracing::info!(root = %root.display(), "watch mode started");
    OutputFormatter::info(&format!(
        "Watching {} for new files. Press Ctrl+C to stop.",
        root.display()
    ));

    let exit = run_event_loop(&mut reconciler, &event_rx, &error_rx, &interrupt_rx);
    drop(watcher);

    let stats = reconciler.stats();
    tracing::info!(
        ?exit,
        moved = stats.moved,
        skipped = stats.skipped,
        suppressed = stats.suppressed,
        failed = stats.failed,
        "watch mode stopped"
    );
    Ok(stats)
}
