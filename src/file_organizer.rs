//! Moving files into their category folders.
//!
//! [`FileOrganizer::move_file`] is the single move primitive used by both the
//! batch run and watch mode: it refuses to overwrite, creates the destination
//! directory if needed, then renames.

use crate::classifier::Classifier;
use crate::file_category::is_sentinel_category;
use crate::output::OutputFormatter;
use crate::scanner::{self, ScanError};
use indicatif::ProgressBar;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Errors that can occur while relocating a single file.
#[derive(Debug, thiserror::Error)]
pub enum OrganizeError {
    /// Something already exists at the destination.
    #[error("destination file already exists: {}", destination.display())]
    MoveConflict {
        /// File that was to be moved.
        file: PathBuf,
        /// Existing destination.
        destination: PathBuf,
    },
    /// Failed to create a category directory.
    #[error("failed to create directory {}: {source}", path.display())]
    DirectoryCreation {
        /// Directory that could not be created.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// The rename itself failed.
    #[error("failed to move {} to {}: {error}", file.display(), destination.display())]
    Move {
        /// File that was to be moved.
        file: PathBuf,
        /// Intended destination.
        destination: PathBuf,
        /// Underlying I/O error.
        #[source]
        error: io::Error,
    },
}

impl OrganizeError {
    /// The path this failure is attributed to.
    pub fn path(&self) -> &Path {
        match self {
            Self::MoveConflict { file, .. } | Self::Move { file, .. } => file,
            Self::DirectoryCreation { path, .. } => path,
        }
    }
}

/// Counters for one batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Files classified (excluded files are not counted).
    pub files_scanned: usize,
    /// Files moved, or that would be moved in dry-run mode.
    pub files_moved: usize,
    /// Category folders created, or that would be created in dry-run mode.
    pub folders_created: usize,
    /// Files left in place: unknown/no extension, or already in their folder.
    pub files_skipped: usize,
    /// Files whose move failed.
    pub files_failed: usize,
}

/// Options for a batch run.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrganizeOptions {
    /// Report what would happen without touching the filesystem.
    pub dry_run: bool,
    /// Show a progress bar instead of per-file lines.
    pub show_progress: bool,
}

/// Result of a batch run.
#[derive(Debug, Default)]
pub struct OrganizeReport {
    /// Aggregate counters.
    pub summary: Summary,
    /// Every failure, attributable to its path.
    pub failures: Vec<OrganizeError>,
}

/// Organizes files by moving them into category subdirectories.
pub struct FileOrganizer;

impl FileOrganizer {
    /// Moves `source` to `destination`.
    ///
    /// Fails with `MoveConflict` if the destination already exists; creates
    /// the destination's parent directory if it is missing.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use dirsort::file_organizer::FileOrganizer;
    /// use std::path::Path;
    ///
    /// let result = FileOrganizer::move_file(
    ///     Path::new("/path/to/base/image.png"),
    ///     Path::new("/path/to/base/Images/image.png"),
    /// );
    ///
    /// match result {
    ///     Ok(()) => println!("File organized successfully"),
    ///     Err(e) => eprintln!("Organization failed: {}", e),
    /// }
    /// ```
    pub fn move_file(source: &Path, destination: &Path) -> Result<(), OrganizeError> {
        if destination.symlink_metadata().is_ok() {
            return Err(OrganizeError::MoveConflict {
                file: source.to_path_buf(),
                destination: destination.to_path_buf(),
            });
        }

        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent).map_err(|e| OrganizeError::DirectoryCreation {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        fs::rename(source, destination).map_err(|e| OrganizeError::Move {
            file: source.to_path_buf(),
            destination: destination.to_path_buf(),
            error: e,
        })
    }

    /// Creates the category folder if absent. Returns true if it was (or, in
    /// dry-run mode, would be) created.
    pub fn ensure_category_dir(category_dir: &Path, dry_run: bool) -> Result<bool, OrganizeError> {
        if category_dir.is_dir() {
            return Ok(false);
        }

        if dry_run {
            tracing::info!(folder = %category_dir.display(), "[DRY-RUN] would create folder");
            return Ok(true);
        }

        fs::create_dir_all(category_dir).map_err(|e| OrganizeError::DirectoryCreation {
            path: category_dir.to_path_buf(),
            source: e,
        })?;
        tracing::info!(folder = %category_dir.display(), "[FOLDER] created folder");
        Ok(true)
    }

    /// Scans `root` and moves every relocatable file into `root/<category>/`.
    ///
    /// Categories are processed in name order. A failure on one file is
    /// recorded and the run continues.
    ///
    /// # Errors
    ///
    /// Only scan failures (such as a missing root) abort the run.
    pub fn organize(
        root: &Path,
        classifier: &Classifier,
        options: OrganizeOptions,
    ) -> Result<OrganizeReport, ScanError> {
        let files = scanner::scan(root, classifier)?;

        let mut report = OrganizeReport::default();
        report.summary.files_scanned = files.total_files();

        let progress = (options.show_progress && report.summary.files_scanned > 0)
            .then(|| OutputFormatter::create_progress_bar(report.summary.files_scanned as u64));

        for (category, paths) in files.iter() {
            if is_sentinel_category(category) {
                report.summary.files_skipped += paths.len();
                tracing::debug!(category, count = paths.len(), "skipping unrelocatable category");
                advance(&progress, paths.len());
                continue;
            }

            let category_dir = root.join(category);
            match Self::ensure_category_dir(&category_dir, options.dry_run) {
                Ok(true) => report.summary.folders_created += 1,
                Ok(false) => {}
                Err(e) => {
                    tracing::error!(folder = %category_dir.display(), "[ERROR] folder creation failed: {}", e);
                    OutputFormatter::error(&e.to_string());
                    report.summary.files_failed += paths.len();
                    report.failures.push(e);
                    advance(&progress, paths.len());
                    continue;
                }
            }

            for path in paths {
                Self::organize_one(path, &category_dir, options, progress.is_some(), &mut report);
                advance(&progress, 1);
            }
        }

        if let Some(bar) = progress {
            bar.finish_and_clear();
        }

        let s = report.summary;
        tracing::info!(
            scanned = s.files_scanned,
            moved = s.files_moved,
            folders_created = s.folders_created,
            skipped = s.files_skipped,
            failed = s.files_failed,
            "[SUMMARY] organization finished"
        );
        Ok(report)
    }

    fn organize_one(
        path: &Path,
        category_dir: &Path,
        options: OrganizeOptions,
        quiet: bool,
        report: &mut OrganizeReport,
    ) {
        if path.parent() == Some(category_dir) {
            report.summary.files_skipped += 1;
            tracing::debug!(file = %path.display(), "already in its category folder");
            return;
        }

        let Some(file_name) = path.file_name() else {
            report.summary.files_skipped += 1;
            return;
        };
        let destination = category_dir.join(file_name);

        if options.dry_run {
            if destination.symlink_metadata().is_ok() {
                let e = OrganizeError::MoveConflict {
                    file: path.to_path_buf(),
                    destination,
                };
                Self::record_failure(e, quiet, report);
                return;
            }
            tracing::info!(source = %path.display(), destination = %destination.display(), "[DRY-RUN] would move");
            if !quiet {
                OutputFormatter::dry_run_notice(&format!(
                    "Would move: {} -> {}",
                    path.display(),
                    destination.display()
                ));
            }
            report.summary.files_moved += 1;
            return;
        }

        match Self::move_file(path, &destination) {
            Ok(()) => {
                tracing::info!(source = %path.display(), destination = %destination.display(), "[MOVE] moved");
                if !quiet {
                    OutputFormatter::success(&format!(
                        "Moved: {} -> {}",
                        path.display(),
                        destination.display()
                    ));
                }
                report.summary.files_moved += 1;
            }
            Err(e) => Self::record_failure(e, quiet, report),
        }
    }

    fn record_failure(e: OrganizeError, quiet: bool, report: &mut OrganizeReport) {
        tracing::error!(file = %e.path().display(), "[ERROR] move failed: {}", e);
        if !quiet {
            OutputFormatter::error(&format!("Failed to move {}: {}", e.path().display(), e));
        }
        report.summary.files_failed += 1;
        report.failures.push(e);
    }
}

fn advance(progress: &Option<ProgressBar>, n: usize) {
    if let Some(bar) = progress {
        bar.inc(n as u64);
    }
}
