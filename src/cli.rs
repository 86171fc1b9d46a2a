//! Orchestration of a single run.
//!
//! Builds the rule set (defaults, configuration document, `--map`
//! overrides, ignore file), organizes the root once, prints the summary and
//! then optionally hands over to watch mode.

use crate::classifier::Classifier;
use crate::config;
use crate::file_category::{ExtensionMapping, MappingSource};
use crate::file_organizer::{FileOrganizer, OrganizeOptions, Summary};
use crate::ignore::IgnoreMatcher;
use crate::output::OutputFormatter;
use crate::watcher::{self, Reconciler};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Everything a run needs, already parsed from the command line.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Directory to organize.
    pub root: PathBuf,
    /// Report actions without moving anything.
    pub dry_run: bool,
    /// Show a progress bar during the batch pass.
    pub show_progress: bool,
    /// Keep watching the root after the batch pass.
    pub watch: bool,
    /// `.ext=Category` overrides.
    pub overrides: Vec<String>,
    /// Explicit configuration document.
    pub config: Option<PathBuf>,
    /// Explicit ignore file.
    pub ignore_file: Option<PathBuf>,
}

/// Builds the extension mapping from all layers.
///
/// A configuration document that cannot be read or parsed is reported and
/// the defaults are kept. An invalid `--map` override aborts.
pub fn build_mapping(options: &RunOptions) -> Result<ExtensionMapping> {
    let mut mapping = ExtensionMapping::default();

    if let Some(path) = config::locate(options.config.as_deref()) {
        match mapping.merge_from_file(&path) {
            Ok(report) => {
                for (ext, e) in &report.rejected {
                    OutputFormatter::warning(&format!("Skipping config mapping {}: {}", ext, e));
                }
            }
            Err(e) => {
                tracing::warn!("could not load config file: {}", e);
                OutputFormatter::warning(&format!("Could not load config file: {}", e));
                OutputFormatter::warning("Continuing with default mappings...");
            }
        }
    }

    mapping
        .apply_overrides(&options.overrides)
        .context("invalid --map override")?;

    Ok(mapping)
}

/// Builds the ignore matcher for `root`. A missing or unreadable ignore file
/// leaves the matcher empty.
pub fn build_ignore(root: &Path, explicit: Option<&Path>) -> IgnoreMatcher {
    let mut ignore = IgnoreMatcher::new(root);
    if let Some(path) = config::locate_ignore_file(explicit, root) {
        if let Err(e) = ignore.load_file(&path) {
            tracing::warn!("could not load ignore file: {}", e);
            OutputFormatter::warning(&format!("Could not load ignore file: {}", e));
            OutputFormatter::warning("Continuing without ignore rules...");
        }
    }
    ignore
}

/// Runs a batch pass over `options.root`, then watch mode if requested.
///
/// # Errors
///
/// Fails if the root cannot be resolved, an override is invalid, the scan
/// cannot start, or watch mode cannot start. Per-file failures are reported
/// and counted, not returned.
///
/// # Examples
///
/// ```no_run
/// use dirsort::cli::{RunOptions, run};
///
/// let options = RunOptions {
///     root: "/home/user/Downloads".into(),
///     dry_run: true,
///     ..RunOptions::default()
/// };
/// let summary = run(&options).expect("run failed");
/// println!("{} files would be moved", summary.files_moved);
/// ```
pub fn run(options: &RunOptions) -> Result<Summary> {
    let root = options
        .root
        .canonicalize()
        .with_context(|| format!("cannot access {}", options.root.display()))?;

    OutputFormatter::info(&format!("Organizing path: {}", root.display()));
    if options.dry_run {
        OutputFormatter::dry_run_notice("Simulating file organization, nothing will be moved");
    }

    let mapping = build_mapping(options)?;
    let ignore = build_ignore(&root, options.ignore_file.as_deref());

    let has_custom_rules = mapping.count_by_source(MappingSource::ConfigFile) > 0
        || mapping.count_by_source(MappingSource::CliOverride) > 0
        || !ignore.is_empty();
    if has_custom_rules {
        OutputFormatter::rules_summary(&mapping, &ignore.patterns());
    }

    let classifier = Classifier::new(mapping, ignore);
    let report = FileOrganizer::organize(
        &root,
        &classifier,
        OrganizeOptions {
            dry_run: options.dry_run,
            show_progress: options.show_progress,
        },
    )
    .with_context(|| format!("failed to organize {}", root.display()))?;

    OutputFormatter::organize_summary(&report.summary, options.dry_run);

    if options.watch {
        let reconciler = Reconciler::new(&root, classifier, options.dry_run);
        let stats = watcher::watch(reconciler).context("watch mode failed")?;
        OutputFormatter::info(&format!(
            "Watch stopped: {} moved, {} skipped, {} failed",
            stats.moved, stats.skipped, stats.failed
        ));
    }

    Ok(report.summary)
}
