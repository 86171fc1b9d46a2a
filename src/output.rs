//! Output formatting and styling module.
//!
//! Provides a centralized interface for all user-facing output: colored status
//! lines, the batch progress bar, the run summary and the active rule set.
//! Diagnostics go through `tracing`; this module is only for the operator.

use crate::file_category::{ExtensionMapping, MappingSource};
use crate::file_organizer::Summary;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

const PROGRESS_TEMPLATE: &str = "{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}";

/// Manages all CLI output with consistent styling and formatting.
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dirsort::output::OutputFormatter;
    /// OutputFormatter::success("Moved: a.pdf -> Documents/a.pdf");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dirsort::output::OutputFormatter;
    /// OutputFormatter::info("Organizing directory: /home/user/Downloads");
    /// ```
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a section header.
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Prints a dry-run notice message.
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Creates a progress bar for `total` files.
    ///
    /// Falls back to the default bar style if the template is rejected.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dirsort::output::OutputFormatter;
    /// let pb = OutputFormatter::create_progress_bar(100);
    /// pb.inc(1);
    /// pb.finish_with_message("Completed!");
    /// ```
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        match ProgressStyle::default_bar().template(PROGRESS_TEMPLATE) {
            Ok(style) => pb.set_style(style.progress_chars("█▓░")),
            Err(e) => tracing::debug!("progress bar template rejected: {}", e),
        }
        pb
    }

    /// Renders the end-of-run summary lines.
    pub fn summary_lines(summary: &Summary, dry_run: bool) -> Vec<String> {
        let (moved, created) = if dry_run {
            ("Files that would be moved", "Folders that would be created")
        } else {
            ("Files moved", "Folders created")
        };
        vec![
            format!("Files scanned: {}", summary.files_scanned),
            format!("{}: {}", moved, summary.files_moved),
            format!("{}: {}", created, summary.folders_created),
            format!("Files skipped: {}", summary.files_skipped),
            format!("Files failed: {}", summary.files_failed),
        ]
    }

    /// Prints the end-of-run summary block.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dirsort::file_organizer::Summary;
    /// use dirsort::output::OutputFormatter;
    ///
    /// let summary = Summary { files_scanned: 4, files_moved: 2, ..Summary::default() };
    /// OutputFormatter::organize_summary(&summary, false);
    /// ```
    pub fn organize_summary(summary: &Summary, dry_run: bool) {
        Self::header(if dry_run { "DRY-RUN SUMMARY" } else { "SUMMARY" });
        println!("{}", "-".repeat(36));
        for line in Self::summary_lines(summary, dry_run) {
            println!("{}", line);
        }
        println!("{}", "-".repeat(36));

        if summary.files_failed > 0 {
            Self::warning(&format!(
                "{} file(s) could not be organized. See the errors above.",
                summary.files_failed
            ));
        }
    }

    /// Prints how many rules each source contributed, and the ignore patterns.
    pub fn rules_summary(mapping: &ExtensionMapping, ignore_patterns: &[&str]) {
        Self::header("RULES");
        for source in [
            MappingSource::Default,
            MappingSource::ConfigFile,
            MappingSource::CliOverride,
        ] {
            let count = mapping.count_by_source(source);
            if count > 0 {
                println!("{:<14} {}", source.to_string(), count.to_string().green());
            }
        }
        if ignore_patterns.is_empty() {
            println!("{:<14} {}", "ignore", "none".dimmed());
        } else {
            println!("{:<14} {}", "ignore", ignore_patterns.join(", "));
        }
    }
}
