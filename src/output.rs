//! Output formatting and styling module.
//!
//! All interactive CLI output goes through [`OutputFormatter`]: plain styled
//! messages, the progress bar, and the rendering of organize, dry-run and
//! undo reports. The audit log is written separately via `tracing`.

use crate::organizer::{FileOutcome, PlanReport, RunReport};
use crate::undo::{UndoReport, UndoStatus};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::BTreeMap;

/// Manages all CLI output with consistent styling.
///
/// - Success messages (green with ✓)
/// - Error messages (red with ✗)
/// - Warning messages (yellow with ⚠)
/// - Info messages (cyan)
/// - Per-file outcomes and the per-folder summary table
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to display
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dirsort::output::OutputFormatter;
    /// OutputFormatter::success("Folder Found!");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark, on stderr.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to display
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    pub fn plain(message: &str) {
        println!("{}", message);
    }

    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Creates a progress bar for `total` file operations.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dirsort::output::OutputFormatter;
    /// let pb = OutputFormatter::create_progress_bar(100);
    /// pb.inc(1);
    /// pb.finish_and_clear();
    /// ```
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        pb.set_style(style);
        pb
    }

    /// Prints one line for a file handled by an organizing pass.
    ///
    /// Moves go to stdout in green, unrecorded moves as warnings, and
    /// failures to stderr.
    ///
    /// # Arguments
    ///
    /// * `outcome` - What happened to the file
    pub fn file_outcome(outcome: &FileOutcome) {
        let line = describe_outcome(outcome);
        match outcome {
            FileOutcome::Moved(_) => Self::success(&line),
            FileOutcome::Unrecorded { .. } => Self::warning(&line),
            FileOutcome::Skipped { .. } => Self::plain(&line),
            FileOutcome::Failed { .. } => Self::error(&line),
        }
    }

    /// Prints every outcome of `report`, its journal warnings and the
    /// per-folder summary.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dirsort::output::OutputFormatter;
    /// use dirsort::{MemoryBackend, MoveJournal, Organizer, SortMode};
    /// use std::path::Path;
    ///
    /// let organizer = Organizer::new(MoveJournal::new(MemoryBackend::new()));
    /// let report = organizer.run(Path::new("/home/user/Downloads"), SortMode::ByExtension)?;
    /// OutputFormatter::run_report(&report);
    /// # Ok::<(), std::io::Error>(())
    /// ```
    pub fn run_report(report: &RunReport) {
        for outcome in &report.outcomes {
            Self::file_outcome(outcome);
        }
        for warning in &report.journal_warnings {
            Self::warning(warning);
        }

        if report.outcomes.is_empty() {
            Self::plain("No files found to organize.");
            return;
        }

        Self::summary_table(&report.moved_per_folder(), report.moved());

        if report.failed() > 0 {
            Self::warning(&format!(
                "{} could not be organized. See the audit log for details.",
                count_files(report.failed())
            ));
        }
    }

    /// Prints the moves a dry run found, and the files it could not read.
    ///
    /// # Arguments
    ///
    /// * `plan` - Result of [`Organizer::plan`](crate::Organizer::plan)
    pub fn plan_report(plan: &PlanReport) {
        if plan.is_empty() {
            Self::plain("No files found to organize.");
            return;
        }

        for planned in &plan.moves {
            Self::plain(&format!(
                " - {} → {}",
                planned.source.display(),
                planned.destination.display()
            ));
        }
        for (path, reason) in &plan.unreadable {
            Self::warning(&format!("Cannot read {}: {}", path.display(), reason));
        }

        Self::summary_table(&plan.moves_per_folder(), plan.moves.len());
        if !plan.unreadable.is_empty() {
            Self::warning(&format!(
                "{} would fail to move.",
                count_files(plan.unreadable.len())
            ));
        }
    }

    /// Prints the result of an undo pass.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dirsort::output::OutputFormatter;
    /// use dirsort::{FileBackend, MoveJournal, UndoEngine};
    ///
    /// let engine = UndoEngine::new(MoveJournal::new(FileBackend::default()));
    /// if let Ok(report) = engine.undo() {
    ///     OutputFormatter::undo_report(&report);
    /// }
    /// ```
    pub fn undo_report(report: &UndoReport) {
        if report.status == UndoStatus::NothingToUndo {
            Self::info("No undo log found. Nothing to undo.");
            return;
        }

        for record in &report.restored {
            Self::success(&format!(
                "Restored {} → {}",
                record.destination.display(),
                record.source.display()
            ));
        }
        for (record, _) in &report.skipped {
            Self::warning(&format!(
                "File {} missing. Skipping.",
                record.destination.display()
            ));
        }
        for (record, reason) in &report.failed {
            Self::error(&format!("{}: {}", record.destination.display(), reason));
        }

        match &report.clear_error {
            None => Self::info("Undo completed. Log cleared."),
            Some(e) => Self::warning(&format!(
                "Undo completed, but the log could not be cleared: {}",
                e
            )),
        }
    }

    /// Prints a table of files moved per destination folder.
    ///
    /// # Arguments
    ///
    /// * `folder_counts` - Folder names, relative to the root, mapped to file counts
    /// * `total_files` - Total number of files moved
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dirsort::output::OutputFormatter;
    /// use std::collections::BTreeMap;
    ///
    /// let mut counts = BTreeMap::new();
    /// counts.insert("Organized_Files/pdf".to_string(), 15);
    /// counts.insert("Organized_Files/png".to_string(), 8);
    /// OutputFormatter::summary_table(&counts, 23);
    /// ```
    pub fn summary_table(folder_counts: &BTreeMap<String, usize>, total_files: usize) {
        Self::header("SUMMARY");

        let width = folder_counts
            .keys()
            .map(|name| name.len())
            .max()
            .unwrap_or(0)
            .max(6); // "Folder"

        println!("{:<width$} | {}", "Folder".bold(), "Files".bold(), width = width);
        println!("{}", "-".repeat(width + 10));

        for (folder, count) in folder_counts {
            println!("{:<width$} | {}", folder, count_files(*count).green(), width = width);
        }

        println!("{}", "-".repeat(width + 10));
        println!(
            "{:<width$} | {}",
            "Total".bold(),
            count_files(total_files).green().bold(),
            width = width
        );
    }

    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }
}

/// Unstyled text of the line printed for `outcome`.
fn describe_outcome(outcome: &FileOutcome) -> String {
    match outcome {
        FileOutcome::Moved(record) => format!(
            "{} → {}",
            record.source.display(),
            record.destination.display()
        ),
        FileOutcome::Unrecorded { record, reason } => format!(
            "{} moved to {} but cannot be undone: {}",
            record.source.display(),
            record.destination.display(),
            reason
        ),
        FileOutcome::Skipped { path, reason } => {
            format!("  skipped {}: {}", path.display(), reason)
        }
        FileOutcome::Failed {
            source,
            destination,
            reason,
        } => format!(
            "Failed to move {} → {}: {}",
            source.display(),
            destination.display(),
            reason
        ),
    }
}

/// `"1 file"`, `"3 files"`.
fn count_files(count: usize) -> String {
    format!("{} {}", count, if count == 1 { "file" } else { "files" })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::MoveRecord;
    use std::path::PathBuf;

    #[test]
    fn test_describe_moved_and_failed() {
        let moved = FileOutcome::Moved(MoveRecord::new("/d/a.txt", "/d/Organized_Files/txt/a.txt"));
        assert_eq!(
            describe_outcome(&moved),
            "/d/a.txt → /d/Organized_Files/txt/a.txt"
        );

        let failed = FileOutcome::Failed {
            source: PathBuf::from("/d/b.txt"),
            destination: PathBuf::from("/d/Organized_Files/txt/b.txt"),
            reason: "already exists".to_string(),
        };
        assert_eq!(
            describe_outcome(&failed),
            "Failed to move /d/b.txt → /d/Organized_Files/txt/b.txt: already exists"
        );
    }

    #[test]
    fn test_describe_unrecorded_mentions_undo() {
        let outcome = FileOutcome::Unrecorded {
            record: MoveRecord::new("/d/a.txt", "/d/Organized_Files/txt/a.txt"),
            reason: "disk full".to_string(),
        };
        assert!(describe_outcome(&outcome).contains("cannot be undone: disk full"));
    }

    #[test]
    fn test_count_files() {
        assert_eq!(count_files(0), "0 files");
        assert_eq!(count_files(1), "1 file");
        assert_eq!(count_files(23), "23 files");
    }
}
