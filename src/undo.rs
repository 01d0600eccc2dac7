/// Undo functionality for reverting organizing passes.
///
/// The undo engine replays the move journal backwards, putting every file it
/// can find back where it came from. It is best effort rather than a
/// transaction: each record is restored, skipped or failed on its own, and
/// the journal is cleared once all records have been visited.
use crate::fsops;
use crate::journal::{JournalBackend, JournalError, JournalState, MoveJournal, MoveRecord};
use std::path::Path;
use thiserror::Error;
use tracing::{error, info, warn};

/// Errors that stop an undo before any file is touched.
#[derive(Debug, Error)]
pub enum UndoError {
    /// The journal exists but cannot be parsed. It is left as is.
    #[error("Undo log corrupted, cannot undo: {reason}")]
    Corrupted { reason: String },
    #[error(transparent)]
    Journal(#[from] JournalError),
}

pub type UndoResult<T> = Result<T, UndoError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoStatus {
    /// There was no journal, nothing was touched.
    NothingToUndo,
    /// Every record was visited and the journal cleared.
    Completed,
}

/// Represents the result of an undo operation.
#[derive(Debug)]
pub struct UndoReport {
    pub status: UndoStatus,
    /// Records restored, in the order they were undone.
    pub restored: Vec<MoveRecord>,
    /// Records whose organized file no longer exists.
    pub skipped: Vec<(MoveRecord, String)>,
    /// Records that could not be moved back.
    pub failed: Vec<(MoveRecord, String)>,
    /// Set when the journal could not be cleared after the replay.
    pub clear_error: Option<String>,
}

impl UndoReport {
    fn new(status: UndoStatus) -> Self {
        Self {
            status,
            restored: Vec::new(),
            skipped: Vec::new(),
            failed: Vec::new(),
            clear_error: None,
        }
    }

    pub fn total_processed(&self) -> usize {
        self.restored.len() + self.failed.len() + self.skipped.len()
    }

    /// Returns true if every record was restored.
    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty() && self.skipped.is_empty() && self.clear_error.is_none()
    }
}

/// Replays the move journal in reverse.
pub struct UndoEngine<B: JournalBackend> {
    journal: MoveJournal<B>,
}

impl<B: JournalBackend> UndoEngine<B> {
    pub fn new(journal: MoveJournal<B>) -> Self {
        Self { journal }
    }

    pub fn journal(&self) -> &MoveJournal<B> {
        &self.journal
    }

    /// Undoes every journaled move, most recent first.
    ///
    /// # Errors
    ///
    /// Returns [`UndoError::Corrupted`] without moving anything when the
    /// journal cannot be parsed, and [`UndoError::Journal`] when it cannot be
    /// read at all. Per-file problems are reported in the [`UndoReport`].
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use dirsort::journal::{FileBackend, MoveJournal};
    /// use dirsort::undo::UndoEngine;
    ///
    /// let engine = UndoEngine::new(MoveJournal::new(FileBackend::default()));
    /// match engine.undo() {
    ///     Ok(report) => println!("Restored {} files", report.restored.len()),
    ///     Err(e) => eprintln!("{}", e),
    /// }
    /// ```
    pub fn undo(&self) -> UndoResult<UndoReport> {
        let records = match self.journal.load_all()? {
            JournalState::Missing => {
                info!("No undo log found, nothing to undo");
                return Ok(UndoReport::new(UndoStatus::NothingToUndo));
            }
            JournalState::Corrupted { reason } => {
                error!("Undo log corrupted, cannot undo: {}", reason);
                return Err(UndoError::Corrupted { reason });
            }
            JournalState::Loaded(records) => records,
        };

        let mut report = UndoReport::new(UndoStatus::Completed);
        for record in records.into_iter().rev() {
            if !fsops::entry_exists(&record.destination) {
                warn!(
                    "File {} missing, skipping restore",
                    record.destination.display()
                );
                report
                    .skipped
                    .push((record, "File not found at expected location".to_string()));
                continue;
            }

            match fsops::move_file(&record.destination, &record.source) {
                Ok(()) => {
                    info!(
                        "Restored {} to {}",
                        file_name(&record.destination),
                        record.source.display()
                    );
                    report.restored.push(record);
                }
                Err(e) => {
                    error!(
                        "Failed to restore {}: {}",
                        file_name(&record.destination),
                        e
                    );
                    report
                        .failed
                        .push((record, format!("Failed to restore file: {}", e)));
                }
            }
        }

        if let Err(e) = self.journal.clear() {
            error!("Could not clear undo log: {}", e);
            report.clear_error = Some(e.to_string());
        } else {
            info!("Undo completed, log cleared");
        }

        Ok(report)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::MemoryBackend;
    use std::fs;
    use tempfile::TempDir;

    fn engine_with(records: &[MoveRecord]) -> UndoEngine<MemoryBackend> {
        let journal = MoveJournal::new(MemoryBackend::new());
        for record in records {
            journal.append(record.clone()).unwrap();
        }
        UndoEngine::new(journal)
    }

    /// Moves `name` from `root` into `root/Organized_Files/<folder>`.
    fn organize(root: &Path, name: &str, folder: &str) -> MoveRecord {
        let source = root.join(name);
        let target = root.join("Organized_Files").join(folder);
        fs::create_dir_all(&target).unwrap();
        let destination = target.join(name);
        fs::rename(&source, &destination).unwrap();
        MoveRecord::new(source, destination)
    }

    #[test]
    fn test_undo_no_history() {
        let engine = UndoEngine::new(MoveJournal::new(MemoryBackend::new()));

        let report = engine.undo().unwrap();
        assert_eq!(report.status, UndoStatus::NothingToUndo);
        assert_eq!(report.total_processed(), 0);
        assert_eq!(engine.journal().backend().contents(), None);
    }

    #[test]
    fn test_undo_restores_and_clears() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        fs::write(root.join("a.txt"), "a").unwrap();
        fs::write(root.join("b.png"), "b").unwrap();
        let first = organize(root, "a.txt", "txt");
        let second = organize(root, "b.png", "png");

        let engine = engine_with(&[first.clone(), second.clone()]);
        let report = engine.undo().unwrap();

        assert_eq!(report.status, UndoStatus::Completed);
        assert!(report.is_complete_success());
        assert_eq!(report.restored, vec![second, first]);
        assert_eq!(fs::read_to_string(root.join("a.txt")).unwrap(), "a");
        assert_eq!(fs::read_to_string(root.join("b.png")).unwrap(), "b");
        assert_eq!(engine.journal().backend().contents().as_deref(), Some("[]"));
    }

    #[test]
    fn test_undo_with_missing_file() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        let ghost = MoveRecord::new(
            root.join("nonexistent.txt"),
            root.join("Organized_Files/txt/nonexistent.txt"),
        );

        let engine = engine_with(&[ghost]);
        let report = engine.undo().unwrap();

        assert_eq!(report.restored.len(), 0);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(engine.journal().backend().contents().as_deref(), Some("[]"));
    }

    #[test]
    fn test_undo_corrupted_journal_is_untouched() {
        let engine = UndoEngine::new(MoveJournal::new(MemoryBackend::with_contents("[{")));

        let result = engine.undo();
        assert!(matches!(result, Err(UndoError::Corrupted { .. })));
        assert_eq!(engine.journal().backend().contents().as_deref(), Some("[{"));
    }

    #[test]
    fn test_undo_does_not_overwrite_new_file_at_source() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        fs::write(root.join("a.txt"), "original").unwrap();
        let record = organize(root, "a.txt", "txt");
        fs::write(root.join("a.txt"), "newer").unwrap();

        let engine = engine_with(&[record]);
        let report = engine.undo().unwrap();

        assert_eq!(report.failed.len(), 1);
        assert_eq!(fs::read_to_string(root.join("a.txt")).unwrap(), "newer");
        assert!(root.join("Organized_Files/txt/a.txt").exists());
        // The journal is cleared even after a failed restore.
        assert_eq!(engine.journal().backend().contents().as_deref(), Some("[]"));
    }

    #[test]
    fn test_undo_empty_journal() {
        let engine = UndoEngine::new(MoveJournal::new(MemoryBackend::with_contents("[]")));

        let report = engine.undo().unwrap();
        assert_eq!(report.status, UndoStatus::Completed);
        assert_eq!(report.total_processed(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_undo_restores_dangling_symlink() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root = temp_dir.path();
        let target = root.join("target.txt");
        fs::write(&target, "t").unwrap();
        std::os::unix::fs::symlink(&target, root.join("link.txt")).unwrap();
        let record = organize(root, "link.txt", "txt");
        fs::remove_file(&target).unwrap();

        let engine = engine_with(&[record]);
        let report = engine.undo().unwrap();

        assert_eq!(report.restored.len(), 1);
        assert!(report.skipped.is_empty());
        let restored = fs::symlink_metadata(root.join("link.txt")).unwrap();
        assert!(restored.file_type().is_symlink());
    }
}
