/// Organizing pass over a single directory.
///
/// Each file directly inside the root folder is moved into the
/// subfolder chosen by the classifier, and every successful move is appended
/// to the move journal. Failures are isolated per file: they end up in the
/// [`RunReport`] and the audit log, and the pass carries on.
use crate::classifier::{self, FileEntry, SortMode};
use crate::config::CompiledFilters;
use crate::fsops;
use crate::journal::{AppendOutcome, JournalBackend, MoveJournal, MoveRecord};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// What happened to one file during a pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Moved and recorded in the journal.
    Moved(MoveRecord),
    /// Moved, but the journal could not be written, so undo won't see it.
    Unrecorded { record: MoveRecord, reason: String },
    /// Left in place on purpose.
    Skipped { path: PathBuf, reason: String },
    /// The move was attempted and did not happen.
    Failed {
        source: PathBuf,
        destination: PathBuf,
        reason: String,
    },
}

/// A move the organizer would perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedMove {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Result of a dry run.
#[derive(Debug, Default)]
pub struct PlanReport {
    /// Absolute root the plan was computed for.
    pub root: PathBuf,
    pub moves: Vec<PlannedMove>,
    /// Files that a real pass would fail on, with the reason.
    pub unreadable: Vec<(PathBuf, String)>,
}

impl PlanReport {
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty() && self.unreadable.is_empty()
    }

    /// Number of planned moves into each destination folder, relative to
    /// the root.
    pub fn moves_per_folder(&self) -> BTreeMap<String, usize> {
        count_per_folder(&self.root, self.moves.iter().map(|m| m.destination.as_path()))
    }
}

/// Summary of one organizing pass.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Absolute root the pass ran on.
    pub root: PathBuf,
    pub outcomes: Vec<FileOutcome>,
    /// Journal problems that did not stop the pass, such as a corrupted
    /// history being replaced.
    pub journal_warnings: Vec<String>,
}

impl RunReport {
    pub fn moved(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, FileOutcome::Moved(_) | FileOutcome::Unrecorded { .. }))
            .count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, FileOutcome::Skipped { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o, FileOutcome::Failed { .. }))
            .count()
    }

    /// Number of files moved into each destination folder, relative to the
    /// root.
    pub fn moved_per_folder(&self) -> BTreeMap<String, usize> {
        let destinations = self.outcomes.iter().filter_map(|outcome| match outcome {
            FileOutcome::Moved(record) | FileOutcome::Unrecorded { record, .. } => {
                Some(record.destination.as_path())
            }
            _ => None,
        });
        count_per_folder(&self.root, destinations)
    }
}

fn count_per_folder<'a>(
    root: &Path,
    destinations: impl Iterator<Item = &'a Path>,
) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for destination in destinations {
        let folder = destination
            .parent()
            .map(|p| p.strip_prefix(root).unwrap_or(p).display().to_string())
            .unwrap_or_default();
        *counts.entry(folder).or_insert(0) += 1;
    }
    counts
}

/// Moves files into organized subfolders and journals each move.
pub struct Organizer<B: JournalBackend> {
    journal: MoveJournal<B>,
    filters: CompiledFilters,
    /// Files the organizer must never move, like the journal itself.
    protected: Vec<PathBuf>,
}

impl<B: JournalBackend> Organizer<B> {
    pub fn new(journal: MoveJournal<B>) -> Self {
        Self {
            journal,
            filters: CompiledFilters::default(),
            protected: Vec::new(),
        }
    }

    pub fn with_filters(mut self, filters: CompiledFilters) -> Self {
        self.filters = filters;
        self
    }

    /// Never move the file at `path`, wherever it shows up.
    pub fn protect(mut self, path: impl AsRef<Path>) -> Self {
        self.protected.push(normalize(path.as_ref()));
        self
    }

    pub fn journal(&self) -> &MoveJournal<B> {
        &self.journal
    }

    /// Organizes the files directly inside `root`.
    pub fn run(&self, root: &Path, mode: SortMode) -> io::Result<RunReport> {
        self.run_with_observer(root, mode, |_| {})
    }

    /// Like [`Organizer::run`], calling `observer` after each file.
    ///
    /// `root` is resolved to an absolute path first, so journaled paths stay
    /// valid when undo runs from another working directory.
    ///
    /// # Errors
    ///
    /// Only fails when `root` itself cannot be resolved or listed. Problems
    /// with individual files are reported in the returned [`RunReport`].
    pub fn run_with_observer(
        &self,
        root: &Path,
        mode: SortMode,
        mut observer: impl FnMut(&FileOutcome),
    ) -> io::Result<RunReport> {
        let root = fs::canonicalize(root)?;
        let files = self.candidate_files(&root)?;
        let mut report = RunReport {
            root,
            ..Default::default()
        };

        for path in files {
            let outcome =
                self.organize_file(&report.root, &path, mode, &mut report.journal_warnings);
            observer(&outcome);
            report.outcomes.push(outcome);
        }

        Ok(report)
    }

    /// Computes the moves a pass would make, without touching anything.
    ///
    /// Files whose metadata cannot be read end up in
    /// [`PlanReport::unreadable`].
    pub fn plan(&self, root: &Path, mode: SortMode) -> io::Result<PlanReport> {
        let mut report = PlanReport {
            root: fs::canonicalize(root)?,
            ..Default::default()
        };

        for path in self.candidate_files(&report.root)? {
            if self.skip_reason(&path).is_none() {
                plan_file(&mut report, path, mode);
            }
        }
        Ok(report)
    }

    /// Files directly inside `root`, in name order.
    ///
    /// Symlinks to files count as files and are moved as links. Directories
    /// and links to directories are left out.
    pub fn candidate_files(&self, root: &Path) -> io::Result<Vec<PathBuf>> {
        let mut files: Vec<PathBuf> = fs::read_dir(root)?
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();
        files.sort();
        Ok(files)
    }

    fn skip_reason(&self, path: &Path) -> Option<String> {
        if self.protected.contains(&normalize(path)) {
            return Some("Used by dirsort".to_string());
        }
        if !self.filters.should_include(path) {
            return Some("Excluded by filter rules".to_string());
        }
        None
    }

    fn organize_file(
        &self,
        root: &Path,
        path: &Path,
        mode: SortMode,
        journal_warnings: &mut Vec<String>,
    ) -> FileOutcome {
        if let Some(reason) = self.skip_reason(path) {
            warn!("Skipped {}: {}", path.display(), reason);
            return FileOutcome::Skipped {
                path: path.to_path_buf(),
                reason,
            };
        }

        let entry = match FileEntry::from_path(path) {
            Ok(entry) => entry,
            Err(e) => {
                error!("Unable to read metadata of {}: {}", path.display(), e);
                return FileOutcome::Failed {
                    source: path.to_path_buf(),
                    destination: classifier::organized_root(root),
                    reason: format!("Could not read metadata: {}", e),
                };
            }
        };

        let folder = classifier::destination_folder(&entry, root, mode);
        let destination = folder.join(&entry.file_name);
        let record = MoveRecord::new(path, &destination);

        // Only moves the journal can hold are made.
        if let Err(e) = record.ensure_serializable() {
            error!("Not moving {}: {}", path.display(), e);
            return FileOutcome::Failed {
                source: path.to_path_buf(),
                destination,
                reason: format!("Cannot be journaled: {}", e),
            };
        }

        match fsops::ensure_dir(&folder) {
            Ok(true) => info!("Folder created: {}", folder.display()),
            Ok(false) => {}
            Err(e) => {
                error!("Failed to create folder {}: {}", folder.display(), e);
                return FileOutcome::Failed {
                    source: path.to_path_buf(),
                    destination,
                    reason: format!("Could not create folder: {}", e),
                };
            }
        }

        if let Err(e) = fsops::move_file(path, &destination) {
            error!(
                "Failed to move {} to {}: {}",
                entry.name,
                destination.display(),
                e
            );
            return FileOutcome::Failed {
                source: path.to_path_buf(),
                destination,
                reason: e.to_string(),
            };
        }

        info!("File {} moved to {}", entry.name, destination.display());

        match self.journal.append(record.clone()) {
            Ok(AppendOutcome::Appended) => FileOutcome::Moved(record),
            Ok(AppendOutcome::ReplacedCorrupted { reason }) => {
                journal_warnings.push(format!(
                    "Journal was corrupted and has been reset, earlier moves cannot be undone: {}",
                    reason
                ));
                FileOutcome::Moved(record)
            }
            Err(e) => {
                warn!("Move of {} was not journaled: {}", entry.name, e);
                FileOutcome::Unrecorded {
                    record,
                    reason: e.to_string(),
                }
            }
        }
    }
}

fn plan_file(report: &mut PlanReport, path: PathBuf, mode: SortMode) {
    match FileEntry::from_path(&path) {
        Ok(entry) => {
            let destination =
                classifier::destination_folder(&entry, &report.root, mode).join(&entry.file_name);
            report.moves.push(PlannedMove {
                source: path,
                destination,
            });
        }
        Err(e) => {
            warn!("Unable to read metadata of {}: {}", path.display(), e);
            report.unreadable.push((path, e.to_string()));
        }
    }
}

/// Absolute form of `path`, also for files that do not exist yet.
fn normalize(path: &Path) -> PathBuf {
    if let Ok(canonical) = fs::canonicalize(path) {
        return canonical;
    }
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    match (fs::canonicalize(parent), path.file_name()) {
        (Ok(parent), Some(name)) => parent.join(name),
        _ => path.to_path_buf(),
    }
}
