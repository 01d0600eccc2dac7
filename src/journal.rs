/// Persistent journal of completed file moves.
///
/// Every successful move performed by the organizer is appended here as a
/// `{source, destination}` pair, which is what the undo engine replays.
/// The store is a single pretty-printed JSON array that is rewritten in full
/// on each mutation, so the backing file is the only source of truth.
///
/// There is no locking: only one process is expected to touch the journal
/// at a time.
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default journal file name, resolved against the working directory.
pub const DEFAULT_JOURNAL_FILE: &str = "undo_log.json";

/// One completed relocation of a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    /// Where the file lived before it was organized.
    pub source: PathBuf,
    /// Where the organizer put it.
    pub destination: PathBuf,
}

impl MoveRecord {
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }

    /// Fails when the record cannot be written to the journal, for example
    /// because a path is not valid UTF-8.
    pub fn ensure_serializable(&self) -> JournalResult<()> {
        serde_json::to_string(self)?;
        Ok(())
    }
}

/// Errors raised while reading or writing the journal store.
#[derive(Debug, Error)]
pub enum JournalError {
    #[error("failed to read journal: {0}")]
    Read(#[source] io::Error),
    #[error("failed to write journal: {0}")]
    Write(#[source] io::Error),
    #[error("failed to serialize journal: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type JournalResult<T> = Result<T, JournalError>;

/// What the store currently holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JournalState {
    /// No store exists yet.
    Missing,
    /// The store parsed into these records, oldest first.
    Loaded(Vec<MoveRecord>),
    /// The store exists but is not a valid record list.
    Corrupted { reason: String },
}

impl JournalState {
    /// Records held by the store, empty unless it loaded cleanly.
    pub fn records(&self) -> &[MoveRecord] {
        match self {
            JournalState::Loaded(records) => records,
            _ => &[],
        }
    }
}

/// Result of a successful append.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppendOutcome {
    Appended,
    /// The previous store was unparsable and has been replaced by a history
    /// containing only the new record.
    ReplacedCorrupted { reason: String },
}

/// Raw storage for the serialized journal.
pub trait JournalBackend {
    /// Returns the stored text, or `None` when nothing has been stored.
    fn read(&self) -> io::Result<Option<String>>;

    /// Replaces the stored text.
    fn write(&self, contents: &str) -> io::Result<()>;
}

/// Journal stored in a file on disk.
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileBackend {
    fn default() -> Self {
        Self::new(DEFAULT_JOURNAL_FILE)
    }
}

impl JournalBackend for FileBackend {
    fn read(&self) -> io::Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&self, contents: &str) -> io::Result<()> {
        fs::write(&self.path, contents)
    }
}

/// In-memory journal storage, mainly for tests.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    contents: RefCell<Option<String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend that already holds `contents`, valid or not.
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: RefCell::new(Some(contents.into())),
        }
    }

    /// Current raw contents.
    pub fn contents(&self) -> Option<String> {
        self.contents.borrow().clone()
    }
}

impl JournalBackend for MemoryBackend {
    fn read(&self) -> io::Result<Option<String>> {
        Ok(self.contents.borrow().clone())
    }

    fn write(&self, contents: &str) -> io::Result<()> {
        *self.contents.borrow_mut() = Some(contents.to_string());
        Ok(())
    }
}

/// Append-only move history on top of a [`JournalBackend`].
///
/// No records are cached; each call reads and rewrites the backend.
#[derive(Debug, Default)]
pub struct MoveJournal<B: JournalBackend> {
    backend: B,
}

impl<B: JournalBackend> MoveJournal<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Loads every record in insertion order.
    pub fn load_all(&self) -> JournalResult<JournalState> {
        let Some(contents) = self.backend.read().map_err(JournalError::Read)? else {
            return Ok(JournalState::Missing);
        };

        match serde_json::from_str::<Vec<MoveRecord>>(&contents) {
            Ok(records) => Ok(JournalState::Loaded(records)),
            Err(e) => Ok(JournalState::Corrupted {
                reason: e.to_string(),
            }),
        }
    }

    /// Appends `record` and persists the full history.
    ///
    /// An unparsable store is treated as an empty history; the caller learns
    /// about the discarded data through [`AppendOutcome::ReplacedCorrupted`].
    pub fn append(&self, record: MoveRecord) -> JournalResult<AppendOutcome> {
        let (mut records, outcome) = match self.load_all()? {
            JournalState::Missing => (Vec::new(), AppendOutcome::Appended),
            JournalState::Loaded(records) => (records, AppendOutcome::Appended),
            JournalState::Corrupted { reason } => {
                tracing::warn!("Journal was unreadable and has been reset: {}", reason);
                (Vec::new(), AppendOutcome::ReplacedCorrupted { reason })
            }
        };

        records.push(record);
        self.persist(&records)?;
        Ok(outcome)
    }

    /// Overwrites the store with an empty history.
    pub fn clear(&self) -> JournalResult<()> {
        self.persist(&[])
    }

    fn persist(&self, records: &[MoveRecord]) -> JournalResult<()> {
        let json = serde_json::to_string_pretty(records)?;
        self.backend.write(&json).map_err(JournalError::Write)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn record(name: &str) -> MoveRecord {
        MoveRecord::new(
            format!("/root/{}", name),
            format!("/root/Organized_Files/txt/{}", name),
        )
    }

    #[test]
    fn test_load_missing_store() {
        let journal = MoveJournal::new(MemoryBackend::new());
        assert_eq!(journal.load_all().unwrap(), JournalState::Missing);
    }

    #[test]
    fn test_append_preserves_insertion_order() {
        let journal = MoveJournal::new(MemoryBackend::new());
        journal.append(record("a.txt")).unwrap();
        journal.append(record("b.txt")).unwrap();

        let state = journal.load_all().unwrap();
        assert_eq!(state.records(), &[record("a.txt"), record("b.txt")]);
    }

    #[test]
    fn test_append_over_corrupted_store_reports_loss() {
        let journal = MoveJournal::new(MemoryBackend::with_contents("{not json"));

        let outcome = journal.append(record("a.txt")).unwrap();
        assert!(matches!(outcome, AppendOutcome::ReplacedCorrupted { .. }));

        let state = journal.load_all().unwrap();
        assert_eq!(state.records(), &[record("a.txt")]);
    }

    #[test]
    fn test_load_reports_corruption() {
        let journal = MoveJournal::new(MemoryBackend::with_contents("[{\"source\": 1}]"));
        assert!(matches!(
            journal.load_all().unwrap(),
            JournalState::Corrupted { .. }
        ));
    }

    #[test]
    fn test_clear_writes_empty_array() {
        let journal = MoveJournal::new(MemoryBackend::new());
        journal.append(record("a.txt")).unwrap();
        journal.clear().unwrap();

        assert_eq!(journal.backend().contents().as_deref(), Some("[]"));
        assert_eq!(journal.load_all().unwrap(), JournalState::Loaded(vec![]));
    }

    #[test]
    fn test_file_backend_writes_pretty_json() {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let path = temp_dir.path().join(DEFAULT_JOURNAL_FILE);
        let journal = MoveJournal::new(FileBackend::new(&path));

        assert_eq!(journal.load_all().unwrap(), JournalState::Missing);
        journal.append(record("a.txt")).unwrap();

        let raw = fs::read_to_string(&path).expect("Failed to read journal");
        assert!(raw.contains("\n"));
        assert!(raw.contains("\"source\": \"/root/a.txt\""));
        assert!(raw.contains("\"destination\": \"/root/Organized_Files/txt/a.txt\""));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_non_utf8_record_is_not_serializable() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let source = Path::new("/root").join(OsStr::from_bytes(b"caf\xE9.txt"));
        let record = MoveRecord::new(&source, "/root/Organized_Files/txt/x.txt");

        assert!(matches!(
            record.ensure_serializable(),
            Err(JournalError::Serialize(_))
        ));
        assert!(self::record("a.txt").ensure_serializable().is_ok());
    }
}
