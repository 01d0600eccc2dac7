//! dirsort - sort a folder's files by extension or modification date
//!
//! Files directly inside a folder are moved under `Organized_Files/`, either
//! into one subfolder per extension or into `<year>/<month>` subfolders.
//! Every move is recorded in a JSON journal so the whole history can be
//! undone later, most recent move first.

pub mod audit;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod fsops;
pub mod journal;
pub mod organizer;
pub mod output;
pub mod undo;

pub use classifier::{FileEntry, SortMode};
pub use config::{CompiledFilters, ConfigError, Settings};
pub use journal::{FileBackend, JournalBackend, MemoryBackend, MoveJournal, MoveRecord};
pub use organizer::{FileOutcome, Organizer, PlanReport, PlannedMove, RunReport};
pub use undo::{UndoEngine, UndoError, UndoReport, UndoStatus};

pub use cli::{Command, run_cli, run_cli_with_config};
