//! Command-line interface module for dirsort.
//!
//! This module handles:
//! - Argument parsing and the interactive menu fallback
//! - Wiring settings into the organizer and the undo engine
//! - Reporting outcomes on the terminal

use crate::classifier::SortMode;
use crate::config::Settings;
use crate::journal::{FileBackend, MoveJournal};
use crate::organizer::Organizer;
use crate::output::OutputFormatter;
use crate::undo::UndoEngine;
use anyhow::Context;
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

/// Sort a folder's files into subfolders, or undo a previous sort.
#[derive(Debug, Parser)]
#[command(name = "dirsort", version, about)]
pub struct Args {
    /// Folder to clean. Prompted for when omitted.
    pub dir: Option<PathBuf>,

    /// e = sort by extension, t = sort by time, u = undo the last operations.
    /// Prompted for when omitted.
    #[arg(short, long)]
    pub mode: Option<String>,

    /// Show what would be moved without touching anything.
    #[arg(long)]
    pub dry_run: bool,

    /// Path to a TOML configuration file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

/// Represents a CLI command to execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Organize files in a directory.
    Organize {
        mode: SortMode,
        /// If true, simulate the operation without making changes.
        dry_run: bool,
    },
    /// Undo every journaled move.
    Undo,
}

impl Command {
    /// Parses a menu selector (`e`, `t` or `u`, any case).
    ///
    /// ```
    /// use dirsort::{Command, SortMode};
    ///
    /// assert_eq!(
    ///     Command::from_selector("E", false),
    ///     Some(Command::Organize { mode: SortMode::ByExtension, dry_run: false })
    /// );
    /// assert_eq!(Command::from_selector("x", false), None);
    /// ```
    pub fn from_selector(selector: &str, dry_run: bool) -> Option<Self> {
        match selector.trim().to_lowercase().as_str() {
            "e" => Some(Command::Organize {
                mode: SortMode::ByExtension,
                dry_run,
            }),
            "t" => Some(Command::Organize {
                mode: SortMode::ByTime,
                dry_run,
            }),
            "u" => Some(Command::Undo),
            _ => None,
        }
    }
}

pub const MENU: &str = "Choose sorting method:\n  e ---> Sort by extension\n  t ---> Sort by time\n  u ---> Undo last operation\nYour choice: ";

/// Prints `prompt` and reads one trimmed line from `input`.
pub fn prompt_line(prompt: &str, input: &mut impl BufRead) -> io::Result<String> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Runs `command` on `dir_path` with settings resolved from `config_path`.
///
/// # Examples
///
/// ```no_run
/// use dirsort::cli::{run_cli_with_config, Command};
/// use dirsort::SortMode;
/// use std::path::Path;
///
/// let command = Command::Organize { mode: SortMode::ByExtension, dry_run: false };
/// if let Err(e) = run_cli_with_config(command, Path::new("/path/to/directory"), None) {
///     eprintln!("Error: {}", e);
/// }
/// ```
pub fn run_cli_with_config(
    command: Command,
    dir_path: &Path,
    config_path: Option<&Path>,
) -> anyhow::Result<()> {
    let settings = Settings::load(config_path).context("Error loading configuration")?;
    run_cli(command, dir_path, &settings)
}

/// Runs `command` on `dir_path`, which the caller has checked exists.
pub fn run_cli(command: Command, dir_path: &Path, settings: &Settings) -> anyhow::Result<()> {
    match command {
        Command::Organize { mode, dry_run } => {
            let filters = settings
                .filters
                .compile()
                .context("Error compiling filters")?;
            let organizer = Organizer::new(journal(settings))
                .with_filters(filters)
                .protect(&settings.journal.path)
                .protect(&settings.audit.path);

            if dry_run {
                organize_dry_run(&organizer, dir_path, mode)
            } else {
                organize_directory(&organizer, dir_path, mode)
            }
        }
        Command::Undo => undo_moves(settings),
    }
}

fn journal(settings: &Settings) -> MoveJournal<FileBackend> {
    MoveJournal::new(FileBackend::new(&settings.journal.path))
}

fn mode_label(mode: SortMode) -> &'static str {
    match mode {
        SortMode::ByExtension => "extension",
        SortMode::ByTime => "Date & Time",
    }
}

fn organize_directory(
    organizer: &Organizer<FileBackend>,
    base_path: &Path,
    mode: SortMode,
) -> anyhow::Result<()> {
    OutputFormatter::info(&format!("You chose to sort by {}", mode_label(mode)));

    let total = organizer
        .candidate_files(base_path)
        .with_context(|| format!("Error reading directory {}", base_path.display()))?
        .len();
    let pb = OutputFormatter::create_progress_bar(total as u64);

    let report = organizer
        .run_with_observer(base_path, mode, |_| pb.inc(1))
        .with_context(|| format!("Error reading directory {}", base_path.display()))?;
    pb.finish_and_clear();

    OutputFormatter::run_report(&report);
    Ok(())
}

fn organize_dry_run(
    organizer: &Organizer<FileBackend>,
    base_path: &Path,
    mode: SortMode,
) -> anyhow::Result<()> {
    OutputFormatter::dry_run_notice(&format!(
        "Sorting {} by {}",
        base_path.display(),
        mode_label(mode)
    ));

    let plan = organizer
        .plan(base_path, mode)
        .with_context(|| format!("Error reading directory {}", base_path.display()))?;

    OutputFormatter::plan_report(&plan);
    if !plan.is_empty() {
        OutputFormatter::dry_run_notice("No files were modified.");
    }
    Ok(())
}

fn undo_moves(settings: &Settings) -> anyhow::Result<()> {
    let report = UndoEngine::new(journal(settings)).undo()?;
    OutputFormatter::undo_report(&report);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_selectors() {
        assert_eq!(
            Command::from_selector("t", true),
            Some(Command::Organize {
                mode: SortMode::ByTime,
                dry_run: true
            })
        );
        assert_eq!(Command::from_selector(" U\n", false), Some(Command::Undo));
        assert_eq!(Command::from_selector("", false), None);
        assert_eq!(Command::from_selector("ex", false), None);
    }

    #[test]
    fn test_prompt_line_trims() {
        let mut input = Cursor::new("  /tmp/downloads  \nrest");
        assert_eq!(prompt_line("> ", &mut input).unwrap(), "/tmp/downloads");
    }

    #[test]
    fn test_args_parse() {
        let args = Args::parse_from(["dirsort", "/tmp/x", "--mode", "e", "--dry-run"]);
        assert_eq!(args.dir, Some(PathBuf::from("/tmp/x")));
        assert_eq!(args.mode.as_deref(), Some("e"));
        assert!(args.dry_run);
        assert!(args.config.is_none());
    }
}
