/// Organizing a folder given relative to the working directory.
///
/// Lives in its own test binary because it changes the process-wide
/// working directory.
use dirsort::journal::{FileBackend, MoveJournal};
use dirsort::{Organizer, SortMode, UndoEngine};
use std::env;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

#[test]
fn test_relative_root_can_be_undone_from_elsewhere() {
    let root = TempDir::new().expect("Failed to create temp directory");
    let state = TempDir::new().expect("Failed to create temp directory");
    let journal_path = state.path().join("undo_log.json");
    fs::write(root.path().join("a.txt"), "alpha").unwrap();
    fs::write(root.path().join("b.pdf"), "beta").unwrap();

    let original_dir = env::current_dir().expect("Failed to read working directory");
    env::set_current_dir(root.path()).expect("Failed to enter root");

    let report = Organizer::new(MoveJournal::new(FileBackend::new(&journal_path)))
        .run(Path::new("."), SortMode::ByExtension)
        .expect("Organize failed");
    assert_eq!(report.moved(), 2);

    env::set_current_dir(state.path()).expect("Failed to leave root");

    let state_records = MoveJournal::new(FileBackend::new(&journal_path))
        .load_all()
        .expect("Failed to load journal");
    assert!(
        state_records
            .records()
            .iter()
            .all(|r| r.source.is_absolute() && r.destination.is_absolute())
    );

    let undo = UndoEngine::new(MoveJournal::new(FileBackend::new(&journal_path)))
        .undo()
        .expect("Undo failed");
    env::set_current_dir(original_dir).expect("Failed to restore working directory");

    assert_eq!(undo.restored.len(), 2);
    assert!(undo.is_complete_success());
    assert_eq!(fs::read_to_string(root.path().join("a.txt")).unwrap(), "alpha");
    assert_eq!(fs::read_to_string(root.path().join("b.pdf")).unwrap(), "beta");
    assert!(!root.path().join("Organized_Files/txt/a.txt").exists());
}
