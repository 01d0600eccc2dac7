//! Destination rules for organized files.
//!
//! Everything here is pure: a [`FileEntry`] plus the root folder map to the
//! subfolder a file belongs in. All destinations live under
//! `<root>/Organized_Files`.

use chrono::{DateTime, Local};
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Name of the folder every organized file ends up under.
pub const ORGANIZED_DIR: &str = "Organized_Files";

/// Subfolder for files without an extension.
pub const NO_EXTENSION_DIR: &str = "no_extension";

/// How files are grouped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    /// `Organized_Files/<ext>`
    ByExtension,
    /// `Organized_Files/<YYYY>/<MM>-<Mon>`
    ByTime,
}

/// Metadata of a file, read fresh for each organizing pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// File name exactly as stored on disk.
    pub file_name: OsString,
    /// Display form of `file_name`, lossy for non-UTF-8 names.
    pub name: String,
    /// Extension without the leading dot, case preserved.
    pub extension: Option<String>,
    pub modified: DateTime<Local>,
}

impl FileEntry {
    pub fn new(file_name: impl Into<OsString>, modified: DateTime<Local>) -> Self {
        let file_name = file_name.into();
        let extension = Path::new(&file_name)
            .extension()
            .map(|ext| ext.to_string_lossy().into_owned())
            .filter(|ext| !ext.is_empty());

        Self {
            name: file_name.to_string_lossy().into_owned(),
            file_name,
            extension,
            modified,
        }
    }

    /// Reads the name and modification time of the file at `path`.
    ///
    /// Symlinks are followed, so a link reports its target's timestamp.
    pub fn from_path(path: &Path) -> io::Result<Self> {
        let file_name = path
            .file_name()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;
        let modified = fs::metadata(path)?.modified()?;

        Ok(Self::new(file_name, DateTime::<Local>::from(modified)))
    }
}

/// Returns `<root>/Organized_Files`.
pub fn organized_root(root: &Path) -> PathBuf {
    root.join(ORGANIZED_DIR)
}

/// Computes the folder (not including the file name) `entry` belongs in.
pub fn destination_folder(entry: &FileEntry, root: &Path, mode: SortMode) -> PathBuf {
    let base = organized_root(root);
    match mode {
        SortMode::ByExtension => base.join(extension_folder(entry)),
        SortMode::ByTime => {
            let (year, month) = time_folders(&entry.modified);
            base.join(year).join(month)
        }
    }
}

fn extension_folder(entry: &FileEntry) -> &str {
    entry.extension.as_deref().unwrap_or(NO_EXTENSION_DIR)
}

/// `("2024", "08-Aug")` for a timestamp in August 2024.
fn time_folders(modified: &DateTime<Local>) -> (String, String) {
    (
        modified.format("%Y").to_string(),
        modified.format("%m-%b").to_string(),
    )
}
