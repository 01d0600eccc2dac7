//! Filesystem primitives shared by the organizer and the undo engine.

use filetime::FileTime;
use std::fs;
use std::io;
use std::path::Path;

/// Creates `dir` and any missing parents. Existing directories are fine.
///
/// Returns `true` when the directory did not exist before.
pub fn ensure_dir(dir: &Path) -> io::Result<bool> {
    if dir.is_dir() {
        return Ok(false);
    }
    fs::create_dir_all(dir)?;
    Ok(true)
}

/// True when something, even a dangling symlink, is present at `path`.
pub fn entry_exists(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok()
}

/// Moves a file from `from` to `to`, refusing to replace an existing file.
///
/// A plain rename is tried first. Across filesystems the file is copied with
/// its timestamps and the original removed.
pub fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    if entry_exists(to) {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} already exists", to.display()),
        ));
    }

    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => copy_then_remove(from, to),
        Err(e) => Err(e),
    }
}

/// Copies `from` to `to`, keeping access and modification times, then
/// removes `from`. Symlinks are recreated rather than followed.
pub(crate) fn copy_then_remove(from: &Path, to: &Path) -> io::Result<()> {
    let metadata = fs::symlink_metadata(from)?;

    if metadata.file_type().is_symlink() {
        copy_symlink(from, to)?;
    } else {
        fs::copy(from, to)?;
        let atime = FileTime::from_last_access_time(&metadata);
        let mtime = FileTime::from_last_modification_time(&metadata);
        if let Err(e) = filetime::set_file_times(to, atime, mtime) {
            let _ = fs::remove_file(to);
            return Err(e);
        }
    }

    if let Err(remove_err) = fs::remove_file(from) {
        // Leave exactly one copy behind.
        let _ = fs::remove_file(to);
        return Err(remove_err);
    }
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(from: &Path, to: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(fs::read_link(from)?, to)
}

#[cfg(not(unix))]
fn copy_symlink(from: &Path, to: &Path) -> io::Result<()> {
    fs::copy(from, to).map(|_| ())
}
