//! Reading and writing plan and config files
//!
//! Plans are handed from `treesync plan` to whatever executes them, so a
//! reader must never observe a half-written file. Writes go to a locked
//! sibling file that is renamed over the destination.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::{Error, NormalizedPath, Result};

/// Replace the contents of `path` in one rename, creating parents.
pub fn write_atomic(path: &NormalizedPath, content: &[u8]) -> Result<()> {
    let destination = path.to_native();
    if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let staging = staging_path(&destination);
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(&staging)
        .map_err(|e| Error::io(&staging, e))?;

    if let Err(e) = fill_locked(&file, &staging, &destination, content) {
        let _ = fs::remove_file(&staging);
        return Err(e);
    }
    fs::rename(&staging, &destination).map_err(|e| Error::io(&destination, e))
}

/// Contents of a text file. A missing file is [`Error::NotFound`].
pub fn read_text(path: &NormalizedPath) -> Result<String> {
    let native = path.to_native();
    fs::read_to_string(&native).map_err(|e| Error::from_io(&native, e))
}

fn fill_locked(file: &File, staging: &Path, destination: &Path, content: &[u8]) -> Result<()> {
    let lock_failed = || Error::LockFailed {
        path: destination.to_path_buf(),
    };
    file.lock_exclusive().map_err(|_| lock_failed())?;

    let mut writer = file;
    writer.write_all(content).map_err(|e| Error::io(staging, e))?;
    file.sync_all().map_err(|e| Error::io(staging, e))?;

    file.unlock().map_err(|_| lock_failed())
}

/// Hidden sibling unique to this process, on the same filesystem as the
/// destination so the rename cannot cross devices.
fn staging_path(destination: &Path) -> PathBuf {
    let name = destination
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    destination.with_file_name(format!(".{}.{}.tmp", name, std::process::id()))
}
