//! Byte-for-byte file copy.

use crate::Result;
use crate::error::BackupError;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::Path;

/// Copies `src` to `dest`, creating the directory containing `dest` if it
/// does not exist yet.
///
/// The copy streams the source as it exists at call time. It does not
/// coordinate with a concurrent writer of `src`, so a copy taken while the
/// owning application is mid-write can be torn; the next trigger overwrites
/// it with a fresh copy. A destination left half-written by an I/O error is
/// likewise not cleaned up.
pub fn copy_file(src: &Path, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(|source| BackupError::DirectoryCreateFailed {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let source_file = match File::open(src) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(BackupError::SourceNotFound(src.to_path_buf()));
        }
        Err(source) => {
            return Err(BackupError::CopyFailed {
                src: src.to_path_buf(),
                dest: dest.to_path_buf(),
                source,
            });
        }
    };

    let copy_failed = |source| BackupError::CopyFailed {
        src: src.to_path_buf(),
        dest: dest.to_path_buf(),
        source,
    };

    let mut reader = BufReader::new(source_file);
    let mut writer = BufWriter::new(File::create(dest).map_err(copy_failed)?);
    io::copy(&mut reader, &mut writer).map_err(copy_failed)?;
    writer.flush().map_err(copy_failed)?;
    Ok(())
}
