//! Count-based retention sweep for manual backups.

use crate::Result;
use crate::error::BackupError;
use std::fs;
use std::path::{Path, PathBuf};

/// Deletes the oldest manual backups in `dir` until at most `max` remain.
///
/// `is_manual` decides which file names count as manual backups; anything
/// it rejects (the automatic slots in particular) is never counted or
/// deleted, no matter how many files accumulate. Names sort
/// lexicographically, which matches chronological order for the
/// fixed-width timestamp format the engine embeds in them.
///
/// The sweep is best-effort: a file that cannot be deleted is logged and
/// skipped, and the remaining candidates are still processed. Returns the
/// paths that were actually deleted. `max == 0` disables retention
/// entirely.
pub fn cleanup<F>(dir: &Path, max: u32, is_manual: F) -> Result<Vec<PathBuf>>
where
    F: Fn(&str) -> bool,
{
    if max == 0 {
        return Ok(Vec::new());
    }

    let entries = fs::read_dir(dir).map_err(|source| BackupError::ListDirFailed {
        dir: dir.to_path_buf(),
        source,
    })?;

    let mut names: Vec<String> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| BackupError::ListDirFailed {
            dir: dir.to_path_buf(),
            source,
        })?;
        if !entry.path().is_file() {
            continue;
        }
        let file_name = entry.file_name();
        if let Some(name) = file_name.to_str()
            && is_manual(name)
        {
            names.push(name.to_string());
        }
    }

    if names.len() <= max as usize {
        return Ok(Vec::new());
    }

    names.sort();
    let excess = names.len() - max as usize;
    let mut deleted = Vec::with_capacity(excess);
    for name in &names[..excess] {
        let path = dir.join(name);
        match fs::remove_file(&path) {
            Ok(()) => {
                log::info!("deleted old backup: {name}");
                deleted.push(path);
            }
            Err(source) => {
                log::warn!("{}", BackupError::DeleteFailed { path, source });
            }
        }
    }
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn is_manual(name: &str) -> bool {
        name.starts_with("Save00_") && name.ends_with(".sav") && !name.contains("_auto")
    }

    fn seed(dir: &Path, names: &[&str]) {
        for name in names {
            fs::write(dir.join(name), b"x").unwrap();
        }
    }

    #[test]
    fn removes_oldest_excess() {
        let dir = tempdir().unwrap();
        seed(
            dir.path(),
            &[
                "Save00_20250101_120000.sav",
                "Save00_20250102_120000.sav",
                "Save00_20250103_120000.sav",
                "Save00_20250104_120000.sav",
                "Save00_20250105_120000.sav",
            ],
        );

        let deleted = cleanup(dir.path(), 3, is_manual).unwrap();
        assert_eq!(deleted.len(), 2);
        assert!(!dir.path().join("Save00_20250101_120000.sav").exists());
        assert!(!dir.path().join("Save00_20250102_120000.sav").exists());
        assert!(dir.path().join("Save00_20250103_120000.sav").exists());
        assert!(dir.path().join("Save00_20250105_120000.sav").exists());
    }

    #[test]
    fn noop_when_under_limit() {
        let dir = tempdir().unwrap();
        seed(
            dir.path(),
            &["Save00_20250101_120000.sav", "Save00_20250102_120000.sav"],
        );

        let deleted = cleanup(dir.path(), 3, is_manual).unwrap();
        assert!(deleted.is_empty());
    }

    #[test]
    fn zero_max_disables_sweep() {
        let dir = tempdir().unwrap();
        seed(
            dir.path(),
            &[
                "Save00_20250101_120000.sav",
                "Save00_20250102_120000.sav",
                "Save00_20250103_120000.sav",
            ],
        );

        let deleted = cleanup(dir.path(), 0, is_manual).unwrap();
        assert!(deleted.is_empty());
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 3);
    }

    #[test]
    fn automatic_slots_are_never_swept() {
        let dir = tempdir().unwrap();
        seed(
            dir.path(),
            &[
                "Save00_auto_0.sav",
                "Save00_auto_1.sav",
                "Save00_20250101_120000.sav",
                "Save00_20250102_120000.sav",
                "Save00_20250103_120000.sav",
            ],
        );

        let deleted = cleanup(dir.path(), 1, is_manual).unwrap();
        assert_eq!(deleted.len(), 2);
        assert!(dir.path().join("Save00_auto_0.sav").exists());
        assert!(dir.path().join("Save00_auto_1.sav").exists());
        assert!(dir.path().join("Save00_20250103_120000.sav").exists());
    }

    #[test]
    fn unrelated_files_are_ignored() {
        let dir = tempdir().unwrap();
        seed(
            dir.path(),
            &[
                "Save00_20250101_120000.sav",
                "Save00_20250102_120000.sav",
                "notes.txt",
                "Other_20250101_120000.sav",
            ],
        );

        let deleted = cleanup(dir.path(), 1, is_manual).unwrap();
        assert_eq!(deleted.len(), 1);
        assert!(dir.path().join("notes.txt").exists());
        assert!(dir.path().join("Other_20250101_120000.sav").exists());
    }

    #[test]
    fn missing_directory_is_list_error() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("no_such_dir");
        let err = cleanup(&missing, 3, is_manual).unwrap_err();
        assert!(matches!(err, BackupError::ListDirFailed { .. }));
    }
}
