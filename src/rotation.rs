//! Slot cycling for automatic backups.

use crate::Result;
use crate::error::BackupError;
use std::fs;
use std::path::Path;

/// Cycles the two fixed automatic-backup slots so `slot0` is free for a
/// fresh copy.
///
/// The transition is total over the four existence states:
/// - both exist: `slot1` is deleted, then `slot0` is renamed to `slot1`
/// - only `slot0` exists: `slot0` is renamed to `slot1`
/// - only `slot1` exists, or neither: no-op
///
/// The previous `slot0` is renamed rather than copied: both slots live on
/// the same volume, so a second copy of the bytes would be redundant.
///
/// On failure the slots are left exactly as they are. Because the table is
/// total, the next trigger picks up from whatever state remains.
pub fn rotate(slot0: &Path, slot1: &Path) -> Result<()> {
    let exists0 = slot0.exists();
    let exists1 = slot1.exists();

    if exists0 && exists1 {
        fs::remove_file(slot1).map_err(|source| BackupError::Rotation {
            op: "remove",
            path: slot1.to_path_buf(),
            source,
        })?;
    }
    if exists0 {
        fs::rename(slot0, slot1).map_err(|source| BackupError::Rotation {
            op: "rename",
            path: slot0.to_path_buf(),
            source,
        })?;
        log::info!(
            "rotated auto backup: {} -> {}",
            slot0.display(),
            slot1.display()
        );
    }
    Ok(())
}
