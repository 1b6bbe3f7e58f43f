//! Backup orchestration: naming, the manual path, and the automatic path.

use crate::config::{Settings, SlotPolicy};
use crate::error::BackupError;
use crate::{Result, file_util, retention, rotation};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

/// Timestamp embedded in manual backup names. Fixed-width and zero-padded,
/// so lexicographic order on the names is chronological order.
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Marker that separates automatic slot files from manual backups.
const AUTO_TOKEN: &str = "_auto";

/// Runs backups against one settings snapshot.
///
/// The engine never mutates its settings; reloading the configuration means
/// constructing a new engine.
#[derive(Debug, Clone)]
pub struct BackupEngine {
    settings: Settings,
}

impl BackupEngine {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn target_file(&self) -> &Path {
        &self.settings.target_file
    }

    fn stem(&self) -> String {
        self.settings
            .target_file
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    fn suffix(&self) -> String {
        match self.settings.target_file.extension() {
            Some(ext) => format!(".{}", ext.to_string_lossy()),
            None => String::new(),
        }
    }

    /// Destination path for a manual backup taken at `now`.
    pub fn manual_backup_path(&self, now: DateTime<Local>) -> PathBuf {
        let name = format!(
            "{}_{}{}",
            self.stem(),
            now.format(TIMESTAMP_FORMAT),
            self.suffix()
        );
        self.settings.backup_dir.join(name)
    }

    /// The fixed automatic slot paths under the active policy. The second
    /// slot is present only for the two-slot policy.
    pub fn auto_slot_paths(&self) -> (PathBuf, Option<PathBuf>) {
        let stem = self.stem();
        let suffix = self.suffix();
        match self.settings.slot_policy {
            SlotPolicy::Rotate => (
                self.settings
                    .backup_dir
                    .join(format!("{stem}{AUTO_TOKEN}_0{suffix}")),
                Some(
                    self.settings
                        .backup_dir
                        .join(format!("{stem}{AUTO_TOKEN}_1{suffix}")),
                ),
            ),
            SlotPolicy::Single => (
                self.settings
                    .backup_dir
                    .join(format!("{stem}{AUTO_TOKEN}{suffix}")),
                None,
            ),
        }
    }

    /// True for names following the manual backup convention: the target's
    /// stem plus a separator, the target's extension, and no automatic-slot
    /// token. The retention sweep uses this predicate, so automatic slots
    /// are never counted or deleted by it.
    pub fn is_manual_backup_name(&self, name: &str) -> bool {
        name.starts_with(&format!("{}_", self.stem()))
            && name.ends_with(&self.suffix())
            && !name.contains(AUTO_TOKEN)
    }

    /// True for names matching the automatic slot files of the active
    /// policy.
    pub fn is_auto_backup_name(&self, name: &str) -> bool {
        let (slot0, slot1) = self.auto_slot_paths();
        let matches_slot = |slot: &PathBuf| {
            slot.file_name()
                .map(|slot_name| slot_name.to_string_lossy() == name)
                .unwrap_or(false)
        };
        matches_slot(&slot0) || slot1.as_ref().map(matches_slot).unwrap_or(false)
    }

    /// Manual path: copy the target to a timestamped name, then sweep old
    /// manual backups. Returns the path of the new backup.
    ///
    /// A failed retention sweep is logged but does not fail the backup;
    /// the copy already succeeded.
    pub fn run_manual_backup(&self) -> Result<PathBuf> {
        let target = &self.settings.target_file;
        if !target.exists() {
            return Err(BackupError::SourceNotFound(target.clone()));
        }

        let dest = self.manual_backup_path(Local::now());
        file_util::copy_file(target, &dest)?;
        log::info!("manual backup written: {}", dest.display());

        match retention::cleanup(&self.settings.backup_dir, self.settings.max_backups, |name| {
            self.is_manual_backup_name(name)
        }) {
            Ok(deleted) if !deleted.is_empty() => {
                log::info!("retention sweep removed {} old backup(s)", deleted.len());
            }
            Ok(_) => {}
            Err(err) => log::warn!("retention sweep failed: {err}"),
        }
        Ok(dest)
    }

    /// Automatic path: cycle the slots (two-slot policy only), then copy
    /// the target into the primary slot. Returns `Ok(None)` when automatic
    /// backup is disabled in the settings.
    ///
    /// The retention sweep is never run here: the slot policy itself bounds
    /// the number of automatic backups.
    pub fn run_auto_backup(&self) -> Result<Option<PathBuf>> {
        if !self.settings.auto_backup {
            log::debug!("automatic backup disabled, skipping");
            return Ok(None);
        }

        let target = &self.settings.target_file;
        if !target.exists() {
            return Err(BackupError::SourceNotFound(target.clone()));
        }

        let (slot0, slot1) = self.auto_slot_paths();
        if let Some(slot1) = &slot1 {
            rotation::rotate(&slot0, slot1)?;
        }
        file_util::copy_file(target, &slot0)?;
        log::info!("automatic backup written: {}", slot0.display());
        Ok(Some(slot0))
    }
}
