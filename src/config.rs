//! Persistent settings for savewatch.
//!
//! Settings live in a single TOML file under the platform configuration
//! directory. The core modules receive a loaded [`Settings`] snapshot and
//! never write it back; only the CLI layer creates or resets the file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::{fs, process};

use crate::sysexits;

/// Default settings file name.
pub const CONFIG_NAME: &str = "settings.toml";
/// Package name.
const PKG_NAME: &str = env!("CARGO_PKG_NAME");

/// Which automatic-backup strategy is active.
///
/// Both strategies bound the number of automatic backups on their own;
/// neither is subject to the retention sweep.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SlotPolicy {
    /// Two fixed slots: each backup demotes the previous one to the older
    /// slot before writing a fresh copy.
    #[default]
    Rotate,
    /// One fixed slot, overwritten in place on every trigger.
    Single,
}

/// The savewatch configuration.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Settings {
    /// The save file to watch and back up.
    pub target_file: PathBuf,
    /// Directory that receives the backup copies.
    pub backup_dir: PathBuf,
    /// Whether file changes trigger automatic backups.
    pub auto_backup: bool,
    /// Maximum number of manual backups to keep. 0 disables the sweep.
    pub max_backups: u32,
    /// Automatic-backup strategy.
    #[serde(default)]
    pub slot_policy: SlotPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            target_file: PathBuf::new(),
            backup_dir: PathBuf::new(),
            auto_backup: true,
            max_backups: 10,
            slot_policy: SlotPolicy::Rotate,
        }
    }
}

impl Settings {
    /// Loads settings from `path`, expanding `~` and `$HOME` in the
    /// configured paths.
    pub fn load(path: &Path) -> Result<Self> {
        let toml_str = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings file {}", path.display()))?;
        let mut settings: Settings = toml::from_str(&toml_str)
            .with_context(|| format!("failed to parse settings file {}", path.display()))?;
        settings.target_file = expand_path(&settings.target_file);
        settings.backup_dir = expand_path(&settings.backup_dir);
        Ok(settings)
    }

    /// Writes the settings to `path` in pretty-printed TOML, creating the
    /// parent directory if needed.
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let file = fs::File::create(path)
            .with_context(|| format!("failed to create settings file {}", path.display()))?;
        let mut writer = io::BufWriter::new(file);
        let toml_str = toml::to_string_pretty(self)?;
        writer.write_all(toml_str.as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    /// True once both paths have been filled in by the user.
    pub fn is_configured(&self) -> bool {
        !self.target_file.as_os_str().is_empty() && !self.backup_dir.as_os_str().is_empty()
    }
}

/// Returns the absolute path to the settings file.
pub fn config_file() -> PathBuf {
    config_dir().join(CONFIG_NAME)
}

/// Returns the configuration directory for the application, platform-specific.
#[cfg(not(target_os = "macos"))]
fn config_dir() -> PathBuf {
    let config_dir = dirs::config_dir().unwrap_or_else(|| {
        eprintln!("Couldn't get the config directory!!!");
        process::exit(sysexits::EX_UNAVAILABLE);
    });
    config_dir.join(PKG_NAME)
}

/// Returns the configuration directory for the application, platform-specific.
#[cfg(target_os = "macos")]
fn config_dir() -> PathBuf {
    let home_dir = dirs::home_dir().unwrap_or_else(|| {
        eprintln!("Couldn't get the home directory!!!");
        process::exit(sysexits::EX_UNAVAILABLE);
    });
    home_dir.join(".config").join(PKG_NAME)
}

/// Creates the settings file with defaults if it does not exist yet.
pub fn init_config(path: &Path) -> Result<()> {
    if !path.exists() {
        Settings::default().write(path)?;
    }
    Ok(())
}

/// Expands a leading `~` or `$HOME` to the user's home directory.
fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    for prefix in ["~", "$HOME"] {
        if let Some(rest) = raw.strip_prefix(prefix)
            && let Some(home) = dirs::home_dir()
        {
            let rest = rest.trim_start_matches(['/', '\\']);
            return home.join(rest);
        }
    }
    path.to_path_buf()
}
