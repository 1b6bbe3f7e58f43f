//! Command-line interface definition for savewatch.
//!
//! This module defines all CLI commands and their handlers: the watch loop,
//! one-shot backups, listing the backup directory, and settings file
//! management.

use crate::config::{self, Settings};
use crate::engine::BackupEngine;
use crate::watcher::FileWatcher;
use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command as SystemCommand;
use tokio::runtime::Builder;

/// Command-line interface definition for savewatch.
#[derive(Parser)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the settings file (defaults to the platform config directory).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
    /// Subcommand to execute.
    #[command(subcommand)]
    pub commands: Option<Commands>,
}

/// Supported savewatch commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Watch the save file and back it up automatically on change.
    Watch,
    /// Take a backup right now.
    Backup {
        /// Write to the automatic slot(s) instead of a timestamped manual backup.
        #[arg(short, long)]
        auto: bool,
    },
    /// List the backups in the backup directory.
    List,
    /// Display the settings file path and contents, or reset it to defaults.
    Config {
        /// Reset the settings file to defaults.
        #[arg(short, long)]
        reset: bool,
    },
    /// Open the backup directory in the platform file manager.
    Open,
}

/// Initializes the settings file if needed and loads it, refusing to run
/// against an unconfigured file.
fn load_settings(config_path: &Path) -> Result<Settings> {
    config::init_config(config_path)?;
    let settings = Settings::load(config_path)?;
    if !settings.is_configured() {
        bail!(
            "target_file and backup_dir are not set; edit {}",
            config_path.display()
        );
    }
    Ok(settings)
}

/// Runs the change monitor until Ctrl-C.
pub fn watch(config_path: &Path) -> Result<()> {
    let settings = load_settings(config_path)?;
    let engine = BackupEngine::new(settings);

    let rt = Builder::new_multi_thread().enable_all().build()?;
    rt.block_on(async move {
        let mut watcher = FileWatcher::new(engine);
        watcher.start();
        tokio::signal::ctrl_c()
            .await
            .context("failed to listen for shutdown signal")?;
        log::info!("shutting down");
        watcher.stop().await;
        Ok::<(), anyhow::Error>(())
    })?;
    Ok(())
}

/// Takes a single backup: manual by default, or one pass of the automatic
/// path with `--auto`.
pub fn backup(config_path: &Path, auto: bool) -> Result<()> {
    let settings = load_settings(config_path)?;
    let engine = BackupEngine::new(settings);

    if auto {
        match engine.run_auto_backup()? {
            Some(path) => println!("Automatic backup written to {}", path.display()),
            None => println!("Automatic backup is disabled in the settings."),
        }
    } else {
        let path = engine.run_manual_backup()?;
        println!("Backup written to {}", path.display());
    }
    Ok(())
}

/// Lists the backups in the backup directory, classified as manual or
/// automatic.
pub fn list(config_path: &Path) -> Result<()> {
    let settings = load_settings(config_path)?;
    let engine = BackupEngine::new(settings);
    let backup_dir = engine.settings().backup_dir.clone();
    if !backup_dir.exists() {
        println!("No backups yet.");
        return Ok(());
    }

    let mut manual: Vec<(String, u64)> = Vec::new();
    let mut auto: Vec<(String, u64)> = Vec::new();
    let entries = fs::read_dir(&backup_dir)
        .with_context(|| format!("failed to list {}", backup_dir.display()))?;
    for entry in entries {
        let entry = entry?;
        if !entry.path().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
        if engine.is_manual_backup_name(&name) {
            manual.push((name, size));
        } else if engine.is_auto_backup_name(&name) {
            auto.push((name, size));
        }
    }

    if manual.is_empty() && auto.is_empty() {
        println!("No backups yet.");
        return Ok(());
    }
    manual.sort();
    auto.sort();
    if !manual.is_empty() {
        println!("Manual backups:");
        for (name, size) in &manual {
            println!("  {name}  ({size} bytes)");
        }
    }
    if !auto.is_empty() {
        println!("Automatic backups:");
        for (name, size) in &auto {
            println!("  {name}  ({size} bytes)");
        }
    }
    Ok(())
}

/// Prints the settings file path and contents, or resets the file to
/// defaults with `reset`.
pub fn show_config(config_path: &Path, reset: bool) -> Result<()> {
    if reset {
        Settings::default().write(config_path)?;
        println!("Settings reset: {}", config_path.display());
        return Ok(());
    }
    config::init_config(config_path)?;
    println!("{}", config_path.display());
    let contents = fs::read_to_string(config_path)
        .with_context(|| format!("failed to read {}", config_path.display()))?;
    print!("{contents}");
    Ok(())
}

/// Opens the backup directory in the platform file manager.
pub fn open(config_path: &Path) -> Result<()> {
    let settings = load_settings(config_path)?;
    fs::create_dir_all(&settings.backup_dir)
        .with_context(|| format!("failed to create {}", settings.backup_dir.display()))?;

    let opener = if cfg!(target_os = "windows") {
        "explorer"
    } else if cfg!(target_os = "macos") {
        "open"
    } else {
        "xdg-open"
    };
    SystemCommand::new(opener)
        .arg(&settings.backup_dir)
        .spawn()
        .with_context(|| format!("failed to open {}", settings.backup_dir.display()))?;
    Ok(())
}
