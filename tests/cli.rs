use assert_cmd::prelude::*;
use assert_fs::TempDir;
use assert_fs::prelude::*;
use predicates::prelude::*;
use savewatch::config::{Settings, SlotPolicy};
use std::fs;
use std::path::PathBuf;
use std::process::Command;

fn write_settings(dir: &TempDir) -> PathBuf {
    let config_path = dir.path().join("settings.toml");
    let settings = Settings {
        target_file: dir.path().join("Save00.sav"),
        backup_dir: dir.path().join("backups"),
        auto_backup: true,
        max_backups: 5,
        slot_policy: SlotPolicy::Rotate,
    };
    settings.write(&config_path).unwrap();
    config_path
}

#[test]
fn no_command_prints_usage_hint() -> Result<(), Box<dyn std::error::Error>> {
    Command::cargo_bin("sw")?
        .assert()
        .failure()
        .stderr(predicate::str::contains("requires at least one command"));
    Ok(())
}

#[test]
fn unconfigured_settings_are_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let config_path = dir.path().join("settings.toml");

    Command::cargo_bin("sw")?
        .arg("--config")
        .arg(&config_path)
        .arg("backup")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not set"));

    // The file was initialized with defaults along the way.
    assert!(config_path.exists());
    Ok(())
}

#[test]
fn backup_then_list() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let config_path = write_settings(&dir);
    dir.child("Save00.sav").write_binary(b"save data")?;

    Command::cargo_bin("sw")?
        .arg("--config")
        .arg(&config_path)
        .arg("backup")
        .assert()
        .success()
        .stdout(predicate::str::contains("Backup written to"));

    let backups: Vec<_> = fs::read_dir(dir.path().join("backups"))?
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(backups.len(), 1);
    assert!(backups[0].starts_with("Save00_"));
    assert!(backups[0].ends_with(".sav"));

    Command::cargo_bin("sw")?
        .arg("--config")
        .arg(&config_path)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Manual backups:"))
        .stdout(predicate::str::contains(&backups[0]));
    Ok(())
}

#[test]
fn auto_backup_writes_slot_file() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let config_path = write_settings(&dir);
    dir.child("Save00.sav").write_binary(b"save data")?;

    Command::cargo_bin("sw")?
        .arg("--config")
        .arg(&config_path)
        .arg("backup")
        .arg("--auto")
        .assert()
        .success()
        .stdout(predicate::str::contains("Automatic backup written to"));

    dir.child("backups/Save00_auto_0.sav")
        .assert(predicate::path::exists());

    Command::cargo_bin("sw")?
        .arg("--config")
        .arg(&config_path)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("Automatic backups:"))
        .stdout(predicate::str::contains("Save00_auto_0.sav"));
    Ok(())
}

#[test]
fn backup_fails_cleanly_without_target() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let config_path = write_settings(&dir);

    Command::cargo_bin("sw")?
        .arg("--config")
        .arg(&config_path)
        .arg("backup")
        .assert()
        .failure()
        .stderr(predicate::str::contains("source file not found"));
    Ok(())
}

#[test]
fn config_prints_path_and_contents() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let config_path = dir.path().join("settings.toml");

    Command::cargo_bin("sw")?
        .arg("--config")
        .arg(&config_path)
        .arg("config")
        .assert()
        .success()
        .stdout(predicate::str::contains("settings.toml"))
        .stdout(predicate::str::contains("auto_backup = true"));
    Ok(())
}

#[test]
fn config_reset_restores_defaults() -> Result<(), Box<dyn std::error::Error>> {
    let dir = TempDir::new()?;
    let config_path = write_settings(&dir);

    Command::cargo_bin("sw")?
        .arg("--config")
        .arg(&config_path)
        .arg("config")
        .arg("--reset")
        .assert()
        .success()
        .stdout(predicate::str::contains("Settings reset"));

    let settings = Settings::load(&config_path)?;
    assert!(!settings.is_configured());
    assert_eq!(settings.max_backups, 10);
    Ok(())
}
