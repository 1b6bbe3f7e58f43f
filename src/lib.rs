//! savewatch: a cross-platform save-file backup watcher.
//!
//! This crate provides the backup pipeline behind the `sw` CLI: a debounced
//! filesystem change monitor, a backup orchestrator with manual and
//! automatic paths, slot rotation for automatic backups, and a count-based
//! retention sweep for manual ones.

pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod file_util;
pub mod retention;
pub mod rotation;
pub mod sysexits;
pub mod watcher;

pub use error::BackupError;

/// Unified result type for the backup pipeline.
pub type Result<T> = std::result::Result<T, BackupError>;
