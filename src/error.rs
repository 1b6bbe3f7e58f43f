//! Error taxonomy for the backup pipeline.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced by the backup pipeline.
///
/// Every variant is terminal for a single backup attempt only: the caller
/// logs it and waits for the next trigger. Nothing here should take down
/// the watcher or the host process, and no operation retries on its own.
#[derive(Debug, Error)]
pub enum BackupError {
    /// The file to back up does not exist.
    #[error("source file not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    /// The destination directory could not be created.
    #[error("failed to create directory {}: {source}", path.display())]
    DirectoryCreateFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The byte copy itself failed. A half-written destination is left in
    /// place; the next successful backup overwrites it.
    #[error("failed to copy {} to {}: {source}", src.display(), dest.display())]
    CopyFailed {
        src: PathBuf,
        dest: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A delete or rename during automatic slot cycling failed. The slots
    /// are left as they are; the next trigger retries from that state.
    #[error("slot rotation failed: {op} {}: {source}", path.display())]
    Rotation {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The backup directory could not be listed for the retention sweep.
    #[error("failed to list backup directory {}: {source}", dir.display())]
    ListDirFailed {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A single file could not be deleted during the retention sweep.
    #[error("failed to delete {}: {source}", path.display())]
    DeleteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The filesystem watch subscription could not be established.
    #[error("failed to set up file watch: {0}")]
    WatchSetupFailed(#[from] notify::Error),
}
