//! Error types shared across the toolkit

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Conditions that stop a scan before any result is produced.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("cannot access '{}': No such file or directory", .0.display())]
    RootNotFound(PathBuf),

    #[error("'{}' is not a directory", .0.display())]
    NotADirectory(PathBuf),

    #[error("no usable tags given")]
    NoTags,

    #[error("cannot list '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Rejected or failed alias store operations.
#[derive(Debug, Error)]
pub enum AliasError {
    #[error("invalid alias name '{0}': only letters, numbers, _ and - allowed")]
    InvalidName(String),

    #[error("alias command must not be empty")]
    EmptyCommand,

    #[error("alias '{0}' not found")]
    NotFound(String),

    #[error("alias '{0}' already exists (use --force to overwrite)")]
    AlreadyExists(String),

    #[error("cannot write alias file '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot encode aliases: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Failures while reading shell history.
#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("could not find shell history file")]
    NotFound,

    #[error("could not determine home directory")]
    NoHomeDir,

    #[error("no history entry numbered {0}")]
    NoSuchEntry(usize),
}

/// Conditions that stop a cleanup before anything is deleted.
#[derive(Debug, Error)]
pub enum CleanupError {
    #[error("cannot access '{}': No such file or directory", .0.display())]
    RootNotFound(PathBuf),
}
