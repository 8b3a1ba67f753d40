// Error types for the board engine, persistence and configuration
// Every error here is recoverable and handed back to the caller

use std::path::PathBuf;

/// Errors raised by the board engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("invalid board configuration: {rows}x{cols} with {mines} mines")]
    InvalidConfiguration {
        rows: usize,
        cols: usize,
        mines: usize,
    },

    #[error("malformed layout: {0}")]
    MalformedLayout(String),

    #[error("cell ({row}, {col}) is outside the {rows}x{cols} board")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("cannot act on cell ({row}, {col}): {reason}")]
    InvalidTransition {
        row: usize,
        col: usize,
        reason: &'static str,
    },
}

/// Errors raised while reading or writing maps and best times.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{} not found.", .0.display())]
    MapNotFound(PathBuf),

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Layout(#[from] GameError),

    #[error("bad time value: {0:?}")]
    BadTime(String),
}

/// Errors raised while loading or saving the configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write config file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("failed to serialize TOML: {0}")]
    TomlWrite(#[from] toml::ser::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}
