use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read board file {path}: {cause}")]
    BoardFileUnreadable { path: PathBuf, cause: std::io::Error },

    #[error("Invalid board file, line {line}: {reason}")]
    BoardFile { line: usize, reason: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Cell ({row}, {col}) shows {shown} but has {actual} neighbouring bombs")]
    Inconsistent {
        row: usize,
        col: usize,
        shown: u8,
        actual: u8,
    },
}

pub type Result<T> = core::result::Result<T, Error>;
