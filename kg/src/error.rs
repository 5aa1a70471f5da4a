//! Error types for template expansion

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort an expansion run
#[derive(Debug, Error)]
pub enum ExpandError {
    #[error("Failed to read template {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path} (index {index}): {source}")]
    Write {
        path: PathBuf,
        index: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("Worker for index {index} exited without reporting")]
    Worker { index: usize },
}

impl ExpandError {
    /// Index of the pass that failed, if the failure belongs to one
    pub fn index(&self) -> Option<usize> {
        match self {
            ExpandError::Read { .. } => None,
            ExpandError::Write { index, .. } | ExpandError::Worker { index } => Some(*index),
        }
    }
}
