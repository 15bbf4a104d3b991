//! Raw inbound message retrieval.

use std::fs;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

/// Failure to fetch a raw message.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid message id '{0}'")]
    InvalidId(String),

    #[error("message {id} not readable at {path}: {source}")]
    Io {
        id: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Source of raw message bytes, keyed by message id.
pub trait MessageStore: Send + Sync {
    fn fetch(&self, message_id: &str) -> Result<Vec<u8>, StoreError>;
}

/// Messages stored as one file per id under a root directory, optionally
/// below a key prefix.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
    prefix: String,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            prefix: prefix.into(),
        }
    }

    /// Location of a message: `root/prefix/id`, or `root/id` without a prefix.
    pub fn path_for(&self, message_id: &str) -> Result<PathBuf, StoreError> {
        let id = Path::new(message_id);
        let plain = !message_id.is_empty()
            && id.components().all(|c| matches!(c, Component::Normal(_)))
            && id.components().count() == 1;
        if !plain {
            return Err(StoreError::InvalidId(message_id.to_string()));
        }

        let mut path = self.root.clone();
        if !self.prefix.is_empty() {
            path.push(&self.prefix);
        }
        path.push(message_id);
        Ok(path)
    }
}

impl MessageStore for DirectoryStore {
    fn fetch(&self, message_id: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.path_for(message_id)?;
        tracing::debug!(message_id = %message_id, path = %path.display(), "Reading raw message");
        fs::read(&path).map_err(|source| StoreError::Io {
            id: message_id.to_string(),
            path,
            source,
        })
    }
}
