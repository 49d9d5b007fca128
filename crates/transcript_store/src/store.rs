use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::TranscriptStoreError;
use crate::schema::TranscriptMessage;

/// Flat-file checkpoint of the transcript.
///
/// Every save rewrites the whole message list; the store keeps no incremental
/// state of its own.
#[derive(Debug, Clone)]
pub struct TranscriptStore {
    path: PathBuf,
}

impl TranscriptStore {
    #[must_use]
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the checkpointed transcript; a missing file is an empty one.
    pub fn load(&self) -> Result<Vec<TranscriptMessage>, TranscriptStoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(error) => {
                return Err(TranscriptStoreError::io(
                    "reading transcript",
                    &self.path,
                    error,
                ))
            }
        };

        serde_json::from_str(&raw).map_err(|source| TranscriptStoreError::parse(&self.path, source))
    }

    /// Rewrite the whole transcript.
    pub fn save(&self, messages: &[TranscriptMessage]) -> Result<(), TranscriptStoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|error| {
                TranscriptStoreError::io("creating transcript directory", parent, error)
            })?;
        }

        let serialized = serde_json::to_string(messages)
            .map_err(|source| TranscriptStoreError::serialize(&self.path, source))?;
        fs::write(&self.path, serialized)
            .map_err(|error| TranscriptStoreError::io("writing transcript", &self.path, error))
    }
}
