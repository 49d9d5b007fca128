use std::path::{Path, PathBuf};

pub const TRANSCRIPT_DIR: &str = ".ingest_console";
pub const TRANSCRIPT_FILE: &str = "conversation.json";

/// Default checkpoint location under a working directory.
#[must_use]
pub fn transcript_path(root: &Path) -> PathBuf {
    root.join(TRANSCRIPT_DIR).join(TRANSCRIPT_FILE)
}
