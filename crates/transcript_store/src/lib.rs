//! Durable local checkpoint of the conversation transcript.
//!
//! The transcript is a flat ordered list of [`TranscriptMessage`] records,
//! serialized as one JSON array and fully rewritten on every mutation. A
//! missing checkpoint file is an empty transcript, never an error.

mod error;
mod paths;
mod schema;
mod store;

pub use error::TranscriptStoreError;
pub use paths::{transcript_path, TRANSCRIPT_DIR, TRANSCRIPT_FILE};
pub use schema::{Role, TranscriptMessage};
pub use store::TranscriptStore;
