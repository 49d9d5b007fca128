//! Conversation core for a streaming data-ingestion agent console.
//!
//! Invariant: single writer. All transcript, timeline, and stage mutations
//! flow through [`Conversation::apply`] on one reconciliation path.
//!
//! # Public API Overview
//! - Drive a full user turn against a Cortex agent with [`ChatSession`].
//! - Fold classified stream payloads into observable state with
//!   [`Conversation`].
//! - Inspect pipeline progress via [`StageTable`] and per-message side events
//!   via [`Timeline`].

pub mod reconciler;
pub mod session;
pub mod stages;
pub mod timeline;

pub use reconciler::Conversation;
pub use session::ChatSession;
pub use stages::{stage_for_tool, PipelineStage, StageEntry, StageStatus, StageTable};
pub use timeline::{Timeline, TimelineEvent, TimelinePayload};

pub use transcript_store::{Role, TranscriptMessage};
