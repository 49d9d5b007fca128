//! Transport-only client primitives for Cortex agent `:run` endpoints.
//!
//! This crate owns request building, retry, stream framing, and envelope
//! classification for the agent event stream. It intentionally contains no
//! auth/login code, no persistence, and no UI coupling.
//!
//! The decode path is split in two: [`SseFrameDecoder`] reconstructs complete
//! event blocks from arbitrary byte chunks, and [`classify_event_block`]
//! turns one block into a typed [`ClassifiedPayload`] validated at this
//! boundary so downstream state reconciliation works on typed data only.

pub mod classify;
pub mod client;
pub mod config;
pub mod error;
pub mod events;
pub mod headers;
pub mod payload;
pub mod retry;
pub mod sse;
pub mod url;

pub use classify::classify_event_block;
pub use client::CortexAgentClient;
pub use config::CortexApiConfig;
pub use error::CortexApiError;
pub use events::{
    ClassifiedPayload, FunctionCall, FunctionResponse, StatusUpdate, TableData,
    INGESTION_EXECUTOR_AGENT, REPORT_COMPOSER_AGENT, ROOT_AGENT,
};
pub use payload::{AgentRunRequest, AgentTurn, RequestContext, RequestOptions, TurnRole};
pub use retry::{retry_with_backoff, RetryError, RetryPolicy};
pub use sse::SseFrameDecoder;
pub use url::agent_run_url;
