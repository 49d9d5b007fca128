use std::collections::BTreeSet;

use cortex_api::{ClassifiedPayload, REPORT_COMPOSER_AGENT};
use tracing::warn;
use transcript_store::{TranscriptMessage, TranscriptStore};
use uuid::Uuid;

use crate::stages::{stage_for_tool, PipelineStage, StageStatus, StageTable, FILE_SPLIT_TOOL};
use crate::timeline::{Timeline, TimelineEvent};

/// Accumulation state for the one in-flight assistant message.
///
/// Owned exclusively by the active turn and reset when the next one begins.
#[derive(Debug, Default, Clone)]
struct StreamCursor {
    current_agent: String,
    accumulated_text: String,
}

/// Owns the transcript, the per-message side-event timeline, and the
/// pipeline stage table, and is their single writer.
///
/// Every transcript mutation is mirrored to the checkpoint store right after
/// the in-memory update; a failed checkpoint is logged and not retried.
#[derive(Debug, Default)]
pub struct Conversation {
    messages: Vec<TranscriptMessage>,
    timeline: Timeline,
    stages: StageTable,
    observed_tools: BTreeSet<String>,
    cursor: StreamCursor,
    store: Option<TranscriptStore>,
}

impl Conversation {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a checkpoint store and restore whatever it holds.
    ///
    /// A corrupt checkpoint starts the conversation empty rather than
    /// failing startup.
    #[must_use]
    pub fn with_store(store: TranscriptStore) -> Self {
        let messages = store.load().unwrap_or_else(|error| {
            warn!(%error, "discarding unreadable transcript checkpoint");
            Vec::new()
        });

        Self {
            messages,
            store: Some(store),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn messages(&self) -> &[TranscriptMessage] {
        &self.messages
    }

    #[must_use]
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    #[must_use]
    pub fn stages(&self) -> &StageTable {
        &self.stages
    }

    #[must_use]
    pub fn observed_tools(&self) -> &BTreeSet<String> {
        &self.observed_tools
    }

    /// Start a user turn: the submitted query plus an empty assistant
    /// placeholder the stream will fill. Returns (user id, assistant id).
    pub fn begin_turn(&mut self, query: &str) -> (String, String) {
        let user_id = new_message_id();
        let assistant_id = new_message_id();
        self.messages
            .push(TranscriptMessage::user(user_id.clone(), query));
        self.messages
            .push(TranscriptMessage::assistant(assistant_id.clone(), ""));
        self.cursor = StreamCursor::default();
        self.persist();

        (user_id, assistant_id)
    }

    /// Surface a failed submission as an inline assistant message.
    pub fn fail_turn(&mut self, summary: &str) -> String {
        let id = new_message_id();
        self.messages.push(TranscriptMessage::assistant(
            id.clone(),
            format!("Sorry, there was an error processing your request: {summary}"),
        ));
        self.persist();
        id
    }

    /// Drop all conversation state and rewrite the empty checkpoint.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.timeline.clear();
        self.stages.reset();
        self.observed_tools.clear();
        self.cursor = StreamCursor::default();
        self.persist();
    }

    /// Fold one classified payload into transcript, timeline, and stage
    /// state.
    pub fn apply(&mut self, payload: ClassifiedPayload, target_message_id: &str) {
        // Status envelopes are timeline-only.
        if let Some(status) = payload.status {
            self.timeline
                .record(TimelineEvent::status(target_message_id, status));
            return;
        }

        if let Some(spec) = payload.chart {
            self.timeline
                .record(TimelineEvent::chart(target_message_id, spec));
        }
        if let Some(table) = payload.table {
            self.timeline
                .record(TimelineEvent::table(target_message_id, table));
        }

        if let Some(agent) = &payload.agent {
            if *agent != self.cursor.current_agent {
                self.cursor.current_agent.clone_from(agent);
            }
        }

        for text in &payload.text_parts {
            self.cursor.accumulated_text.push_str(text);
            self.cursor.accumulated_text.push(' ');

            // Message content is always replace-with-buffer-so-far, never an
            // append to the message itself.
            let snapshot = self.cursor.accumulated_text.trim().to_owned();
            let agent = self.cursor.current_agent.clone();
            if let Some(message) = self.message_mut(target_message_id) {
                message.text = snapshot;
                if !agent.is_empty() {
                    message.producing_agent = Some(agent);
                }
            }
            self.persist();
        }

        if let Some(sources) = payload.sources {
            self.timeline
                .record(TimelineEvent::sources(target_message_id, sources));
        }

        // The report composer finalizes the turn with a standalone message;
        // the in-progress streaming message is left as-is.
        if payload.agent.as_deref() == Some(REPORT_COMPOSER_AGENT) {
            if let Some(report) = &payload.final_report {
                let agent = (!self.cursor.current_agent.is_empty())
                    .then(|| self.cursor.current_agent.clone());
                self.messages
                    .push(TranscriptMessage::finalized(new_message_id(), report, agent));
                self.persist();
            }
        }

        if let Some(tool_name) = &payload.tool_name {
            self.observed_tools.insert(tool_name.clone());

            // Tool arrival is treated as stage completion; no success
            // confirmation is awaited.
            let stage = stage_for_tool(tool_name, payload.tool_input.as_ref());
            if let Some(stage) = stage {
                self.stages.set_status(stage, StageStatus::InProgress);
            }
            if tool_name == FILE_SPLIT_TOOL {
                self.stages
                    .set_status(PipelineStage::DataDiscovery, StageStatus::Completed);
            }
            if let Some(stage) = stage {
                self.stages.set_status(stage, StageStatus::Completed);
            }
        }

        if let Some(call) = &payload.function_call {
            self.timeline
                .record(TimelineEvent::function_call(target_message_id, call));
        }
        if let Some(response) = &payload.function_response {
            self.timeline
                .record(TimelineEvent::function_response(target_message_id, response));
        }
    }

    fn message_mut(&mut self, id: &str) -> Option<&mut TranscriptMessage> {
        self.messages.iter_mut().find(|message| message.id == id)
    }

    fn persist(&self) {
        let Some(store) = &self.store else {
            return;
        };
        // In-memory state is already updated; the checkpoint is best-effort.
        if let Err(error) = store.save(&self.messages) {
            warn!(%error, "failed to checkpoint transcript");
        }
    }
}

fn new_message_id() -> String {
    Uuid::new_v4().to_string()
}
