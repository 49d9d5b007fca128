use cortex_api::{AgentTurn, CortexAgentClient};
use transcript_store::{Role, TranscriptMessage};

use crate::reconciler::Conversation;

/// One interactive conversation against a Cortex agent.
///
/// Submissions are serialized: one outstanding request at a time, with the
/// reconciler as the single writer of conversation state.
pub struct ChatSession {
    client: CortexAgentClient,
    conversation: Conversation,
}

impl ChatSession {
    #[must_use]
    pub fn new(client: CortexAgentClient, conversation: Conversation) -> Self {
        Self {
            client,
            conversation,
        }
    }

    #[must_use]
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Submit one user turn and fold the streamed response into state.
    ///
    /// The request re-encodes the full prior transcript plus the new query.
    /// Transport and retry-budget failures do not escape: they surface as an
    /// inline assistant error message appended to the transcript.
    pub async fn submit(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            return;
        }

        // Encode the prior transcript before this turn's messages exist.
        let mut turns: Vec<AgentTurn> = self
            .conversation
            .messages()
            .iter()
            .map(turn_from_message)
            .collect();
        turns.push(AgentTurn::user(query));
        let request = self.client.run_request(turns);

        let (_user_id, assistant_id) = self.conversation.begin_turn(query);

        let Self {
            client,
            conversation,
        } = self;
        let outcome = client
            .stream_with_handler(&request, |payload| {
                conversation.apply(payload, &assistant_id);
            })
            .await;

        if let Err(error) = outcome {
            conversation.fail_turn(&error.to_string());
        }
    }

    /// Drop the conversation and its checkpoint back to empty.
    pub fn clear(&mut self) {
        self.conversation.clear();
    }
}

fn turn_from_message(message: &TranscriptMessage) -> AgentTurn {
    match message.role {
        Role::User => AgentTurn::user(message.text.as_str()),
        Role::Assistant => AgentTurn::assistant(message.text.as_str()),
    }
}
