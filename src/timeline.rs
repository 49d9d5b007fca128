use std::collections::HashMap;

use cortex_api::{FunctionCall, FunctionResponse, StatusUpdate, TableData};
use serde_json::{Map, Value};

/// One side event recorded against a message: a non-text signal kept apart
/// from the message's own content, ordered by arrival.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineEvent {
    pub message_id: String,
    pub title: String,
    pub payload: TimelinePayload,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TimelinePayload {
    Status { status: String, message: String },
    Chart { spec: Value },
    Table { columns: Vec<String>, rows: Vec<Map<String, Value>> },
    Sources { content: Value },
    FunctionCall { content: String },
    FunctionResponse { content: String },
}

impl TimelineEvent {
    #[must_use]
    pub fn status(message_id: impl Into<String>, update: StatusUpdate) -> Self {
        Self {
            message_id: message_id.into(),
            title: "Agent Status Update".to_owned(),
            payload: TimelinePayload::Status {
                status: update.status,
                message: update.message,
            },
        }
    }

    #[must_use]
    pub fn chart(message_id: impl Into<String>, spec: Value) -> Self {
        Self {
            message_id: message_id.into(),
            title: "Chart".to_owned(),
            payload: TimelinePayload::Chart { spec },
        }
    }

    #[must_use]
    pub fn table(message_id: impl Into<String>, table: TableData) -> Self {
        Self {
            message_id: message_id.into(),
            title: "Table".to_owned(),
            payload: TimelinePayload::Table {
                columns: table.columns,
                rows: table.rows,
            },
        }
    }

    #[must_use]
    pub fn sources(message_id: impl Into<String>, content: Value) -> Self {
        Self {
            message_id: message_id.into(),
            title: "Retrieved Sources".to_owned(),
            payload: TimelinePayload::Sources { content },
        }
    }

    #[must_use]
    pub fn function_call(message_id: impl Into<String>, call: &FunctionCall) -> Self {
        Self {
            message_id: message_id.into(),
            title: format!("Agent Query: {}", call.name),
            payload: TimelinePayload::FunctionCall {
                content: format!(
                    "Calling function: {}\nArguments:\n{}",
                    call.name,
                    pretty(&call.arguments)
                ),
            },
        }
    }

    #[must_use]
    pub fn function_response(message_id: impl Into<String>, response: &FunctionResponse) -> Self {
        Self {
            message_id: message_id.into(),
            title: format!("Agent Response: {}", response.name),
            payload: TimelinePayload::FunctionResponse {
                content: format!(
                    "Function {} response:\n{}",
                    response.name,
                    pretty(&response.response)
                ),
            },
        }
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Append-only side-event log keyed by owning message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timeline {
    events: HashMap<String, Vec<TimelineEvent>>,
}

impl Timeline {
    pub fn record(&mut self, event: TimelineEvent) {
        self.events
            .entry(event.message_id.clone())
            .or_default()
            .push(event);
    }

    #[must_use]
    pub fn for_message(&self, message_id: &str) -> &[TimelineEvent] {
        self.events
            .get(message_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.values().all(Vec::is_empty)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use cortex_api::FunctionCall;
    use serde_json::json;

    use super::{Timeline, TimelineEvent, TimelinePayload};

    #[test]
    fn events_stay_ordered_per_message() {
        let mut timeline = Timeline::default();
        timeline.record(TimelineEvent::sources("m1", json!({"s1": "catalog"})));
        timeline.record(TimelineEvent::chart("m1", json!({"mark": "bar"})));
        timeline.record(TimelineEvent::chart("m2", json!({"mark": "line"})));

        let events = timeline.for_message("m1");
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].title, "Retrieved Sources");
        assert_eq!(events[1].title, "Chart");
        assert_eq!(timeline.for_message("m2").len(), 1);
        assert!(timeline.for_message("m3").is_empty());
    }

    #[test]
    fn function_call_entries_format_name_and_arguments() {
        let call = FunctionCall {
            name: "list_tables".to_owned(),
            arguments: json!({"schema": "PUBLIC"}),
        };
        let event = TimelineEvent::function_call("m1", &call);

        assert_eq!(event.title, "Agent Query: list_tables");
        let TimelinePayload::FunctionCall { content } = &event.payload else {
            panic!("expected a function-call payload");
        };
        assert!(content.starts_with("Calling function: list_tables\nArguments:\n"));
        assert!(content.contains("\"schema\": \"PUBLIC\""));
    }
}
