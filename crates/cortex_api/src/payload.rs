use serde::{Deserialize, Serialize};

/// Canonical request payload for the agent `:run` endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRunRequest {
    /// Fully qualified agent name, `DATABASE.SCHEMA.AGENT`.
    pub agent: String,
    /// Full prior transcript re-encoded as alternating turns plus the new
    /// query.
    pub messages: Vec<AgentTurn>,
    pub context: RequestContext,
    pub options: RequestOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentTurn {
    pub role: TurnRole,
    pub content: Vec<TurnContent>,
}

impl AgentTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: vec![TurnContent::text(text)],
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: vec![TurnContent::text(text)],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnContent {
    #[serde(rename = "type")]
    pub content_type: String,
    pub text: String,
}

impl TurnContent {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content_type: "text".to_owned(),
            text: text.into(),
        }
    }
}

/// Execution context forwarded with every run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestContext {
    pub warehouse: String,
    pub database: String,
    pub schema: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestOptions {
    pub allow_execution: bool,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{AgentRunRequest, AgentTurn, RequestContext, RequestOptions};

    #[test]
    fn serializes_the_documented_wire_shape() {
        let request = AgentRunRequest {
            agent: "ANALYTICS_DB.PUBLIC.INGEST_AGENT".to_owned(),
            messages: vec![
                AgentTurn::user("load orders.csv"),
                AgentTurn::assistant("Discovered 3 files."),
                AgentTurn::user("continue"),
            ],
            context: RequestContext {
                warehouse: "INGEST_WH".to_owned(),
                database: "ANALYTICS_DB".to_owned(),
                schema: "PUBLIC".to_owned(),
            },
            options: RequestOptions {
                allow_execution: true,
            },
        };

        let encoded = serde_json::to_value(&request).expect("request should serialize");
        assert_eq!(
            encoded,
            json!({
                "agent": "ANALYTICS_DB.PUBLIC.INGEST_AGENT",
                "messages": [
                    {"role": "user", "content": [{"type": "text", "text": "load orders.csv"}]},
                    {"role": "assistant", "content": [{"type": "text", "text": "Discovered 3 files."}]},
                    {"role": "user", "content": [{"type": "text", "text": "continue"}]},
                ],
                "context": {
                    "warehouse": "INGEST_WH",
                    "database": "ANALYTICS_DB",
                    "schema": "PUBLIC",
                },
                "options": {"allow_execution": true},
            })
        );
    }
}
