use serde_json::{Map, Value};

/// Default coordinating agent, also inferred for discovery tooling.
pub const ROOT_AGENT: &str = "root_agent";
/// Agent inferred for ingestion-executing tooling.
pub const INGESTION_EXECUTOR_AGENT: &str = "ingestion_executor_agent";
/// The only agent whose final-report payloads finalize a turn.
pub const REPORT_COMPOSER_AGENT: &str = "report_composer_with_citations";

/// Top-level status signal carried by a status-only envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub status: String,
    pub message: String,
}

/// Decoded tabular result: column names zipped against positional row values.
#[derive(Debug, Clone, PartialEq)]
pub struct TableData {
    pub columns: Vec<String>,
    pub rows: Vec<Map<String, Value>>,
}

/// Structured function invocation extracted from a `parts` envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    pub arguments: Value,
}

/// Structured function response extracted from a `parts` envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionResponse {
    pub name: String,
    pub response: Value,
}

/// Normalized semantic payload extracted from one event block.
///
/// Signal shapes are non-exclusive: a single envelope may carry text
/// fragments, a tool invocation, and side events at once, and every detected
/// side event must be surfaced by the caller.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassifiedPayload {
    /// Text fragments in sequence order.
    pub text_parts: Vec<String>,
    /// Explicit `author`, or identity inferred from the tool name.
    pub agent: Option<String>,
    /// Literal final-report text from `actions.stateDelta`.
    pub final_report: Option<String>,
    /// Sources block accompanying a final report.
    pub sources: Option<Value>,
    /// First tool named by a `tool_use` item, else by a `tool_result` item.
    pub tool_name: Option<String>,
    /// Structured input of the first `tool_use` item.
    pub tool_input: Option<Value>,
    pub function_call: Option<FunctionCall>,
    pub function_response: Option<FunctionResponse>,
    pub status: Option<StatusUpdate>,
    /// Decoded `chart_spec` structure.
    pub chart: Option<Value>,
    pub table: Option<TableData>,
    /// Informational only; thinking items are not surfaced further.
    pub has_thinking: bool,
}
