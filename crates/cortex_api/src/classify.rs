use serde_json::{Map, Value};
use tracing::warn;

use crate::error::CortexApiError;
use crate::events::{
    ClassifiedPayload, FunctionCall, FunctionResponse, StatusUpdate, TableData,
    INGESTION_EXECUTOR_AGENT, ROOT_AGENT,
};

/// Marker substring guarding chart extraction.
pub const CHART_MARKER: &str = "response.chart";
/// Marker substring guarding table extraction.
pub const TABLE_MARKER: &str = "response.table";

/// Classify one event block into its normalized semantic payload.
///
/// The block must parse as a single JSON document; failure is reported as
/// [`CortexApiError::MalformedEnvelope`] and callers skip the block without
/// aborting the stream. Status envelopes carry no text deltas, so content and
/// agent extraction are skipped entirely when a status signal is present.
pub fn classify_event_block(block: &str) -> Result<ClassifiedPayload, CortexApiError> {
    let envelope: Value = serde_json::from_str(block)
        .map_err(|error| CortexApiError::MalformedEnvelope(error.to_string()))?;

    let mut payload = ClassifiedPayload {
        status: extract_status(&envelope),
        chart: extract_chart(block, &envelope),
        table: extract_table(block, &envelope),
        ..ClassifiedPayload::default()
    };

    if payload.status.is_none() {
        extract_content_items(&envelope, &mut payload);
        extract_structured_parts(&envelope, &mut payload);
        payload.agent = extract_agent(&envelope, payload.tool_name.as_deref());

        if let Some(delta) = envelope.get("actions").and_then(|actions| actions.get("stateDelta")) {
            payload.final_report = delta
                .get("final_report_with_citations")
                .and_then(Value::as_str)
                .map(str::to_owned);
            payload.sources = delta.get("sources").cloned();
        }
    }

    Ok(payload)
}

fn extract_status(envelope: &Value) -> Option<StatusUpdate> {
    let status = envelope.get("status").and_then(Value::as_str)?;
    let message = envelope.get("message").and_then(Value::as_str)?;
    Some(StatusUpdate {
        status: status.to_owned(),
        message: message.to_owned(),
    })
}

fn extract_chart(block: &str, envelope: &Value) -> Option<Value> {
    if !block.contains(CHART_MARKER) {
        return None;
    }
    let spec = envelope.get("chart_spec").and_then(Value::as_str)?;

    match serde_json::from_str(spec) {
        Ok(decoded) => Some(decoded),
        Err(error) => {
            // The rest of the envelope is still usable.
            warn!(%error, "dropping chart signal with undecodable chart_spec");
            None
        }
    }
}

fn extract_table(block: &str, envelope: &Value) -> Option<TableData> {
    if !block.contains(TABLE_MARKER) {
        return None;
    }
    let result_set = envelope.get("result_set")?;
    let data = result_set.get("data")?.as_array()?;
    let row_type = result_set
        .get("result_set_meta_data")?
        .get("row_type")?
        .as_array()?;

    let columns: Vec<String> = row_type
        .iter()
        .map(|column| {
            column
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_owned()
        })
        .collect();

    let rows = data
        .iter()
        .map(|row| {
            let cells = row.as_array().map(Vec::as_slice).unwrap_or_default();
            columns
                .iter()
                .enumerate()
                .map(|(index, name)| {
                    (name.clone(), cells.get(index).cloned().unwrap_or(Value::Null))
                })
                .collect::<Map<String, Value>>()
        })
        .collect();

    Some(TableData { columns, rows })
}

fn extract_content_items(envelope: &Value, payload: &mut ClassifiedPayload) {
    let Some(items) = envelope.get("content").and_then(Value::as_array) else {
        return;
    };

    for item in items {
        match item.get("type").and_then(Value::as_str) {
            Some("text") => {
                if let Some(text) = item.get("text").and_then(Value::as_str) {
                    payload.text_parts.push(text.to_owned());
                }
            }
            Some("thinking") => payload.has_thinking = true,
            _ => {}
        }
    }

    let tool_use = items
        .iter()
        .find(|item| item.get("type").and_then(Value::as_str) == Some("tool_use"))
        .and_then(|item| item.get("tool_use"));
    if let Some(descriptor) = tool_use {
        if let Some(name) = descriptor.get("name").and_then(Value::as_str) {
            payload.tool_name = Some(name.to_owned());
            payload.tool_input = descriptor.get("input").cloned();
        }
    }

    // A result descriptor names the tool only when no tool_use did.
    if payload.tool_name.is_none() {
        payload.tool_name = items
            .iter()
            .find(|item| item.get("type").and_then(Value::as_str) == Some("tool_result"))
            .and_then(|item| item.get("tool_result"))
            .and_then(|descriptor| descriptor.get("name"))
            .and_then(Value::as_str)
            .map(str::to_owned);
    }
}

fn extract_structured_parts(envelope: &Value, payload: &mut ClassifiedPayload) {
    let Some(parts) = envelope
        .get("content")
        .and_then(|content| content.get("parts"))
        .and_then(Value::as_array)
    else {
        return;
    };

    if let Some(call) = parts.iter().find_map(|part| part.get("functionCall")) {
        if let Some(name) = call.get("name").and_then(Value::as_str) {
            payload.function_call = Some(FunctionCall {
                name: name.to_owned(),
                arguments: call.get("args").cloned().unwrap_or_else(empty_object),
            });
        }
    }

    if let Some(response) = parts.iter().find_map(|part| part.get("functionResponse")) {
        if let Some(name) = response.get("name").and_then(Value::as_str) {
            payload.function_response = Some(FunctionResponse {
                name: name.to_owned(),
                response: response.get("response").cloned().unwrap_or_else(empty_object),
            });
        }
    }
}

fn extract_agent(envelope: &Value, tool_name: Option<&str>) -> Option<String> {
    if let Some(author) = envelope.get("author").and_then(Value::as_str) {
        return Some(author.to_owned());
    }

    let tool_name = tool_name?;
    if tool_name.contains("Discovery") {
        Some(ROOT_AGENT.to_owned())
    } else if tool_name.contains("Ingestion") {
        Some(INGESTION_EXECUTOR_AGENT.to_owned())
    } else {
        Some(ROOT_AGENT.to_owned())
    }
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}
