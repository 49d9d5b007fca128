/// Build the `:run` endpoint for one agent.
///
/// The base URL loses trailing slashes; database and schema are
/// percent-encoded as path segments. The agent name is appended verbatim so
/// the `:run` action suffix stays intact.
pub fn agent_run_url(base_url: &str, database: &str, schema: &str, agent: &str) -> String {
    let base = base_url.trim().trim_end_matches('/');
    format!(
        "{base}/api/v2/databases/{}/schemas/{}/agents/{agent}:run",
        encode_segment(database),
        encode_segment(schema),
    )
}

/// Percent-encode one path segment, leaving unreserved characters intact.
fn encode_segment(segment: &str) -> String {
    let mut encoded = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => encoded.push(byte as char),
            _ => encoded.push_str(&format!("%{byte:02X}")),
        }
    }
    encoded
}
