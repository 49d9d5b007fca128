use std::collections::BTreeMap;

use crate::config::CortexApiConfig;
use crate::error::CortexApiError;

pub const HEADER_AUTHORIZATION: &str = "authorization";
pub const HEADER_CONTENT_TYPE: &str = "content-type";
pub const HEADER_ACCEPT: &str = "accept";
pub const HEADER_CONNECTION: &str = "connection";

/// Build a deterministic header map for agent run requests.
pub fn build_headers(config: &CortexApiConfig) -> Result<BTreeMap<String, String>, CortexApiError> {
    if config.access_token.trim().is_empty() {
        return Err(CortexApiError::MissingAccessToken);
    }

    let mut headers = BTreeMap::new();
    headers.insert(
        HEADER_AUTHORIZATION.to_owned(),
        format!("Bearer {}", config.access_token.trim()),
    );
    headers.insert(HEADER_CONTENT_TYPE.to_owned(), "application/json".to_owned());
    headers.insert(HEADER_ACCEPT.to_owned(), "text/event-stream".to_owned());
    headers.insert(HEADER_CONNECTION.to_owned(), "keep-alive".to_owned());

    for (key, value) in &config.extra_headers {
        headers.insert(key.trim().to_ascii_lowercase(), value.trim().to_owned());
    }

    Ok(headers)
}
