use futures_util::StreamExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Response};
use tracing::warn;

use crate::classify::classify_event_block;
use crate::config::CortexApiConfig;
use crate::error::{parse_error_message, CortexApiError};
use crate::events::ClassifiedPayload;
use crate::headers::build_headers;
use crate::payload::{AgentRunRequest, AgentTurn, RequestContext, RequestOptions};
use crate::retry::{retry_with_backoff, RetryError, RetryPolicy};
use crate::sse::SseFrameDecoder;
use crate::url::agent_run_url;

/// HTTP client for one Cortex agent, driving the full request/decode path:
/// POST under bounded backoff, then response bytes through the frame decoder
/// and classifier into the caller's callback.
#[derive(Debug)]
pub struct CortexAgentClient {
    http: Client,
    config: CortexApiConfig,
    retry_policy: RetryPolicy,
}

impl CortexAgentClient {
    pub fn new(config: CortexApiConfig) -> Result<Self, CortexApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(CortexApiError::from)?;

        Ok(Self {
            http,
            config,
            retry_policy: RetryPolicy::default(),
        })
    }

    #[must_use]
    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    pub fn config(&self) -> &CortexApiConfig {
        &self.config
    }

    pub fn run_endpoint(&self) -> String {
        agent_run_url(
            &self.config.base_url,
            &self.config.database,
            &self.config.schema,
            &self.config.agent,
        )
    }

    /// Assemble the run payload for a transcript's worth of turns.
    pub fn run_request(&self, messages: Vec<AgentTurn>) -> AgentRunRequest {
        AgentRunRequest {
            agent: self.config.qualified_agent_name(),
            messages,
            context: RequestContext {
                warehouse: self.config.warehouse.clone(),
                database: self.config.database.clone(),
                schema: self.config.schema.clone(),
            },
            options: RequestOptions {
                allow_execution: self.config.allow_execution,
            },
        }
    }

    pub fn build_headers(&self) -> Result<HeaderMap, CortexApiError> {
        let headers = build_headers(&self.config)?;
        let mut out = HeaderMap::new();
        for (key, value) in headers {
            out.insert(
                HeaderName::from_bytes(key.as_bytes()).map_err(|_| {
                    CortexApiError::InvalidEndpoint(format!("invalid header key: {key}"))
                })?,
                HeaderValue::from_str(&value).map_err(|_| {
                    CortexApiError::InvalidEndpoint(format!("invalid header value for {key}"))
                })?,
            );
        }
        Ok(out)
    }

    pub fn build_request(
        &self,
        request: &AgentRunRequest,
    ) -> Result<reqwest::RequestBuilder, CortexApiError> {
        if self.config.base_url.trim().is_empty() {
            return Err(CortexApiError::InvalidEndpoint(
                "base URL is required".to_owned(),
            ));
        }

        let headers = self.build_headers()?;
        Ok(self
            .http
            .post(self.run_endpoint())
            .headers(headers)
            .json(request))
    }

    /// POST the run request under the bounded backoff policy.
    ///
    /// Every failure is retried until the attempt or wall-clock budget runs
    /// out; exhaustion re-raises the last underlying error.
    pub async fn send_with_retry(
        &self,
        request: &AgentRunRequest,
    ) -> Result<Response, CortexApiError> {
        let result = retry_with_backoff(self.retry_policy, || {
            let client = self;
            let request = request;
            async move {
                let response = client
                    .build_request(request)?
                    .send()
                    .await
                    .map_err(CortexApiError::from)?;

                let status = response.status();
                if status.is_success() {
                    return Ok(response);
                }

                let body = response.text().await.unwrap_or_default();
                Err(CortexApiError::Status(
                    status,
                    parse_error_message(status, &body),
                ))
            }
        })
        .await;

        result.map_err(|error| match error {
            RetryError::Timeout { elapsed } => CortexApiError::RetryTimeout { elapsed },
            RetryError::Operation(error) => error,
        })
    }

    /// Stream classified payloads to the caller in arrival order.
    ///
    /// The decode loop is a single sequential consumer of the response body;
    /// dropping the returned future cancels it, keeping already-dispatched
    /// blocks applied and discarding the dangling partial block. Malformed
    /// blocks are logged and skipped without aborting the stream.
    pub async fn stream_with_handler<F>(
        &self,
        request: &AgentRunRequest,
        mut on_payload: F,
    ) -> Result<(), CortexApiError>
    where
        F: FnMut(ClassifiedPayload),
    {
        let response = self.send_with_retry(request).await?;
        let mut bytes = response.bytes_stream();
        let mut decoder = SseFrameDecoder::default();

        while let Some(chunk) = bytes.next().await {
            let chunk = chunk.map_err(CortexApiError::from)?;
            for block in decoder.feed(&chunk) {
                dispatch_block(&block, &mut on_payload);
            }
        }

        // A final block not terminated by a blank line still counts.
        if let Some(block) = decoder.finish() {
            dispatch_block(&block, &mut on_payload);
        }

        Ok(())
    }

    /// Collect the whole stream into a payload list.
    pub async fn stream(
        &self,
        request: &AgentRunRequest,
    ) -> Result<Vec<ClassifiedPayload>, CortexApiError> {
        let mut payloads = Vec::new();
        self.stream_with_handler(request, |payload| payloads.push(payload))
            .await?;
        Ok(payloads)
    }
}

fn dispatch_block<F>(block: &str, on_payload: &mut F)
where
    F: FnMut(ClassifiedPayload),
{
    match classify_event_block(block) {
        Ok(payload) => on_payload(payload),
        Err(error) => warn!(%error, "skipping malformed event block"),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::CortexAgentClient;
    use crate::config::CortexApiConfig;
    use crate::error::CortexApiError;
    use crate::payload::AgentTurn;
    use crate::retry::RetryPolicy;

    fn test_config(base_url: &str) -> CortexApiConfig {
        CortexApiConfig::new("secret-token", base_url)
            .with_database("ANALYTICS_DB")
            .with_schema("PUBLIC")
            .with_agent("INGEST_AGENT")
            .with_warehouse("INGEST_WH")
    }

    fn fast_retry() -> RetryPolicy {
        RetryPolicy::default()
            .with_base_delay(Duration::from_millis(1))
            .with_max_attempts(3)
    }

    const RUN_PATH: &str = "/api/v2/databases/ANALYTICS_DB/schemas/PUBLIC/agents/INGEST_AGENT:run";

    #[test]
    fn run_request_carries_config_context() {
        let client = CortexAgentClient::new(test_config("https://acme.example.com"))
            .expect("client should build");
        let request = client.run_request(vec![AgentTurn::user("load orders.csv")]);

        assert_eq!(request.agent, "ANALYTICS_DB.PUBLIC.INGEST_AGENT");
        assert_eq!(request.context.warehouse, "INGEST_WH");
        assert!(request.options.allow_execution);
    }

    #[test]
    fn build_request_rejects_empty_base_url() {
        let client = CortexAgentClient::new(test_config("")).expect("client should build");
        let request = client.run_request(Vec::new());

        assert!(matches!(
            client.build_request(&request),
            Err(CortexApiError::InvalidEndpoint(_))
        ));
    }

    #[tokio::test]
    async fn stream_yields_classified_payloads_in_order() {
        let server = MockServer::start().await;
        let body = concat!(
            "data: {\"content\":[{\"type\":\"text\",\"text\":\"Hello\"}],\"author\":\"root_agent\"}\n\n",
            "data: {\"status\":\"running\",\"message\":\"splitting files\"}\n\n",
            "data: [DONE]\n\n",
        );
        Mock::given(method("POST"))
            .and(path(RUN_PATH))
            .and(header("accept", "text/event-stream"))
            .and(body_partial_json(serde_json::json!({
                "agent": "ANALYTICS_DB.PUBLIC.INGEST_AGENT",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .mount(&server)
            .await;

        let client = CortexAgentClient::new(test_config(&server.uri()))
            .expect("client should build");
        let request = client.run_request(vec![AgentTurn::user("load orders.csv")]);

        let payloads = client.stream(&request).await.expect("stream should succeed");
        assert_eq!(payloads.len(), 2);
        assert_eq!(payloads[0].text_parts, vec!["Hello"]);
        assert_eq!(payloads[0].agent.as_deref(), Some("root_agent"));
        let status = payloads[1].status.as_ref().expect("status payload");
        assert_eq!(status.message, "splitting files");
    }

    #[tokio::test]
    async fn malformed_blocks_are_skipped_without_aborting_the_stream() {
        let server = MockServer::start().await;
        let body = concat!(
            "data: {broken\n\n",
            "data: {\"content\":[{\"type\":\"text\",\"text\":\"after\"}]}\n\n",
        );
        Mock::given(method("POST"))
            .and(path(RUN_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .mount(&server)
            .await;

        let client = CortexAgentClient::new(test_config(&server.uri()))
            .expect("client should build");
        let request = client.run_request(Vec::new());

        let payloads = client.stream(&request).await.expect("stream should succeed");
        assert_eq!(payloads.len(), 1);
        assert_eq!(payloads[0].text_parts, vec!["after"]);
    }

    #[tokio::test]
    async fn transient_server_errors_are_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(RUN_PATH))
            .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(RUN_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("data: {\"content\":[{\"type\":\"text\",\"text\":\"ok\"}]}\n\n", "text/event-stream"),
            )
            .mount(&server)
            .await;

        let client = CortexAgentClient::new(test_config(&server.uri()))
            .expect("client should build")
            .with_retry_policy(fast_retry());
        let request = client.run_request(Vec::new());

        let payloads = client.stream(&request).await.expect("retry should recover");
        assert_eq!(payloads.len(), 1);
        assert_eq!(payloads[0].text_parts, vec!["ok"]);
    }

    #[tokio::test]
    async fn exhausted_retries_reraise_the_last_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(RUN_PATH))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_string(r#"{"message":"internal error","code":"390500"}"#),
            )
            .mount(&server)
            .await;

        let client = CortexAgentClient::new(test_config(&server.uri()))
            .expect("client should build")
            .with_retry_policy(fast_retry());
        let request = client.run_request(Vec::new());

        let error = client
            .stream(&request)
            .await
            .expect_err("exhausted retries must fail");
        assert!(
            matches!(error, CortexApiError::Status(status, ref message)
                if status.as_u16() == 500 && message.contains("internal error"))
        );
    }
}
