use std::collections::BTreeMap;
use std::time::Duration;

/// Transport configuration for Cortex agent run requests.
#[derive(Debug, Clone)]
pub struct CortexApiConfig {
    /// Bearer token passed to `Authorization`.
    pub access_token: String,
    /// Account base URL, e.g. `https://acme.snowflakecomputing.com`.
    pub base_url: String,
    /// Database holding the agent.
    pub database: String,
    /// Schema holding the agent.
    pub schema: String,
    /// Agent object name.
    pub agent: String,
    /// Warehouse the agent executes against.
    pub warehouse: String,
    /// Whether the agent may execute generated statements.
    pub allow_execution: bool,
    /// Optional request timeout.
    pub timeout: Option<Duration>,
    /// Additional headers merged into request headers.
    pub extra_headers: BTreeMap<String, String>,
}

impl Default for CortexApiConfig {
    fn default() -> Self {
        Self {
            access_token: String::new(),
            base_url: String::new(),
            database: String::new(),
            schema: String::new(),
            agent: String::new(),
            warehouse: String::new(),
            allow_execution: true,
            timeout: None,
            extra_headers: BTreeMap::new(),
        }
    }
}

impl CortexApiConfig {
    pub fn new(access_token: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    pub fn with_agent(mut self, agent: impl Into<String>) -> Self {
        self.agent = agent.into();
        self
    }

    pub fn with_warehouse(mut self, warehouse: impl Into<String>) -> Self {
        self.warehouse = warehouse.into();
        self
    }

    pub fn with_allow_execution(mut self, allow_execution: bool) -> Self {
        self.allow_execution = allow_execution;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn insert_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.insert(key.into(), value.into());
        self
    }

    /// Fully qualified agent name, `DATABASE.SCHEMA.AGENT`.
    pub fn qualified_agent_name(&self) -> String {
        format!("{}.{}.{}", self.database, self.schema, self.agent)
    }
}
