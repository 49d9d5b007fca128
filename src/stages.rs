use serde_json::Value;

/// Tool that signals source-file discovery finished.
pub const FILE_SPLIT_TOOL: &str = "FILE_SPLIT";

/// The tool whose stage depends on its `execute_copy` input.
const CODE_GENERATION_TOOL: &str = "INGESTION_CODE_GENERATION";

/// One step of the fixed ingestion pipeline, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    DataDiscovery,
    SchemaCheck,
    IngestionPlan,
    DataIngestion,
    DataQualityChecks,
    ReconciliationChecks,
    MetadataUpdates,
}

impl PipelineStage {
    pub const ALL: [PipelineStage; 7] = [
        Self::DataDiscovery,
        Self::SchemaCheck,
        Self::IngestionPlan,
        Self::DataIngestion,
        Self::DataQualityChecks,
        Self::ReconciliationChecks,
        Self::MetadataUpdates,
    ];

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::DataDiscovery => "Data Discovery",
            Self::SchemaCheck => "Schema Check",
            Self::IngestionPlan => "Ingestion Plan",
            Self::DataIngestion => "Data Ingestion",
            Self::DataQualityChecks => "Data Quality Checks",
            Self::ReconciliationChecks => "Reconciliation Checks",
            Self::MetadataUpdates => "Metadata Updates",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StageStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl StageStatus {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Failed => "Failed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageEntry {
    pub stage: PipelineStage,
    pub status: StageStatus,
}

/// Fixed ordered stage table; the stage set never changes after startup,
/// only statuses mutate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageTable {
    entries: Vec<StageEntry>,
}

impl Default for StageTable {
    fn default() -> Self {
        Self {
            entries: PipelineStage::ALL
                .iter()
                .map(|stage| StageEntry {
                    stage: *stage,
                    status: StageStatus::Pending,
                })
                .collect(),
        }
    }
}

impl StageTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn entries(&self) -> &[StageEntry] {
        &self.entries
    }

    #[must_use]
    pub fn status(&self, stage: PipelineStage) -> StageStatus {
        self.entries
            .iter()
            .find(|entry| entry.stage == stage)
            .map(|entry| entry.status)
            .unwrap_or_default()
    }

    pub fn set_status(&mut self, stage: PipelineStage, status: StageStatus) {
        for entry in &mut self.entries {
            if entry.stage == stage {
                entry.status = status;
            }
        }
    }

    pub fn reset(&mut self) {
        for entry in &mut self.entries {
            entry.status = StageStatus::Pending;
        }
    }
}

/// Map one observed tool invocation to its pipeline stage.
///
/// `INGESTION_CODE_GENERATION` is ambiguous between planning, schema
/// validation, and the copy itself; its `execute_copy` input disambiguates,
/// with the planning stage as the provisional default when absent.
#[must_use]
pub fn stage_for_tool(tool_name: &str, tool_input: Option<&Value>) -> Option<PipelineStage> {
    if tool_name == CODE_GENERATION_TOOL {
        return Some(
            match tool_input
                .and_then(|input| input.get("execute_copy"))
                .and_then(Value::as_bool)
            {
                Some(false) => PipelineStage::SchemaCheck,
                Some(true) => PipelineStage::DataIngestion,
                None => PipelineStage::IngestionPlan,
            },
        );
    }

    match tool_name {
        "Data_Discovery" | "DQ_DISCOVERY_API" => Some(PipelineStage::DataDiscovery),
        "Schema_Checker" | "HIL_INGESTION_CODE_GENERATORS_API1" | "INGESTION_CODE_GENERATORS_API" => {
            Some(PipelineStage::SchemaCheck)
        }
        "Ingestion_Planner" => Some(PipelineStage::IngestionPlan),
        "Ingestion_Executor" | "EXECUTION_ENGINE" | "EXECUTION_ENGINE_PREVIEW" => {
            Some(PipelineStage::DataIngestion)
        }
        "Quality_Checker" | "DQ_TABLE_CHECK_HIL" | "DQ_TABLE_CHECK2" => {
            Some(PipelineStage::DataQualityChecks)
        }
        "Reconciliation_Tool" | "DATA_RECONCILIATION" => Some(PipelineStage::ReconciliationChecks),
        "Metadata_Updater" | "Business_Glossary" | "BUSINESS_GLOSSARY" => {
            Some(PipelineStage::MetadataUpdates)
        }
        // BUSINESS_GLOSSARY_PY and FILE_SPLIT have no stage target of their own.
        _ => None,
    }
}
