use serde::{Deserialize, Serialize};

/// Speaker role for one transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One conversation message.
///
/// Messages are never deleted individually; assistant text is rewritten in
/// place as stream fragments accumulate, and the whole set is clearable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptMessage {
    pub id: String,
    pub role: Role,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub producing_agent: Option<String>,
    #[serde(default)]
    pub final_report: bool,
}

impl TranscriptMessage {
    #[must_use]
    pub fn user(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: Role::User,
            text: text.into(),
            producing_agent: None,
            final_report: false,
        }
    }

    #[must_use]
    pub fn assistant(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role: Role::Assistant,
            text: text.into(),
            producing_agent: None,
            final_report: false,
        }
    }

    /// Finalized assistant message carrying a composed report.
    #[must_use]
    pub fn finalized(
        id: impl Into<String>,
        text: impl Into<String>,
        producing_agent: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            role: Role::Assistant,
            text: text.into(),
            producing_agent,
            final_report: true,
        }
    }
}
