//! The result envelope every query command emits (spec §6.2).

use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct QueryEnvelope {
    pub command: String,
    pub results: serde_json::Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QueryEnvelope {
    pub fn ok(command: impl Into<String>, results: impl Serialize, total_count: Option<usize>) -> Self {
        Self {
            command: command.into(),
            results: serde_json::to_value(results).unwrap_or(serde_json::Value::Null),
            total_count,
            error: None,
        }
    }

    pub fn err(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            results: serde_json::Value::Null,
            total_count: None,
            error: Some(message.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
