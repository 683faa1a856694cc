use serde::{Deserialize, Serialize};

/// A single result row: column name → value.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Outcome of running a statement through the safe executor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ExecutionResult {
    Rows(Vec<Row>),
    Failed(String),
}

impl ExecutionResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, ExecutionResult::Rows(_))
    }

    pub fn rows(&self) -> Option<&[Row]> {
        match self {
            ExecutionResult::Rows(rows) => Some(rows),
            ExecutionResult::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            ExecutionResult::Rows(_) => None,
            ExecutionResult::Failed(msg) => Some(msg),
        }
    }
}
