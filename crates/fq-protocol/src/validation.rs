use serde::{Deserialize, Serialize};

/// Row cap applied to every statement that does not carry its own LIMIT.
pub const MAX_ROWS: u32 = 1000;

/// Outcome of validating a candidate SQL statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    /// Every violation found, in discovery order. Empty when valid.
    #[serde(default)]
    pub reasons: Vec<String>,
    /// Normalized statement safe to execute. Present only when valid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sanitized: Option<String>,
}

impl ValidationResult {
    pub fn accepted(sanitized: impl Into<String>) -> Self {
        Self {
            valid: true,
            reasons: Vec::new(),
            sanitized: Some(sanitized.into()),
        }
    }

    pub fn rejected(reasons: Vec<String>) -> Self {
        Self {
            valid: false,
            reasons,
            sanitized: None,
        }
    }

    /// Accept when no reasons were collected, otherwise reject with them.
    pub fn from_reasons(reasons: Vec<String>, sanitized: impl FnOnce() -> String) -> Self {
        if reasons.is_empty() {
            Self::accepted(sanitized())
        } else {
            Self::rejected(reasons)
        }
    }
}
