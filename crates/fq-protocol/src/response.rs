use serde::{Deserialize, Serialize};

use crate::entities::EntityMap;
use crate::execution::Row;
use crate::intent::Intent;

/// Everything the response formatter needs to render an answer.
///
/// Precedence when rendering: `error`, then `message`, then `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseOptions {
    pub intent: Intent,
    #[serde(default)]
    pub entities: EntityMap,
    #[serde(default)]
    pub data: Vec<Row>,
    /// Returned verbatim when set and no error is present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResponseOptions {
    pub fn with_data(intent: Intent, entities: EntityMap, data: Vec<Row>) -> Self {
        Self {
            intent,
            entities,
            data,
            message: None,
            error: None,
        }
    }

    pub fn with_error(intent: Intent, entities: EntityMap, error: impl Into<String>) -> Self {
        Self {
            intent,
            entities,
            data: Vec::new(),
            message: None,
            error: Some(error.into()),
        }
    }

    pub fn with_message(intent: Intent, entities: EntityMap, message: impl Into<String>) -> Self {
        Self {
            intent,
            entities,
            data: Vec::new(),
            message: Some(message.into()),
            error: None,
        }
    }
}
