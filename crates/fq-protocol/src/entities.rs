use serde::{Deserialize, Serialize};

/// Task workflow status as stored in the `tasks.status` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl TaskStatus {
    /// Database code, e.g. `IN_PROGRESS`.
    pub fn code(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Completed => "COMPLETED",
            TaskStatus::Cancelled => "CANCELLED",
        }
    }

    /// Phrase used in answers, e.g. "in progress".
    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Cancelled => "cancelled",
        }
    }
}

/// Task priority as stored in the `tasks.priority` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub fn code(&self) -> &'static str {
        match self {
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
            Priority::Urgent => "URGENT",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }
}

/// Farm health assessment as stored in the `farms.health_status` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthStatus {
    Poor,
    Average,
    Good,
}

impl HealthStatus {
    pub fn code(&self) -> &'static str {
        match self {
            HealthStatus::Poor => "POOR",
            HealthStatus::Average => "AVERAGE",
            HealthStatus::Good => "GOOD",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            HealthStatus::Poor => "poor",
            HealthStatus::Average => "average",
            HealthStatus::Good => "good",
        }
    }

    /// Parse a database or model value case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "POOR" => Some(HealthStatus::Poor),
            "AVERAGE" => Some(HealthStatus::Average),
            "GOOD" => Some(HealthStatus::Good),
            _ => None,
        }
    }
}

/// Structured values pulled out of a question.
///
/// Every slot is optional; `None` means "not specified", never a default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMap {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub farm_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plot_id: Option<i64>,
    /// Lower-case gazetteer name, e.g. `kirinyaga`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_status: Option<HealthStatus>,
    /// Time window normalized to whole months.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub months: Option<u32>,
}

impl EntityMap {
    pub fn is_empty(&self) -> bool {
        *self == EntityMap::default()
    }
}
