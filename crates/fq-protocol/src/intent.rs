use serde::{Deserialize, Serialize};

use crate::entities::EntityMap;

/// Kind of farm-data question the user asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intent {
    /// "When is my next harvest?"
    NextHarvest,
    /// "What pending tasks do I have in Kirinyaga?"
    TasksByLocation,
    /// "What's the status of plot 4?"
    PlotStatus,
    /// "How much maize will I harvest in the next 3 months?"
    Forecast,
    /// "How healthy is farm 2?"
    FarmHealth,
    /// "Give me a summary of my tasks."
    TaskSummary,
    /// Nothing scored above the confidence floor.
    Unknown,
}

impl Intent {
    /// All answerable intents, in rule-table order.
    pub const KNOWN: [Intent; 6] = [
        Intent::NextHarvest,
        Intent::TasksByLocation,
        Intent::PlotStatus,
        Intent::Forecast,
        Intent::FarmHealth,
        Intent::TaskSummary,
    ];

    /// Wire name, e.g. `NEXT_HARVEST`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::NextHarvest => "NEXT_HARVEST",
            Intent::TasksByLocation => "TASKS_BY_LOCATION",
            Intent::PlotStatus => "PLOT_STATUS",
            Intent::Forecast => "FORECAST",
            Intent::FarmHealth => "FARM_HEALTH",
            Intent::TaskSummary => "TASK_SUMMARY",
            Intent::Unknown => "UNKNOWN",
        }
    }

    /// Task-oriented intents are the only ones that read task status and priority.
    pub fn is_task_oriented(&self) -> bool {
        matches!(self, Intent::TasksByLocation | Intent::TaskSummary)
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which classifier tier produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierTier {
    /// Local weighted rule table.
    Rules,
    /// Remote zero-shot classifier.
    Remote,
}

/// Classified intent plus the entities extracted under that intent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentResult {
    pub intent: Intent,
    #[serde(default)]
    pub entities: EntityMap,
    /// Summed rule weight (rules tier) or remote score (remote tier).
    /// Only meaningful relative to the classification threshold.
    pub confidence: f64,
    pub tier: ClassifierTier,
}

impl IntentResult {
    /// The UNKNOWN result produced when nothing clears the threshold.
    pub fn unknown(confidence: f64, tier: ClassifierTier) -> Self {
        Self {
            intent: Intent::Unknown,
            entities: EntityMap::default(),
            confidence,
            tier,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intent_serialization() {
        let json = serde_json::to_string(&Intent::TasksByLocation).unwrap();
        assert_eq!(json, r#""TASKS_BY_LOCATION""#);
        let back: Intent = serde_json::from_str(r#""NEXT_HARVEST""#).unwrap();
        assert_eq!(back, Intent::NextHarvest);
    }

    #[test]
    fn as_str_matches_serde() {
        for intent in Intent::KNOWN.iter().chain([Intent::Unknown].iter()) {
            let json = serde_json::to_string(intent).unwrap();
            assert_eq!(json.trim_matches('"'), intent.as_str());
        }
    }

    #[test]
    fn task_oriented_family() {
        assert!(Intent::TasksByLocation.is_task_oriented());
        assert!(Intent::TaskSummary.is_task_oriented());
        assert!(!Intent::FarmHealth.is_task_oriented());
        assert!(!Intent::NextHarvest.is_task_oriented());
    }

    #[test]
    fn tier_serialization() {
        assert_eq!(
            serde_json::to_string(&ClassifierTier::Remote).unwrap(),
            r#""remote""#
        );
    }

    #[test]
    fn unknown_result_has_no_entities() {
        let result = IntentResult::unknown(0.2, ClassifierTier::Rules);
        assert_eq!(result.intent, Intent::Unknown);
        assert!(result.entities.is_empty());
    }
}
