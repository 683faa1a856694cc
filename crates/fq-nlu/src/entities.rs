//! Entity extraction: pulls ids, place names, codes and time windows out
//! of question text.
//!
//! Every field is first-match-wins over an ordered list of patterns. A field
//! with no match is left as `None`; extraction never fails.

use regex::Regex;
use std::sync::LazyLock;

use fq_protocol::{EntityMap, HealthStatus, Intent, Priority, TaskStatus};

/// Known place names, lower-case. Also used by the rule table.
pub const GAZETTEER: &[&str] = &[
    "kirinyaga",
    "nyeri",
    "murang'a",
    "muranga",
    "kiambu",
    "meru",
    "embu",
    "nakuru",
    "nyandarua",
    "laikipia",
    "machakos",
    "makueni",
    "kisumu",
    "kericho",
    "bomet",
    "eldoret",
    "kitale",
    "naivasha",
    "thika",
    "karatina",
    "nairobi",
];

/// Task status vocabulary, checked in order.
const TASK_STATUS_VOCAB: &[(&str, TaskStatus)] = &[
    ("in progress", TaskStatus::InProgress),
    ("in-progress", TaskStatus::InProgress),
    ("ongoing", TaskStatus::InProgress),
    ("not started", TaskStatus::Pending),
    ("pending", TaskStatus::Pending),
    ("outstanding", TaskStatus::Pending),
    ("completed", TaskStatus::Completed),
    ("finished", TaskStatus::Completed),
    ("done", TaskStatus::Completed),
    ("cancelled", TaskStatus::Cancelled),
    ("canceled", TaskStatus::Cancelled),
];

/// Priority vocabulary. Bare "high"/"low" are left out: they collide with
/// "highlands", "follow", "below".
const PRIORITY_VOCAB: &[(&str, Priority)] = &[
    ("urgent", Priority::Urgent),
    ("high priority", Priority::High),
    ("high-priority", Priority::High),
    ("important", Priority::High),
    ("medium priority", Priority::Medium),
    ("medium-priority", Priority::Medium),
    ("low priority", Priority::Low),
    ("low-priority", Priority::Low),
];

const HEALTH_VOCAB: &[(&str, HealthStatus)] = &[
    ("unhealthy", HealthStatus::Poor),
    ("poor", HealthStatus::Poor),
    ("bad", HealthStatus::Poor),
    ("average", HealthStatus::Average),
    ("fair", HealthStatus::Average),
    ("good", HealthStatus::Good),
    ("excellent", HealthStatus::Good),
];

// "farm id: 12" / "farm id 12", then "farm #12", then "farm 12".
static FARM_ID: LazyLock<Vec<Regex>> = LazyLock::new(|| id_patterns("farm"));
static PLOT_ID: LazyLock<Vec<Regex>> = LazyLock::new(|| id_patterns("plot"));

// (pattern, days per unit divisor); months pass through unchanged.
static TIME_WINDOW: LazyLock<Vec<(Regex, u64)>> = LazyLock::new(|| {
    vec![
        (Regex::new(r"\b(\d+)\s*days?\b").unwrap(), 30),
        (Regex::new(r"\b(\d+)\s*weeks?\b").unwrap(), 4),
        (Regex::new(r"\b(\d+)\s*months?\b").unwrap(), 1),
    ]
});

fn id_patterns(kind: &str) -> Vec<Regex> {
    [
        format!(r"\b{kind}\s+id\s*[:#]?\s*(\d+)\b"),
        format!(r"\b{kind}\s*#\s*(\d+)\b"),
        format!(r"\b{kind}\s+(\d+)\b"),
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
}

/// Extract entities from a question, scoped by the classified intent.
pub fn extract(question: &str, intent: Intent) -> EntityMap {
    let lower = question.to_lowercase();
    let text = lower.as_str();

    let mut entities = EntityMap {
        farm_id: first_id(&FARM_ID, text),
        plot_id: first_id(&PLOT_ID, text),
        location: find_location(text).map(str::to_string),
        months: time_window_months(text),
        ..Default::default()
    };

    if intent.is_task_oriented() {
        entities.status = first_in_vocab(text, TASK_STATUS_VOCAB);
        entities.priority = first_in_vocab(text, PRIORITY_VOCAB);
    }
    if intent == Intent::FarmHealth {
        entities.health_status = first_in_vocab(text, HEALTH_VOCAB);
    }

    entities
}

fn first_id(patterns: &[Regex], text: &str) -> Option<i64> {
    patterns
        .iter()
        .find_map(|re| re.captures(text))
        .and_then(|caps| caps[1].parse().ok())
}

/// Gazetteer entry occurring earliest in the text; gazetteer order breaks ties.
pub fn find_location(text: &str) -> Option<&'static str> {
    GAZETTEER
        .iter()
        .filter_map(|place| text.find(place).map(|pos| (pos, *place)))
        .min_by_key(|(pos, _)| *pos)
        .map(|(_, place)| place)
}

fn first_in_vocab<T: Copy>(text: &str, vocab: &[(&str, T)]) -> Option<T> {
    vocab
        .iter()
        .find(|(word, _)| text.contains(word))
        .map(|(_, value)| *value)
}

/// Normalize the first matching day/week/month window to whole months.
fn time_window_months(text: &str) -> Option<u32> {
    TIME_WINDOW.iter().find_map(|(re, divisor)| {
        let caps = re.captures(text)?;
        let n: u64 = caps[1].parse().ok()?;
        n.div_ceil(*divisor).try_into().ok()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn farm_id_surface_forms() {
        for q in [
            "show farm 7",
            "show farm id: 7",
            "show farm #7",
            "Farm ID 7 please",
            "how is FARM # 7 doing",
        ] {
            assert_eq!(extract(q, Intent::FarmHealth).farm_id, Some(7), "{q}");
        }
    }

    #[test]
    fn id_form_takes_priority() {
        // "farm id: 12" wins over the later bare "farm 3".
        let entities = extract("compare farm 3 with farm id: 12", Intent::FarmHealth);
        assert_eq!(entities.farm_id, Some(12));
    }

    #[test]
    fn farm_and_plot_are_independent() {
        let entities = extract("status of plot #4 on farm 2", Intent::PlotStatus);
        assert_eq!(entities.farm_id, Some(2));
        assert_eq!(entities.plot_id, Some(4));
    }

    #[test]
    fn no_entities_yields_empty_map() {
        assert!(extract("When is my next harvest?", Intent::NextHarvest).is_empty());
        assert!(extract("", Intent::Unknown).is_empty());
    }

    #[test]
    fn oversized_id_is_absent() {
        let entities = extract("farm 99999999999999999999999", Intent::FarmHealth);
        assert_eq!(entities.farm_id, None);
    }

    #[test]
    fn location_case_insensitive() {
        let entities = extract("Tasks in KIRINYAGA", Intent::TasksByLocation);
        assert_eq!(entities.location.as_deref(), Some("kirinyaga"));
    }

    #[test]
    fn earliest_location_wins() {
        assert_eq!(find_location("from nakuru to kirinyaga"), Some("nakuru"));
        assert_eq!(find_location("from kirinyaga to nakuru"), Some("kirinyaga"));
        assert_eq!(find_location("mombasa"), None);
    }

    #[test]
    fn task_status_only_for_task_intents() {
        let q = "What pending tasks do I have in Kirinyaga?";
        let entities = extract(q, Intent::TasksByLocation);
        assert_eq!(entities.status, Some(TaskStatus::Pending));
        assert_eq!(entities.location.as_deref(), Some("kirinyaga"));
        assert_eq!(entities.priority, None);

        let entities = extract(q, Intent::NextHarvest);
        assert_eq!(entities.status, None);
    }

    #[test]
    fn in_progress_beats_pending_order() {
        let entities = extract("tasks in progress", Intent::TaskSummary);
        assert_eq!(entities.status, Some(TaskStatus::InProgress));
    }

    #[test]
    fn priority_phrases() {
        let entities = extract("show urgent tasks", Intent::TaskSummary);
        assert_eq!(entities.priority, Some(Priority::Urgent));
        let entities = extract("any high priority tasks?", Intent::TaskSummary);
        assert_eq!(entities.priority, Some(Priority::High));
        let entities = extract("tasks to follow up in the highlands", Intent::TaskSummary);
        assert_eq!(entities.priority, None);
    }

    #[test]
    fn health_status_scoped_to_farm_health() {
        let entities = extract("which farms are in poor health", Intent::FarmHealth);
        assert_eq!(entities.health_status, Some(HealthStatus::Poor));

        let entities = extract("good tasks for today", Intent::TaskSummary);
        assert_eq!(entities.health_status, None);
    }

    #[test]
    fn time_window_days_round_up() {
        assert_eq!(time_window_months("in the next 45 days"), Some(2));
        assert_eq!(time_window_months("in the next 30 days"), Some(1));
        assert_eq!(time_window_months("within 1 day"), Some(1));
    }

    #[test]
    fn time_window_weeks_round_up() {
        assert_eq!(time_window_months("next 6 weeks"), Some(2));
        assert_eq!(time_window_months("next 8 weeks"), Some(2));
    }

    #[test]
    fn time_window_months_unchanged() {
        assert_eq!(time_window_months("next 3 months"), Some(3));
        assert_eq!(time_window_months("next 1 month"), Some(1));
    }

    #[test]
    fn time_window_days_checked_before_months() {
        // Only the first matching unit pattern is used.
        assert_eq!(time_window_months("3 months or 10 days"), Some(1));
    }

    #[test]
    fn time_window_absent() {
        assert_eq!(time_window_months("next month"), None);
    }
}
