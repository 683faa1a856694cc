//! Renders query results as a natural-language answer.
//!
//! Precedence: an error wins, then an override message (verbatim), then
//! UNKNOWN (fixed rephrase prompt), then the per-intent rule. Each rule has
//! its own empty-result wording, mentions only entities that were actually
//! extracted, and lists items inline only for short lists. Rows missing the
//! fields a rule needs are skipped; if none remain the empty wording is used.

use chrono::{DateTime, NaiveDate};
use serde_json::Value;

use fq_protocol::{EntityMap, HealthStatus, Intent, ResponseOptions, Row, TaskStatus};

/// Answer for questions the classifier could not place.
pub const REPHRASE_MESSAGE: &str = "I'm not sure how to answer that. Try rephrasing your \
     question, for example \"When is my next harvest?\" or \"What pending tasks do I have in \
     Kirinyaga?\"";

/// Lists longer than this are summarized by count only.
pub const INLINE_LIMIT: usize = 3;

/// Render the final answer text.
pub fn format_response(options: &ResponseOptions) -> String {
    if let Some(error) = &options.error {
        return format!(
            "Sorry, {}. Please try again later.",
            error.trim().trim_end_matches('.')
        );
    }
    if let Some(message) = &options.message {
        return message.clone();
    }

    let entities = &options.entities;
    let rows = &options.data;
    match options.intent {
        Intent::Unknown => REPHRASE_MESSAGE.to_string(),
        Intent::NextHarvest => next_harvest(entities, rows),
        Intent::TasksByLocation => tasks_by_location(entities, rows),
        Intent::PlotStatus => plot_status(entities, rows),
        Intent::Forecast => forecast(entities, rows),
        Intent::FarmHealth => farm_health(entities, rows),
        Intent::TaskSummary => task_summary(entities, rows),
    }
}

// ---------------------------------------------------------------------------
// Per-intent rules
// ---------------------------------------------------------------------------

fn next_harvest(entities: &EntityMap, rows: &[Row]) -> String {
    struct Harvest {
        what: String,
        date: String,
        yield_kg: Option<f64>,
    }

    let harvests: Vec<Harvest> = rows
        .iter()
        .filter_map(|row| {
            let date = date_field(row, "expected_date")?;
            let crop = text_field(row, "crop");
            let place = text_field(row, "plot_name")
                .or_else(|| number_field(row, "plot_id").map(|id| format!("plot {id}")));
            let what = match (crop, place) {
                (Some(crop), Some(place)) => format!("{crop} on {place}"),
                (Some(crop), None) => crop,
                (None, Some(place)) => format!("the crop on {place}"),
                (None, None) => "a harvest".to_string(),
            };
            Some(Harvest {
                what,
                date,
                yield_kg: number_field(row, "expected_yield_kg"),
            })
        })
        .collect();

    let scope = harvest_scope(entities);
    let Some((next, later)) = harvests.split_first() else {
        return format!("I couldn't find any upcoming harvest information{scope}.");
    };

    let mut text = format!("Your next harvest{scope} is {}, expected on {}", next.what, next.date);
    if let Some(kg) = next.yield_kg {
        text.push_str(&format!(" (about {} kg)", quantity(kg)));
    }
    text.push('.');

    if later.is_empty() {
        return text;
    }
    if harvests.len() <= INLINE_LIMIT {
        let items: Vec<String> = later
            .iter()
            .map(|h| format!("{} ({})", h.what, h.date))
            .collect();
        text.push_str(&format!(" Also coming up: {}.", join_inline(&items)));
    } else {
        text.push_str(&format!(
            " You have {} more {} scheduled after that.",
            later.len(),
            plural(later.len(), "harvest", "harvests")
        ));
    }
    text
}

fn tasks_by_location(entities: &EntityMap, rows: &[Row]) -> String {
    let tasks: Vec<String> = rows
        .iter()
        .filter_map(|row| {
            let title = text_field(row, "title")?;
            Some(match date_field(row, "due_date") {
                Some(due) => format!("{title} (due {due})"),
                None => title,
            })
        })
        .collect();

    let noun = task_noun(entities, tasks.len());
    let place = location_phrase(entities);
    if tasks.is_empty() {
        return format!("You have no {noun}{place}.");
    }

    let mut text = format!("You have {} {noun}{place}", tasks.len());
    if tasks.len() <= INLINE_LIMIT {
        text.push_str(&format!(": {}.", join_inline(&tasks)));
    } else {
        text.push('.');
    }
    text
}

fn task_summary(entities: &EntityMap, rows: &[Row]) -> String {
    let groups: Vec<(String, u64)> = rows
        .iter()
        .filter_map(|row| {
            let status = text_field(row, "status")?;
            let count = number_field(row, "task_count")?;
            Some((status_label(&status), count.max(0.0) as u64))
        })
        .filter(|(_, count)| *count > 0)
        .collect();

    let total: u64 = groups.iter().map(|(_, count)| count).sum();
    let scope = [location_phrase(entities), farm_phrase(entities)].concat();
    if total == 0 {
        return format!("You don't have any {}{scope}.", task_noun(entities, 2));
    }

    let total_usize = usize::try_from(total).unwrap_or(usize::MAX);
    let mut text = format!("You have {total} {}{scope}", task_noun(entities, total_usize));
    if groups.len() > 1 && groups.len() <= INLINE_LIMIT {
        let parts: Vec<String> = groups
            .iter()
            .map(|(label, count)| format!("{count} {label}"))
            .collect();
        text.push_str(&format!(": {}.", join_inline(&parts)));
    } else if groups.len() > INLINE_LIMIT {
        text.push_str(&format!(" across {} statuses.", groups.len()));
    } else {
        text.push('.');
    }
    text
}

fn plot_status(entities: &EntityMap, rows: &[Row]) -> String {
    struct Plot {
        id: Option<f64>,
        name: String,
        status: String,
        crop: Option<String>,
        acres: Option<f64>,
    }

    let plots: Vec<Plot> = rows
        .iter()
        .filter_map(|row| {
            let id = number_field(row, "plot_id");
            let name = text_field(row, "name").or_else(|| id.map(|id| format!("plot {id}")))?;
            Some(Plot {
                id,
                name,
                status: text_field(row, "status")?.to_lowercase().replace('_', " "),
                crop: text_field(row, "crop"),
                acres: number_field(row, "area_acres"),
            })
        })
        .collect();

    let scope = [location_phrase(entities), farm_phrase(entities)].concat();
    if plots.is_empty() {
        return match entities.plot_id {
            Some(id) => format!("I couldn't find plot {id}{scope}."),
            None => format!("I couldn't find any plots{scope}."),
        };
    }

    if let [plot] = plots.as_slice() {
        let heading = match (entities.plot_id.or(plot.id.map(|id| id as i64)), &plot.name) {
            (Some(id), name) if *name != format!("plot {id}") => format!("Plot {id} ({name})"),
            (Some(id), _) => format!("Plot {id}"),
            (None, name) => name.clone(),
        };
        let mut text = format!("{heading} is {}", plot.status);
        if let Some(crop) = &plot.crop {
            text.push_str(&format!(" with {crop}"));
        }
        if let Some(acres) = plot.acres {
            text.push_str(&format!(", covering {} acres", quantity(acres)));
        }
        text.push('.');
        return text;
    }

    let mut text = format!("You have {} plots{scope}", plots.len());
    if plots.len() <= INLINE_LIMIT {
        let items: Vec<String> = plots
            .iter()
            .map(|p| match &p.crop {
                Some(crop) => format!("{} ({}, {crop})", p.name, p.status),
                None => format!("{} ({})", p.name, p.status),
            })
            .collect();
        text.push_str(&format!(": {}.", join_inline(&items)));
    } else {
        let counts = tally(plots.iter().map(|p| p.status.clone()));
        let parts: Vec<String> = counts
            .iter()
            .map(|(status, n)| format!("{n} {status}"))
            .collect();
        text.push_str(&format!(": {}.", join_inline(&parts)));
    }
    text
}

fn forecast(entities: &EntityMap, rows: &[Row]) -> String {
    struct Expected {
        crop: String,
        date: String,
        yield_kg: Option<f64>,
        outlook: Option<HealthStatus>,
    }

    let expected: Vec<Expected> = rows
        .iter()
        .filter_map(|row| {
            Some(Expected {
                crop: text_field(row, "crop")?,
                date: date_field(row, "expected_date")?,
                yield_kg: number_field(row, "expected_yield_kg"),
                outlook: text_field(row, "outlook").and_then(|s| HealthStatus::parse(&s)),
            })
        })
        .collect();

    let window = match entities.months {
        Some(1) => " for the next month".to_string(),
        Some(n) => format!(" for the next {n} months"),
        None => String::new(),
    };
    let plot = entities
        .plot_id
        .map(|id| format!(" on plot {id}"))
        .unwrap_or_default();
    if expected.is_empty() {
        return format!("I don't have any harvest forecasts{plot}{window}.");
    }

    let total_kg: f64 = expected.iter().filter_map(|e| e.yield_kg).sum();
    let mut text = format!(
        "Forecast{plot}{window}: {} {} expected",
        expected.len(),
        plural(expected.len(), "harvest", "harvests")
    );
    if total_kg > 0.0 {
        text.push_str(&format!(", totalling about {} kg", quantity(total_kg)));
    }
    if expected.len() <= INLINE_LIMIT {
        let items: Vec<String> = expected
            .iter()
            .map(|e| match e.yield_kg {
                Some(kg) => format!("{} ({} kg, {})", e.crop, quantity(kg), e.date),
                None => format!("{} ({})", e.crop, e.date),
            })
            .collect();
        text.push_str(&format!(": {}.", join_inline(&items)));
    } else {
        text.push('.');
    }

    if let Some(worst) = expected.iter().filter_map(|e| e.outlook).min() {
        text.push(' ');
        text.push_str(match worst {
            HealthStatus::Poor => {
                "At least one crop has a poor outlook; check soil moisture and pest pressure \
                 now, before yields are lost."
            }
            HealthStatus::Average => {
                "Some crops have an average outlook; keep up weeding and top-dressing to \
                 protect yields."
            }
            HealthStatus::Good => {
                "The outlook is good; plan labour, transport and storage ahead of harvest."
            }
        });
    }
    text
}

fn farm_health(entities: &EntityMap, rows: &[Row]) -> String {
    let farms: Vec<(String, HealthStatus, Option<String>)> = rows
        .iter()
        .filter_map(|row| {
            let name = text_field(row, "farm_name")?;
            let health = text_field(row, "health_status").and_then(|s| HealthStatus::parse(&s))?;
            Some((name, health, text_field(row, "location")))
        })
        .collect();

    let place = location_phrase(entities);
    if farms.is_empty() {
        return match entities.health_status {
            Some(health) => format!("None of your farms{place} are in {} health.", health.label()),
            None => format!("I couldn't find any health records for your farms{place}."),
        };
    }

    let mut text = match farms.as_slice() {
        [(name, health, location)] => {
            let at = location
                .as_deref()
                .map(|l| format!(" in {}", title_case(l)))
                .unwrap_or_default();
            format!("{name}{at} is in {} health.", health.label())
        }
        _ if farms.len() <= INLINE_LIMIT => {
            let items: Vec<String> = farms
                .iter()
                .map(|(name, health, _)| format!("{name} ({})", health.label()))
                .collect();
            format!(
                "Health of your {} farms{place}: {}.",
                farms.len(),
                join_inline(&items)
            )
        }
        _ => {
            let mut by_health: Vec<HealthStatus> = farms.iter().map(|(_, h, _)| *h).collect();
            by_health.sort();
            let counts = tally(by_health.iter().map(|h| format!("in {} health", h.label())));
            let parts: Vec<String> = counts
                .iter()
                .map(|(label, n)| format!("{n} {label}"))
                .collect();
            format!(
                "You have {} farms{place}: {}.",
                farms.len(),
                join_inline(&parts)
            )
        }
    };

    if let Some(worst) = farms.iter().map(|(_, h, _)| *h).min() {
        text.push(' ');
        text.push_str(match worst {
            HealthStatus::Poor => {
                "Schedule a soil test and scout for pests and disease on the farms in poor \
                 health."
            }
            HealthStatus::Average => {
                "A soil test and a fertilizer plan could lift the farms in average health."
            }
            HealthStatus::Good => "Keep up your current practices.",
        });
    }
    text
}

// ---------------------------------------------------------------------------
// Entity phrases
// ---------------------------------------------------------------------------

fn location_phrase(entities: &EntityMap) -> String {
    entities
        .location
        .as_deref()
        .map(|l| format!(" in {}", title_case(l)))
        .unwrap_or_default()
}

fn farm_phrase(entities: &EntityMap) -> String {
    entities
        .farm_id
        .map(|id| format!(" on farm {id}"))
        .unwrap_or_default()
}

fn harvest_scope(entities: &EntityMap) -> String {
    match (entities.plot_id, entities.farm_id) {
        (Some(plot), _) => format!(" for plot {plot}"),
        (None, Some(farm)) => format!(" on farm {farm}"),
        (None, None) => String::new(),
    }
}

/// "pending high priority tasks", "task", ...
fn task_noun(entities: &EntityMap, count: usize) -> String {
    let mut words: Vec<&str> = Vec::new();
    if let Some(status) = entities.status {
        words.push(status.label());
    }
    if let Some(priority) = entities.priority {
        words.push(priority.label());
        words.push("priority");
    }
    words.push(plural(count, "task", "tasks"));
    words.join(" ")
}

fn status_label(code: &str) -> String {
    serde_json::from_value::<TaskStatus>(Value::String(code.to_uppercase()))
        .map(|s| s.label().to_string())
        .unwrap_or_else(|_| code.to_lowercase().replace('_', " "))
}

// ---------------------------------------------------------------------------
// Row access
// ---------------------------------------------------------------------------

fn text_field(row: &Row, key: &str) -> Option<String> {
    match row.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn number_field(row: &Row, key: &str) -> Option<f64> {
    match row.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Dates render as "November 2, 2026"; unparseable values pass through.
fn date_field(row: &Row, key: &str) -> Option<String> {
    let raw = text_field(row, key)?;
    let date = NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(&raw).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            raw.get(..10)
                .and_then(|head| NaiveDate::parse_from_str(head, "%Y-%m-%d").ok())
        });
    Some(match date {
        Some(date) => date.format("%B %-d, %Y").to_string(),
        None => raw,
    })
}

// ---------------------------------------------------------------------------
// Text helpers
// ---------------------------------------------------------------------------

fn plural<'a>(count: usize, one: &'a str, many: &'a str) -> &'a str {
    if count == 1 { one } else { many }
}

/// "a", "a and b", "a, b and c".
fn join_inline(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [only] => only.clone(),
        [head @ .., last] => format!("{} and {last}", head.join(", ")),
    }
}

/// Counts per label, in first-seen order.
fn tally(labels: impl Iterator<Item = String>) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for label in labels {
        match counts.iter_mut().find(|(l, _)| *l == label) {
            Some((_, n)) => *n += 1,
            None => counts.push((label, 1)),
        }
    }
    counts
}

/// Whole numbers with thousands separators, one decimal below 10.
fn quantity(value: f64) -> String {
    if value.abs() < 10.0 && value.fract() != 0.0 {
        return format!("{value:.1}");
    }
    let whole = value.round() as i64;
    let digits = whole.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if whole < 0 {
        grouped.insert(0, '-');
    }
    grouped
}

fn title_case(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
