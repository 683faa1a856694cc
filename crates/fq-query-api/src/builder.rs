//! Turns a classified question into a single user-scoped SELECT.
//!
//! Assumed schema:
//! - `farms(id, name, location, health_status, owner_id)`
//! - `plots(id, farm_id, name, crop, status, area_acres)`
//! - `tasks(id, farm_id, plot_id, title, status, priority, due_date, creator_id, assignee_id)`
//! - `harvests(id, plot_id, crop, expected_date, expected_yield_kg, outlook, creator_id)`
//!
//! The user id is inlined as a literal equality on an ownership column so the
//! AST policy can prove scoping. Entity values are either integers or
//! quote-escaped string literals.

use fq_protocol::{EntityMap, Intent};

/// Produces SQL for an (intent, entities, user) triple.
pub trait QueryBuilder: Send + Sync {
    /// Returns `None` when the intent has no query (UNKNOWN).
    fn build(&self, intent: Intent, entities: &EntityMap, user_id: i64) -> Option<String>;
}

/// Fixed SQL template per intent.
#[derive(Debug, Clone, Default)]
pub struct TemplateQueryBuilder;

impl TemplateQueryBuilder {
    pub fn new() -> Self {
        Self
    }
}

impl QueryBuilder for TemplateQueryBuilder {
    fn build(&self, intent: Intent, entities: &EntityMap, user_id: i64) -> Option<String> {
        let sql = match intent {
            Intent::NextHarvest => {
                let mut filters = vec![
                    format!("h.creator_id = {user_id}"),
                    "h.expected_date >= CURRENT_DATE".to_string(),
                ];
                if let Some(plot_id) = entities.plot_id {
                    filters.push(format!("h.plot_id = {plot_id}"));
                }
                if let Some(farm_id) = entities.farm_id {
                    filters.push(format!("p.farm_id = {farm_id}"));
                }
                format!(
                    "SELECT h.plot_id, p.name AS plot_name, h.crop, h.expected_date, h.expected_yield_kg \
                     FROM harvests AS h JOIN plots AS p ON p.id = h.plot_id \
                     WHERE {} ORDER BY h.expected_date ASC LIMIT 5",
                    filters.join(" AND ")
                )
            }
            Intent::TasksByLocation => format!(
                "SELECT t.id, t.title, t.status, t.priority, t.due_date, f.location \
                 FROM tasks AS t JOIN farms AS f ON f.id = t.farm_id \
                 WHERE {} ORDER BY t.due_date ASC",
                task_filters(entities, user_id).join(" AND ")
            ),
            Intent::TaskSummary => format!(
                "SELECT t.status, COUNT(*) AS task_count \
                 FROM tasks AS t JOIN farms AS f ON f.id = t.farm_id \
                 WHERE {} GROUP BY t.status ORDER BY t.status",
                task_filters(entities, user_id).join(" AND ")
            ),
            Intent::PlotStatus => {
                let mut filters = vec![format!("f.owner_id = {user_id}")];
                if let Some(plot_id) = entities.plot_id {
                    filters.push(format!("p.id = {plot_id}"));
                }
                if let Some(farm_id) = entities.farm_id {
                    filters.push(format!("p.farm_id = {farm_id}"));
                }
                if let Some(location) = &entities.location {
                    filters.push(location_filter("f.location", location));
                }
                format!(
                    "SELECT p.id AS plot_id, p.name, p.crop, p.status, p.area_acres, f.name AS farm_name \
                     FROM plots AS p JOIN farms AS f ON f.id = p.farm_id \
                     WHERE {} ORDER BY p.id ASC",
                    filters.join(" AND ")
                )
            }
            Intent::Forecast => {
                let mut filters = vec![
                    format!("h.creator_id = {user_id}"),
                    "h.expected_date >= CURRENT_DATE".to_string(),
                ];
                if let Some(months) = entities.months {
                    filters.push(format!(
                        "h.expected_date < CURRENT_DATE + INTERVAL '{months} months'"
                    ));
                }
                if let Some(plot_id) = entities.plot_id {
                    filters.push(format!("h.plot_id = {plot_id}"));
                }
                format!(
                    "SELECT h.crop, h.expected_date, h.expected_yield_kg, h.outlook \
                     FROM harvests AS h WHERE {} ORDER BY h.expected_date ASC",
                    filters.join(" AND ")
                )
            }
            Intent::FarmHealth => {
                let mut filters = vec![format!("f.owner_id = {user_id}")];
                if let Some(farm_id) = entities.farm_id {
                    filters.push(format!("f.id = {farm_id}"));
                }
                if let Some(location) = &entities.location {
                    filters.push(location_filter("f.location", location));
                }
                if let Some(health) = entities.health_status {
                    filters.push(format!("f.health_status = '{}'", health.code()));
                }
                format!(
                    "SELECT f.id AS farm_id, f.name AS farm_name, f.location, f.health_status \
                     FROM farms AS f WHERE {} ORDER BY f.name ASC",
                    filters.join(" AND ")
                )
            }
            Intent::Unknown => return None,
        };
        Some(sql)
    }
}

fn task_filters(entities: &EntityMap, user_id: i64) -> Vec<String> {
    let mut filters = vec![format!(
        "(t.creator_id = {user_id} OR t.assignee_id = {user_id})"
    )];
    if let Some(location) = &entities.location {
        filters.push(location_filter("f.location", location));
    }
    if let Some(status) = entities.status {
        filters.push(format!("t.status = '{}'", status.code()));
    }
    if let Some(priority) = entities.priority {
        filters.push(format!("t.priority = '{}'", priority.code()));
    }
    if let Some(farm_id) = entities.farm_id {
        filters.push(format!("t.farm_id = {farm_id}"));
    }
    if let Some(plot_id) = entities.plot_id {
        filters.push(format!("t.plot_id = {plot_id}"));
    }
    filters
}

fn location_filter(column: &str, location: &str) -> String {
    format!("{column} ILIKE '%{}%'", location.replace('\'', "''"))
}
