//! Mock data store for tests and development without PostgreSQL.
//!
//! Answers with canned rows keyed by a lower-case SQL fragment and records
//! every statement it receives.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Mutex;

use crate::error::StoreError;
use crate::store::DataStore;

/// In-memory `DataStore`. Results use the object-wrapper shape
/// `{ "rows": [...], "row_count": n }`.
pub struct MockStore {
    responses: Vec<(String, Value)>,
    failure: Option<String>,
    calls: Mutex<Vec<String>>,
}

impl MockStore {
    /// A store that answers every query with no rows.
    pub fn new() -> Self {
        Self {
            responses: Vec::new(),
            failure: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A store whose every query fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::new()
        }
    }

    /// Answer statements containing `fragment` (case-insensitive) with `rows`.
    /// Earlier registrations win.
    pub fn respond_to(mut self, fragment: &str, rows: Value) -> Self {
        self.responses.push((fragment.to_lowercase(), rows));
        self
    }

    /// Sample farm data for development mode.
    pub fn with_sample_data() -> Self {
        Self::new()
            .respond_to(
                "from harvests",
                json!([
                    {
                        "plot_id": 3,
                        "plot_name": "River Terrace",
                        "crop": "maize",
                        "expected_date": "2026-11-02",
                        "expected_yield_kg": 1800.0,
                        "outlook": "GOOD"
                    },
                    {
                        "plot_id": 5,
                        "plot_name": "Hillside",
                        "crop": "beans",
                        "expected_date": "2026-11-20",
                        "expected_yield_kg": 420.0,
                        "outlook": "AVERAGE"
                    }
                ]),
            )
            .respond_to(
                "group by t.status",
                json!([
                    { "status": "PENDING", "task_count": 4 },
                    { "status": "IN_PROGRESS", "task_count": 2 },
                    { "status": "COMPLETED", "task_count": 9 }
                ]),
            )
            .respond_to(
                "from tasks",
                json!([
                    {
                        "id": 11,
                        "title": "Spray coffee for leaf rust",
                        "status": "PENDING",
                        "priority": "HIGH",
                        "due_date": "2026-10-18",
                        "location": "Kirinyaga"
                    },
                    {
                        "id": 12,
                        "title": "Repair drip line",
                        "status": "PENDING",
                        "priority": "MEDIUM",
                        "due_date": "2026-10-21",
                        "location": "Kirinyaga"
                    }
                ]),
            )
            .respond_to(
                "from plots",
                json!([
                    {
                        "plot_id": 3,
                        "name": "River Terrace",
                        "crop": "maize",
                        "status": "PLANTED",
                        "area_acres": 2.5,
                        "farm_name": "Mwea Farm"
                    },
                    {
                        "plot_id": 4,
                        "name": "Upper Field",
                        "crop": null,
                        "status": "FALLOW",
                        "area_acres": 1.0,
                        "farm_name": "Mwea Farm"
                    }
                ]),
            )
            .respond_to(
                "from farms",
                json!([
                    {
                        "farm_id": 1,
                        "farm_name": "Mwea Farm",
                        "location": "Kirinyaga",
                        "health_status": "GOOD"
                    },
                    {
                        "farm_id": 2,
                        "farm_name": "Karatina Orchard",
                        "location": "Nyeri",
                        "health_status": "AVERAGE"
                    }
                ]),
            )
    }

    /// Every statement received, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Clear recorded statements.
    pub fn reset(&self) {
        self.calls.lock().unwrap().clear();
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DataStore for MockStore {
    async fn fetch(&self, sql: &str) -> Result<Value, StoreError> {
        self.calls.lock().unwrap().push(sql.to_string());

        if let Some(message) = &self.failure {
            return Err(StoreError::Connection(message.clone()));
        }

        let lower = sql.to_lowercase();
        let rows = self
            .responses
            .iter()
            .find(|(fragment, _)| lower.contains(fragment.as_str()))
            .map(|(_, rows)| rows.clone())
            .unwrap_or_else(|| json!([]));
        let row_count = rows.as_array().map_or(0, |r| r.len());

        Ok(json!({ "rows": rows, "row_count": row_count }))
    }
}
