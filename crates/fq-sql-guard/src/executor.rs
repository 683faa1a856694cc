//! Safe executor: re-validates every statement before it reaches a store.

use std::sync::Arc;

use fq_protocol::{ExecutionResult, Row};

use crate::error::{ExecutionError, ExecutionOutcome};
use crate::store::{DataStore, normalize_rows};
use crate::validator::QueryValidator;

/// Runs statements against a store only after they pass validation.
///
/// Every call re-validates; a previous validation is never trusted.
#[derive(Clone)]
pub struct SafeExecutor {
    store: Arc<dyn DataStore>,
    validator: QueryValidator,
}

impl SafeExecutor {
    pub fn new(store: Arc<dyn DataStore>, validator: QueryValidator) -> Self {
        Self { store, validator }
    }

    pub fn validator(&self) -> &QueryValidator {
        &self.validator
    }

    /// Validate and run `sql`, returning typed failures.
    pub async fn run(&self, sql: &str, user_id: Option<i64>) -> ExecutionOutcome<Vec<Row>> {
        let validation = self.validator.validate(sql, user_id);
        let sanitized = match validation.sanitized {
            Some(sanitized) if validation.valid => sanitized,
            _ => {
                tracing::warn!(reasons = ?validation.reasons, "query rejected by validator");
                return Err(ExecutionError::Rejected {
                    reasons: validation.reasons,
                });
            }
        };

        if !sanitized
            .trim_start()
            .get(..6)
            .is_some_and(|head| head.eq_ignore_ascii_case("select"))
        {
            tracing::error!(sql = %sanitized, "validated statement is not a SELECT");
            return Err(ExecutionError::NotSelect);
        }

        let raw = self.store.fetch(&sanitized).await.map_err(|e| {
            tracing::error!(error = %e, "query execution failed");
            ExecutionError::Store
        })?;

        let rows = normalize_rows(raw).map_err(|e| {
            tracing::error!(error = %e, "store returned an unusable result");
            ExecutionError::Store
        })?;

        tracing::debug!(rows = rows.len(), "query executed");
        Ok(rows)
    }

    /// Validate and run `sql`, folding failures into an `ExecutionResult`.
    pub async fn execute(&self, sql: &str, user_id: Option<i64>) -> ExecutionResult {
        match self.run(sql, user_id).await {
            Ok(rows) => ExecutionResult::Rows(rows),
            Err(e) => ExecutionResult::Failed(e.to_string()),
        }
    }
}
