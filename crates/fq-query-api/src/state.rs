//! Shared application state for the Axum server.
//!
//! The store is either `PgStore` (production) or `MockStore` with canned
//! farm data (tests and development).

use std::sync::Arc;

use fq_nlu::{IntentClassifier, ZeroShotError};
use fq_sql_guard::{DataStore, MockStore, QueryValidator, SafeExecutor};

use crate::builder::TemplateQueryBuilder;
use crate::config::ApiConfig;
use crate::pipeline::QueryPipeline;

/// Shared application state, cheap to clone into handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<QueryPipeline>,
}

impl AppState {
    /// Wire classifier, builder, validator and store into a pipeline.
    pub fn new(
        classifier: IntentClassifier,
        validator: QueryValidator,
        store: Arc<dyn DataStore>,
    ) -> Self {
        let executor = SafeExecutor::new(store, validator);
        let pipeline = QueryPipeline::new(classifier, Arc::new(TemplateQueryBuilder::new()), executor);
        Self {
            pipeline: Arc::new(pipeline),
        }
    }

    /// Build state from configuration over the given store.
    pub fn from_config(config: &ApiConfig, store: Arc<dyn DataStore>) -> Result<Self, ZeroShotError> {
        let classifier = IntentClassifier::from_config(config.zero_shot.as_ref())?;
        Ok(Self::new(classifier, config.validator(), store))
    }

    /// Rules-only, AST-validated state over sample data.
    pub fn with_sample_data() -> Self {
        Self::new(
            IntentClassifier::rules_only(),
            QueryValidator::ast(),
            Arc::new(MockStore::with_sample_data()),
        )
    }
}
