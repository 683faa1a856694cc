//! Question answering pipeline.
//!
//! classify (intent + entities) → build SQL → validate + execute → format.
//! Every stage returns a value; failures short-circuit into an error-shaped
//! `ResponseOptions` so the caller always gets answer text.

use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use fq_nlu::IntentClassifier;
use fq_protocol::{ClassifierTier, EntityMap, Intent, IntentResult, ResponseOptions};
use fq_sql_guard::{ExecutionError, SafeExecutor};

use crate::builder::QueryBuilder;
use crate::formatter::format_response;

/// Shown when validation refuses the generated statement.
pub const QUERY_REJECTED: &str = "I couldn't process that query";

/// Shown when the store fails.
pub const DATA_UNAVAILABLE: &str = "I couldn't reach your farm records right now";

/// Shown when a question needs data but no user id was supplied.
pub const IDENTITY_REQUIRED: &str = "I need to know who you are before I can look up farm data";

/// A rendered answer plus its diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub query_id: Uuid,
    pub text: String,
    pub intent: Intent,
    pub entities: EntityMap,
    pub confidence: f64,
    pub tier: ClassifierTier,
}

pub struct QueryPipeline {
    classifier: IntentClassifier,
    builder: Arc<dyn QueryBuilder>,
    executor: SafeExecutor,
}

impl QueryPipeline {
    pub fn new(
        classifier: IntentClassifier,
        builder: Arc<dyn QueryBuilder>,
        executor: SafeExecutor,
    ) -> Self {
        Self {
            classifier,
            builder,
            executor,
        }
    }

    pub fn executor(&self) -> &SafeExecutor {
        &self.executor
    }

    pub fn has_remote_classifier(&self) -> bool {
        self.classifier.has_remote()
    }

    /// Classify without touching the store.
    pub async fn classify(&self, question: &str) -> IntentResult {
        self.classifier.classify(question).await
    }

    /// Answer a question for `user_id`.
    pub async fn answer(&self, question: &str, user_id: Option<i64>) -> Answer {
        let query_id = Uuid::now_v7();
        let result = self.classify(question).await;
        tracing::info!(
            query_id = %query_id,
            intent = %result.intent,
            confidence = result.confidence,
            tier = ?result.tier,
            "question classified"
        );

        let options = self.respond(&result, user_id).await;
        let text = format_response(&options);

        Answer {
            query_id,
            text,
            intent: result.intent,
            entities: result.entities,
            confidence: result.confidence,
            tier: result.tier,
        }
    }

    async fn respond(&self, result: &IntentResult, user_id: Option<i64>) -> ResponseOptions {
        let intent = result.intent;
        let entities = result.entities.clone();

        if intent == Intent::Unknown {
            return ResponseOptions::with_data(intent, entities, Vec::new());
        }

        let Some(user_id) = user_id else {
            tracing::warn!(intent = %intent, "question needs data but no user id was supplied");
            return ResponseOptions::with_error(intent, entities, IDENTITY_REQUIRED);
        };

        let Some(sql) = self.builder.build(intent, &entities, user_id) else {
            return ResponseOptions::with_error(intent, entities, QUERY_REJECTED);
        };

        match self.executor.run(&sql, Some(user_id)).await {
            Ok(rows) => ResponseOptions::with_data(intent, entities, rows),
            Err(ExecutionError::Rejected { .. } | ExecutionError::NotSelect) => {
                ResponseOptions::with_error(intent, entities, QUERY_REJECTED)
            }
            Err(ExecutionError::Store) => {
                ResponseOptions::with_error(intent, entities, DATA_UNAVAILABLE)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::TemplateQueryBuilder;
    use crate::formatter::REPHRASE_MESSAGE;
    use fq_sql_guard::{MockStore, QueryValidator};
    use serde_json::json;

    /// Builder that returns a fixed statement for every intent.
    struct FixedBuilder(&'static str);

    impl QueryBuilder for FixedBuilder {
        fn build(&self, _: Intent, _: &EntityMap, _: i64) -> Option<String> {
            Some(self.0.to_string())
        }
    }

    fn pipeline(store: MockStore) -> (QueryPipeline, Arc<MockStore>) {
        pipeline_with(store, Arc::new(TemplateQueryBuilder::new()))
    }

    fn pipeline_with(
        store: MockStore,
        builder: Arc<dyn QueryBuilder>,
    ) -> (QueryPipeline, Arc<MockStore>) {
        let store = Arc::new(store);
        let executor = SafeExecutor::new(store.clone(), QueryValidator::ast());
        (
            QueryPipeline::new(IntentClassifier::rules_only(), builder, executor),
            store,
        )
    }

    #[tokio::test]
    async fn next_harvest_without_rows() {
        let (pipeline, store) = pipeline(MockStore::new());
        let answer = pipeline.answer("When is my next harvest?", Some(42)).await;
        assert_eq!(answer.intent, Intent::NextHarvest);
        assert!(answer.entities.is_empty());
        assert!(answer.text.contains("harvest information"), "{}", answer.text);
        assert_eq!(store.calls().len(), 1);
        assert!(store.calls()[0].contains("creator_id = 42"));
    }

    #[tokio::test]
    async fn pending_tasks_in_kirinyaga() {
        let (pipeline, _) = pipeline(MockStore::with_sample_data());
        let answer = pipeline
            .answer("What pending tasks do I have in Kirinyaga?", Some(42))
            .await;
        assert_eq!(answer.intent, Intent::TasksByLocation);
        assert_eq!(answer.entities.location.as_deref(), Some("kirinyaga"));
        assert!(
            answer
                .text
                .starts_with("You have 2 pending tasks in Kirinyaga: Spray coffee for leaf rust"),
            "{}",
            answer.text
        );
    }

    #[tokio::test]
    async fn unknown_skips_store() {
        let (pipeline, store) = pipeline(MockStore::with_sample_data());
        let answer = pipeline.answer("tell me a joke", Some(42)).await;
        assert_eq!(answer.intent, Intent::Unknown);
        assert_eq!(answer.text, REPHRASE_MESSAGE);
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn missing_user_skips_store() {
        let (pipeline, store) = pipeline(MockStore::with_sample_data());
        let answer = pipeline.answer("When is my next harvest?", None).await;
        assert!(answer.text.starts_with("Sorry, I need to know who you are"));
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn rejected_statement_is_generic() {
        let (pipeline, store) = pipeline_with(
            MockStore::with_sample_data(),
            Arc::new(FixedBuilder("SELECT * FROM tasks; DROP TABLE tasks;")),
        );
        let answer = pipeline.answer("When is my next harvest?", Some(42)).await;
        assert_eq!(
            answer.text,
            "Sorry, I couldn't process that query. Please try again later."
        );
        assert!(!answer.text.contains("DROP"));
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn store_failure_is_generic() {
        let (pipeline, _) = pipeline(MockStore::failing("password authentication failed"));
        let answer = pipeline.answer("How is my farm health?", Some(42)).await;
        assert!(answer.text.contains("couldn't reach your farm records"));
        assert!(!answer.text.contains("password"));
    }

    #[tokio::test]
    async fn answer_serializes_diagnostics() {
        let (pipeline, _) = pipeline(MockStore::new().respond_to(
            "from farms",
            json!([{ "farm_name": "Mwea Farm", "health_status": "GOOD" }]),
        ));
        let answer = pipeline.answer("How is the health of my farm?", Some(42)).await;
        let json = serde_json::to_value(&answer).unwrap();
        assert_eq!(json["intent"], "FARM_HEALTH");
        assert_eq!(json["tier"], "rules");
        assert!(json["query_id"].is_string());
        assert!(json["text"].as_str().unwrap().contains("Mwea Farm"));
    }
}
