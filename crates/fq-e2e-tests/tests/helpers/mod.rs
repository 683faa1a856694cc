//! Shared test harness for E2E integration tests.
//!
//! Wires the real classifier, query builder, validator, executor and
//! formatter behind the Axum router, over a recording `MockStore`.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use fq_nlu::{IntentClassifier, ZeroShotConfig};
use fq_query_api::routes::build_router;
use fq_query_api::state::AppState;
use fq_sql_guard::{MockStore, QueryValidator};

/// Router plus the store it answers from.
pub struct TestHarness {
    pub state: AppState,
    pub router: Router,
    /// Records every statement that reached the store.
    pub store: Arc<MockStore>,
}

impl TestHarness {
    /// Rules-only classifier, AST policy, sample farm data.
    pub fn with_sample_data() -> Self {
        Self::build(MockStore::with_sample_data(), QueryValidator::ast(), None)
    }

    /// Rules-only classifier, AST policy, no rows for any query.
    pub fn empty() -> Self {
        Self::build(MockStore::new(), QueryValidator::ast(), None)
    }

    /// Custom store and validation policy.
    pub fn with_store(store: MockStore, validator: QueryValidator) -> Self {
        Self::build(store, validator, None)
    }

    /// Remote zero-shot tier in front of the rules, sample data.
    pub fn with_zero_shot(config: ZeroShotConfig) -> Self {
        Self::build(
            MockStore::with_sample_data(),
            QueryValidator::ast(),
            Some(config),
        )
    }

    fn build(store: MockStore, validator: QueryValidator, zero_shot: Option<ZeroShotConfig>) -> Self {
        let store = Arc::new(store);
        let classifier = IntentClassifier::from_config(zero_shot.as_ref()).unwrap();
        let state = AppState::new(classifier, validator, store.clone());
        let router = build_router(state.clone());
        Self {
            state,
            router,
            store,
        }
    }

    async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(
                Request::post(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(serde_json::to_vec(&body).unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        (status, json)
    }

    /// Ask a question (POST /api/v1/query).
    /// Returns (HTTP status code, response JSON body).
    pub async fn ask(&self, question: &str, user_id: Option<i64>) -> (StatusCode, Value) {
        self.post(
            "/api/v1/query",
            json!({ "question": question, "user_id": user_id }),
        )
        .await
    }

    /// Answer text for a question asked as `user_id`.
    pub async fn answer_text(&self, question: &str, user_id: i64) -> String {
        let (status, json) = self.ask(question, Some(user_id)).await;
        assert_eq!(status, StatusCode::OK, "{json}");
        json["text"].as_str().unwrap().to_string()
    }

    /// Classify a question (POST /api/v1/classify).
    pub async fn classify(&self, question: &str) -> (StatusCode, Value) {
        self.post("/api/v1/classify", json!({ "question": question }))
            .await
    }

    /// Validate a statement (POST /api/v1/validate).
    pub async fn validate(&self, sql: &str, user_id: Option<i64>) -> (StatusCode, Value) {
        self.post("/api/v1/validate", json!({ "sql": sql, "user_id": user_id }))
            .await
    }
}
