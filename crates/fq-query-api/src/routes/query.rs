//! Question answering and diagnostics endpoints.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;

use fq_protocol::{IntentResult, ValidationResult};

use crate::error::{ApiError, ApiResult};
use crate::pipeline::Answer;
use crate::state::AppState;

/// Longest question accepted, in characters.
pub const MAX_QUESTION_CHARS: usize = 500;

/// Request body for answering or classifying a question.
#[derive(Debug, Deserialize)]
pub struct QuestionRequest {
    /// Free-text question.
    pub question: String,
    /// Authenticated caller, resolved upstream.
    #[serde(default)]
    pub user_id: Option<i64>,
}

/// Request body for validating a raw statement.
#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    pub sql: String,
    #[serde(default)]
    pub user_id: Option<i64>,
}

fn checked_question(question: &str) -> ApiResult<&str> {
    let question = question.trim();
    if question.is_empty() {
        return Err(ApiError::BadRequest("question must not be empty".into()));
    }
    if question.chars().count() > MAX_QUESTION_CHARS {
        return Err(ApiError::TooLarge(format!(
            "question exceeds {MAX_QUESTION_CHARS} characters"
        )));
    }
    Ok(question)
}

/// POST /api/v1/query: answer a question from the caller's farm data.
pub async fn answer_question(
    State(state): State<AppState>,
    Json(req): Json<QuestionRequest>,
) -> ApiResult<Json<Answer>> {
    let question = checked_question(&req.question)?;
    let answer = state.pipeline.answer(question, req.user_id).await;
    tracing::info!(
        query_id = %answer.query_id,
        user_id = ?req.user_id,
        intent = %answer.intent,
        "question answered"
    );
    Ok(Json(answer))
}

/// POST /api/v1/classify: intent and entities only, no data access.
pub async fn classify_question(
    State(state): State<AppState>,
    Json(req): Json<QuestionRequest>,
) -> ApiResult<Json<IntentResult>> {
    let question = checked_question(&req.question)?;
    Ok(Json(state.pipeline.classify(question).await))
}

/// POST /api/v1/validate: run a statement through the configured policy.
pub async fn validate_sql(
    State(state): State<AppState>,
    Json(req): Json<ValidateRequest>,
) -> ApiResult<Json<ValidationResult>> {
    if req.sql.trim().is_empty() {
        return Err(ApiError::BadRequest("sql must not be empty".into()));
    }
    let result = state
        .pipeline
        .executor()
        .validator()
        .validate(&req.sql, req.user_id);
    if !result.valid {
        tracing::warn!(reasons = ?result.reasons, "statement failed validation");
    }
    Ok(Json(result))
}
