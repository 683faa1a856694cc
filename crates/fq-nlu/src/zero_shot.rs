//! Remote zero-shot classifier client.
//!
//! POSTs the question with a fixed candidate-label list (one label per
//! intent) and expects `{ "labels": [...], "scores": [...] }` back. Any
//! timeout, transport error, non-2xx, malformed body or low score yields
//! `None` so the caller falls back to the rules tier. Never retried.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::timeout;

use fq_protocol::{ClassifierTier, Intent, IntentResult};

use super::IntentEngine;
use crate::entities;
use crate::error::ZeroShotError;

/// Candidate labels sent to the classifier, mapped 1:1 to intents.
pub const CANDIDATE_LABELS: [(&str, Intent); 6] = [
    ("next harvest date", Intent::NextHarvest),
    ("tasks at a location", Intent::TasksByLocation),
    ("plot status", Intent::PlotStatus),
    ("harvest forecast", Intent::Forecast),
    ("farm health", Intent::FarmHealth),
    ("task summary", Intent::TaskSummary),
];

/// Configuration for the remote zero-shot classifier.
#[derive(Debug, Clone, Deserialize)]
pub struct ZeroShotConfig {
    /// Full URL of the classification endpoint.
    pub endpoint: String,
    /// Bearer token, if the endpoint requires one.
    #[serde(default)]
    pub api_token: Option<String>,
    /// Hard per-request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Top scores at or below this are treated as a miss.
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,
}

fn default_timeout_ms() -> u64 {
    1500
}

fn default_min_confidence() -> f64 {
    0.4
}

impl ZeroShotConfig {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_token: None,
            timeout_ms: default_timeout_ms(),
            min_confidence: default_min_confidence(),
        }
    }
}

#[derive(Serialize)]
struct ClassifyRequest<'a> {
    inputs: &'a str,
    parameters: ClassifyParameters,
}

#[derive(Serialize)]
struct ClassifyParameters {
    candidate_labels: Vec<&'static str>,
}

#[derive(Debug, Deserialize)]
struct ClassifyResponse {
    labels: Vec<String>,
    scores: Vec<f64>,
}

/// Client for the remote zero-shot classification endpoint.
pub struct ZeroShotClient {
    client: reqwest::Client,
    config: ZeroShotConfig,
}

impl ZeroShotClient {
    pub fn new(config: ZeroShotConfig) -> Result<Self, ZeroShotError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()?;
        Ok(Self { client, config })
    }

    /// Send one request and return the top-scoring known intent.
    async fn request(&self, text: &str) -> Result<(Intent, f64), ZeroShotError> {
        let body = ClassifyRequest {
            inputs: text,
            parameters: ClassifyParameters {
                candidate_labels: CANDIDATE_LABELS.iter().map(|(label, _)| *label).collect(),
            },
        };

        let mut request = self.client.post(&self.config.endpoint).json(&body);
        if let Some(token) = &self.config.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ZeroShotError::RateLimited);
        }
        if !status.is_success() {
            return Err(ZeroShotError::Status(status.as_u16()));
        }

        let parsed: ClassifyResponse = response
            .json()
            .await
            .map_err(|e| ZeroShotError::Parse(e.to_string()))?;

        top_label(&parsed)
    }
}

/// Pick the highest-scoring label and map it back to an intent.
fn top_label(response: &ClassifyResponse) -> Result<(Intent, f64), ZeroShotError> {
    let (label, score) = response
        .labels
        .iter()
        .zip(response.scores.iter().copied())
        .fold(None::<(&String, f64)>, |best, (label, score)| match best {
            Some((_, top)) if top >= score => best,
            _ => Some((label, score)),
        })
        .ok_or_else(|| ZeroShotError::Parse("empty labels or scores".into()))?;

    let intent = intent_for_label(label)
        .ok_or_else(|| ZeroShotError::Parse(format!("unknown label '{label}'")))?;
    Ok((intent, score))
}

fn intent_for_label(label: &str) -> Option<Intent> {
    CANDIDATE_LABELS
        .iter()
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(label))
        .map(|(_, intent)| *intent)
}

#[async_trait]
impl IntentEngine for ZeroShotClient {
    async fn classify(&self, text: &str) -> Option<IntentResult> {
        let timeout_ms = self.config.timeout_ms;
        let result = timeout(Duration::from_millis(timeout_ms), self.request(text))
            .await
            .unwrap_or(Err(ZeroShotError::Timeout { timeout_ms }));

        match result {
            Ok((intent, score)) if score > self.config.min_confidence => Some(IntentResult {
                intent,
                entities: entities::extract(text, intent),
                confidence: score,
                tier: ClassifierTier::Remote,
            }),
            Ok((intent, score)) => {
                tracing::debug!(
                    score,
                    candidate = %intent,
                    "zero-shot confidence too low, discarding"
                );
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "zero-shot classification failed");
                None
            }
        }
    }

    fn tier_name(&self) -> &str {
        "zero_shot"
    }
}
