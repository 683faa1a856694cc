//! Two-tier intent classifier: optional remote tier with rules fallback.
//!
//! When a remote engine is configured it is asked first; on any miss the
//! local rule engine answers. The rule engine alone is always sufficient.

use fq_protocol::IntentResult;

use super::IntentEngine;
use crate::error::ZeroShotError;
use crate::rules::RuleEngine;
use crate::zero_shot::{ZeroShotClient, ZeroShotConfig};

/// Composite classifier that tries the remote tier, then rules.
pub struct IntentClassifier {
    remote: Option<Box<dyn IntentEngine>>,
    rules: RuleEngine,
}

impl IntentClassifier {
    /// Rules only; no network access.
    pub fn rules_only() -> Self {
        Self {
            remote: None,
            rules: RuleEngine::new(),
        }
    }

    pub fn with_remote(remote: Box<dyn IntentEngine>) -> Self {
        Self {
            remote: Some(remote),
            rules: RuleEngine::new(),
        }
    }

    /// Pick the strategy from configuration: a zero-shot config enables the
    /// remote tier, its absence means rules only.
    pub fn from_config(zero_shot: Option<&ZeroShotConfig>) -> Result<Self, ZeroShotError> {
        match zero_shot {
            Some(config) => {
                tracing::info!(endpoint = %config.endpoint, "zero-shot classifier enabled");
                let client = ZeroShotClient::new(config.clone())?;
                Ok(Self::with_remote(Box::new(client)))
            }
            None => Ok(Self::rules_only()),
        }
    }

    pub fn has_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Classify a question. Never fails; worst case is `UNKNOWN`.
    pub async fn classify(&self, text: &str) -> IntentResult {
        if let Some(remote) = &self.remote {
            if let Some(result) = remote.classify(text).await {
                return result;
            }
            tracing::debug!(
                tier = remote.tier_name(),
                "remote classifier missed, falling back to rules"
            );
        }
        self.rules.evaluate(text)
    }
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::rules_only()
    }
}
