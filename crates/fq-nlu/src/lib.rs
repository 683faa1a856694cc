//! Natural-language understanding for farm-data questions.
//!
//! Converts free text ("When is my next harvest?") into an `IntentResult`:
//! a closed `Intent`, the `EntityMap` extracted under that intent, and a
//! confidence score.
//!
//! Two tiers:
//! - **Rules** (local): weighted regex/keyword table, always available.
//! - **Zero-shot** (remote, optional): HTTP classifier with a hard timeout.
//!   Any miss falls back to the rules tier.

pub mod entities;
pub mod error;
pub mod rules;
pub mod tiered;
pub mod zero_shot;

use async_trait::async_trait;
use fq_protocol::IntentResult;

/// Trait for engines that classify a question into an intent.
#[async_trait]
pub trait IntentEngine: Send + Sync {
    /// Classify the question. Returns None if the engine cannot give a
    /// usable answer (the caller then falls back to another tier).
    async fn classify(&self, text: &str) -> Option<IntentResult>;

    /// Name of this tier (for logging).
    fn tier_name(&self) -> &str;
}

pub use entities::extract;
pub use error::ZeroShotError;
pub use rules::RuleEngine;
pub use tiered::IntentClassifier;
pub use zero_shot::{ZeroShotClient, ZeroShotConfig};
