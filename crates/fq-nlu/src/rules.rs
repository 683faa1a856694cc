//! Rule-based intent engine: a weighted pattern/keyword table.
//!
//! Every matcher of every intent is evaluated. A regex hit adds its full
//! weight; a keyword list adds `KEYWORD_DISCOUNT` × weight when any of its
//! keywords appears. Scores sum per intent, the strictly highest wins (ties
//! go to the earlier table entry), and a winner under `CONFIDENCE_FLOOR`
//! becomes `UNKNOWN`.

use async_trait::async_trait;
use regex::Regex;

use fq_protocol::{ClassifierTier, Intent, IntentResult};

use super::IntentEngine;
use crate::entities::{self, GAZETTEER};

/// Minimum winning score for a known intent.
pub const CONFIDENCE_FLOOR: f64 = 0.4;

/// Keyword hits are weaker evidence than structural regex hits.
pub const KEYWORD_DISCOUNT: f64 = 0.8;

/// A single piece of evidence for an intent.
#[derive(Debug, Clone)]
pub enum Matcher {
    Pattern { regex: Regex, weight: f64 },
    Keywords { words: Vec<&'static str>, weight: f64 },
}

impl Matcher {
    /// Score contributed by this matcher against lower-cased text.
    pub fn score(&self, text: &str) -> f64 {
        match self {
            Matcher::Pattern { regex, weight } => {
                if regex.is_match(text) {
                    *weight
                } else {
                    0.0
                }
            }
            Matcher::Keywords { words, weight } => {
                if words.iter().any(|w| text.contains(w)) {
                    weight * KEYWORD_DISCOUNT
                } else {
                    0.0
                }
            }
        }
    }
}

/// All matchers for one intent.
#[derive(Debug, Clone)]
pub struct IntentRule {
    pub intent: Intent,
    pub matchers: Vec<Matcher>,
}

fn pattern(re: &str, weight: f64) -> Matcher {
    Matcher::Pattern {
        regex: Regex::new(re).unwrap(),
        weight,
    }
}

fn keywords(words: &[&'static str], weight: f64) -> Matcher {
    Matcher::Keywords {
        words: words.to_vec(),
        weight,
    }
}

/// The built-in rule table, in tie-break order.
pub fn default_rules() -> Vec<IntentRule> {
    vec![
        IntentRule {
            intent: Intent::NextHarvest,
            matchers: vec![
                pattern(r"\bnext\s+harvests?\b", 1.0),
                pattern(r"\bupcoming\s+harvests?\b", 1.0),
                pattern(r"\bwhen\b.*\bharvest", 0.8),
                keywords(&["harvest", "ready to pick"], 0.5),
            ],
        },
        IntentRule {
            intent: Intent::TasksByLocation,
            matchers: vec![
                pattern(r"\btasks?\b.*\b(in|at|near|around)\s+[a-z']+", 0.6),
                keywords(GAZETTEER, 0.8),
            ],
        },
        IntentRule {
            intent: Intent::PlotStatus,
            matchers: vec![
                pattern(r"\bplots?\s*(?:id\s*[:#]?\s*|#\s*)?\d+", 0.8),
                pattern(
                    r"\b(status|condition|state)\s+of\s+(?:my\s+|the\s+)?(plots?|fields?)\b",
                    1.0,
                ),
                pattern(r"\bplots?\b.*\b(status|doing|planted|growing)\b", 0.8),
                keywords(&["plot", "field", "crop", "planted"], 0.5),
            ],
        },
        IntentRule {
            intent: Intent::Forecast,
            matchers: vec![
                pattern(r"\bforecast", 1.0),
                pattern(
                    r"\b(expected|projected|predicted|estimated)\s+(yield|harvest|production|output)",
                    1.0,
                ),
                pattern(r"\bhow\s+much\b.*\b(harvest|yield|produce)", 0.7),
                pattern(r"\bnext\s+\d+\s+(days?|weeks?|months?)\b", 0.4),
                keywords(&["yield", "predict", "projection", "estimate", "outlook"], 0.5),
            ],
        },
        IntentRule {
            intent: Intent::FarmHealth,
            matchers: vec![
                pattern(r"\bfarm\s+health\b", 1.0),
                pattern(r"\bhealth\s+of\s+(?:my\s+|the\s+)?farms?\b", 1.0),
                pattern(r"\bhow\s+(?:healthy|well)\b", 0.8),
                pattern(r"\bhow\s+is\s+(?:my\s+|the\s+)?farm\b", 0.6),
                pattern(r"\b(poor|bad|average|fair|good)\s+health\b", 0.8),
                keywords(&["health", "soil", "disease", "pest"], 0.5),
            ],
        },
        IntentRule {
            intent: Intent::TaskSummary,
            matchers: vec![
                pattern(r"\b(summary|summari[sz]e|overview|breakdown)\b", 1.0),
                pattern(r"\bhow\s+many\b.*\btasks?\b", 1.0),
                keywords(&["task", "to-do", "todo", "chores"], 0.6),
                keywords(
                    &["pending", "overdue", "outstanding", "completed", "in progress"],
                    0.4,
                ),
            ],
        },
    ]
}

/// Pattern-matching intent engine.
pub struct RuleEngine {
    rules: Vec<IntentRule>,
}

impl RuleEngine {
    pub fn new() -> Self {
        Self::with_rules(default_rules())
    }

    /// Build an engine over a custom table.
    pub fn with_rules(rules: Vec<IntentRule>) -> Self {
        Self { rules }
    }

    /// Per-intent scores in table order.
    pub fn scores(&self, text: &str) -> Vec<(Intent, f64)> {
        let lower = text.to_lowercase();
        self.rules
            .iter()
            .map(|rule| {
                let total = rule.matchers.iter().map(|m| m.score(&lower)).sum();
                (rule.intent, total)
            })
            .collect()
    }

    /// Classify a question. Never fails; worst case is `UNKNOWN`.
    pub fn evaluate(&self, text: &str) -> IntentResult {
        let mut best: Option<(Intent, f64)> = None;
        for (intent, score) in self.scores(text) {
            if best.is_none_or(|(_, top)| score > top) {
                best = Some((intent, score));
            }
        }

        let Some((intent, score)) = best else {
            return IntentResult::unknown(0.0, ClassifierTier::Rules);
        };

        if score < CONFIDENCE_FLOOR {
            tracing::debug!(score, candidate = %intent, "rule score below floor");
            return IntentResult::unknown(score, ClassifierTier::Rules);
        }

        IntentResult {
            intent,
            entities: entities::extract(text, intent),
            confidence: score,
            tier: ClassifierTier::Rules,
        }
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IntentEngine for RuleEngine {
    async fn classify(&self, text: &str) -> Option<IntentResult> {
        Some(self.evaluate(text))
    }

    fn tier_name(&self) -> &str {
        "rules"
    }
}
