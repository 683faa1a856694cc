//! Policy selection for the query validator.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use fq_protocol::ValidationResult;

use crate::{ast, screen};

/// Columns that tie a row to its owner or assignee.
pub const DEFAULT_OWNERSHIP_COLUMNS: &[&str] = &["creator_id", "assignee_id", "owner_id"];

/// Sub-mode of the text screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenMode {
    /// Also rejects JOIN, UNION and any semicolon.
    Strict,
    /// Permits JOIN, UNION and a trailing semicolon.
    Relaxed,
}

/// Which validation policy a validator applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    /// Parse the statement and prove the ownership filter.
    #[default]
    Ast,
    ScreenStrict,
    ScreenRelaxed,
}

impl FromStr for PolicyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ast" => Ok(PolicyKind::Ast),
            "screen_strict" | "screen-strict" => Ok(PolicyKind::ScreenStrict),
            "screen_relaxed" | "screen-relaxed" => Ok(PolicyKind::ScreenRelaxed),
            other => Err(format!("unknown validation policy '{other}'")),
        }
    }
}

/// Validates candidate SQL under one configured policy.
#[derive(Debug, Clone)]
pub struct QueryValidator {
    kind: PolicyKind,
    ownership_columns: Vec<String>,
}

impl QueryValidator {
    pub fn new(kind: PolicyKind, ownership_columns: Vec<String>) -> Self {
        Self {
            kind,
            ownership_columns,
        }
    }

    /// AST policy over the default ownership columns.
    pub fn ast() -> Self {
        Self::new(
            PolicyKind::Ast,
            DEFAULT_OWNERSHIP_COLUMNS.iter().map(|c| c.to_string()).collect(),
        )
    }

    pub fn screen(mode: ScreenMode) -> Self {
        let kind = match mode {
            ScreenMode::Strict => PolicyKind::ScreenStrict,
            ScreenMode::Relaxed => PolicyKind::ScreenRelaxed,
        };
        Self::new(kind, Vec::new())
    }

    pub fn kind(&self) -> PolicyKind {
        self.kind
    }

    /// Validate a statement. The AST policy needs the caller's user id to
    /// prove ownership; the screen ignores it.
    pub fn validate(&self, sql: &str, user_id: Option<i64>) -> ValidationResult {
        match self.kind {
            PolicyKind::Ast => match user_id {
                Some(user_id) => ast::validate(sql, user_id, &self.ownership_columns),
                None => ValidationResult::rejected(vec![
                    "user id is required to verify the ownership filter".into(),
                ]),
            },
            PolicyKind::ScreenStrict => screen::validate(sql, ScreenMode::Strict),
            PolicyKind::ScreenRelaxed => screen::validate(sql, ScreenMode::Relaxed),
        }
    }
}

impl Default for QueryValidator {
    fn default() -> Self {
        Self::ast()
    }
}
