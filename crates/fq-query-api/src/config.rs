//! Query API server configuration.
//!
//! Defaults, optionally overlaid by a TOML file (`FQ_CONFIG`), then by
//! individual environment variables.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

use fq_nlu::ZeroShotConfig;
use fq_sql_guard::{DEFAULT_OWNERSHIP_COLUMNS, PolicyKind, QueryValidator};

/// Top-level API server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Listen address (e.g., "0.0.0.0").
    #[serde(default = "default_host")]
    pub host: String,
    /// Listen port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// PostgreSQL connection URL. Sample data is served when absent.
    #[serde(default)]
    pub database_url: Option<String>,
    /// Validation policy applied before every execution.
    #[serde(default)]
    pub validation: PolicyKind,
    /// Columns accepted as proof of user scoping by the AST policy.
    #[serde(default = "default_ownership_columns")]
    pub ownership_columns: Vec<String>,
    /// Remote zero-shot classifier. Rules only when absent.
    #[serde(default)]
    pub zero_shot: Option<ZeroShotConfig>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_ownership_columns() -> Vec<String> {
    DEFAULT_OWNERSHIP_COLUMNS.iter().map(|c| c.to_string()).collect()
}

impl ApiConfig {
    /// Load config from `FQ_CONFIG` (if set) and environment overrides.
    pub fn load() -> anyhow::Result<Self> {
        let base = match std::env::var("FQ_CONFIG") {
            Ok(path) => Self::from_file(&path)?,
            Err(_) => Self::default(),
        };
        base.with_overrides(|key| std::env::var(key).ok())
    }

    /// Parse a TOML config file.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config file {}", path.display()))
    }

    /// Apply environment-style overrides read through `lookup`.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<Self> {
        if let Some(url) = lookup("DATABASE_URL") {
            self.database_url = Some(url);
        }
        if let Some(policy) = lookup("FQ_VALIDATION") {
            self.validation = policy.parse().map_err(anyhow::Error::msg)?;
        }
        if let Some(endpoint) = lookup("ZERO_SHOT_URL") {
            let mut zero_shot = self
                .zero_shot
                .take()
                .unwrap_or_else(|| ZeroShotConfig::new(endpoint.clone()));
            zero_shot.endpoint = endpoint;
            self.zero_shot = Some(zero_shot);
        }
        if let Some(zero_shot) = self.zero_shot.as_mut() {
            if let Some(token) = lookup("ZERO_SHOT_TOKEN") {
                zero_shot.api_token = Some(token);
            }
            if let Some(ms) = lookup("ZERO_SHOT_TIMEOUT_MS") {
                zero_shot.timeout_ms = ms
                    .parse()
                    .with_context(|| format!("invalid ZERO_SHOT_TIMEOUT_MS '{ms}'"))?;
            }
        }
        Ok(self)
    }

    /// Validator for the configured policy.
    pub fn validator(&self) -> QueryValidator {
        QueryValidator::new(self.validation, self.ownership_columns.clone())
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database_url: None,
            validation: PolicyKind::default(),
            ownership_columns: default_ownership_columns(),
            zero_shot: None,
        }
    }
}
