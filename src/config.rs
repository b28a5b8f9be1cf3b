//! Engine Configuration
//!
//! A single explicit value passed into the compiler, executor and router at construction
//! time. It is read from a JSON file and can then be adjusted through `FACET_SEARCH_*`
//! environment variables.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_LIMIT: usize = 50;
pub const DEFAULT_MAX_LIMIT: usize = 1000;

const ENV_DEFAULT_LIMIT: &str = "FACET_SEARCH_DEFAULT_LIMIT";
const ENV_MAX_LIMIT: &str = "FACET_SEARCH_MAX_LIMIT";
const ENV_DEADLINE_MS: &str = "FACET_SEARCH_DEADLINE_MS";
const ENV_FAILURE_POLICY: &str = "FACET_SEARCH_FAILURE_POLICY";
const ENV_LIMIT_POLICY: &str = "FACET_SEARCH_LIMIT_POLICY";
const ENV_REJECT_CONTRADICTIONS: &str = "FACET_SEARCH_REJECT_CONTRADICTIONS";
const ENV_AXES_PATH: &str = "FACET_SEARCH_AXES_PATH";

/// What the router does when one partition's shard fails during fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Any shard failure fails the whole query.
    #[default]
    Strict,
    /// Failed shards contribute nothing and the result is flagged partial.
    Lenient,
}

/// How the requested limit is handed to each shard during fan-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitPolicy {
    /// Every shard receives the full limit, so the merged top-k is exact.
    #[default]
    Full,
    /// Every shard receives `ceil(limit / shards)`.
    Even,
}

impl FromStr for FailurePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "lenient" => Ok(Self::Lenient),
            other => Err(anyhow::anyhow!("Unknown failure policy: {}", other)),
        }
    }
}

impl FromStr for LimitPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "full" => Ok(Self::Full),
            "even" => Ok(Self::Even),
            other => Err(anyhow::anyhow!("Unknown limit policy: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Limit used when a request does not carry one.
    pub default_limit: usize,
    /// Requested limits above this are clamped.
    pub max_limit: usize,
    /// Per-request deadline for posting-list reads. `None` waits indefinitely.
    pub deadline_ms: Option<u64>,
    pub failure_policy: FailurePolicy,
    pub limit_policy: LimitPolicy,
    /// Reject same-axis selections whose ranges cannot hold together (e.g. `1girl` + `3girls`).
    pub reject_contradictions: bool,
    /// JSON file of axis rows. The reference registry is used when absent.
    pub axes_path: Option<PathBuf>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            max_limit: DEFAULT_MAX_LIMIT,
            deadline_ms: None,
            failure_policy: FailurePolicy::Strict,
            limit_policy: LimitPolicy::Full,
            reject_contradictions: false,
            axes_path: None,
        }
    }
}

impl EngineConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: EngineConfig = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env_overrides(mut self) -> Result<Self> {
        if let Some(value) = read_env(ENV_DEFAULT_LIMIT) {
            self.default_limit = value
                .parse()
                .with_context(|| format!("{} must be an integer", ENV_DEFAULT_LIMIT))?;
        }
        if let Some(value) = read_env(ENV_MAX_LIMIT) {
            self.max_limit = value
                .parse()
                .with_context(|| format!("{} must be an integer", ENV_MAX_LIMIT))?;
        }
        if let Some(value) = read_env(ENV_DEADLINE_MS) {
            self.deadline_ms = Some(
                value
                    .parse()
                    .with_context(|| format!("{} must be an integer", ENV_DEADLINE_MS))?,
            );
        }
        if let Some(value) = read_env(ENV_FAILURE_POLICY) {
            self.failure_policy = value.parse()?;
        }
        if let Some(value) = read_env(ENV_LIMIT_POLICY) {
            self.limit_policy = value.parse()?;
        }
        if let Some(value) = read_env(ENV_REJECT_CONTRADICTIONS) {
            self.reject_contradictions = value
                .parse()
                .with_context(|| format!("{} must be true or false", ENV_REJECT_CONTRADICTIONS))?;
        }
        if let Some(value) = read_env(ENV_AXES_PATH) {
            self.axes_path = Some(PathBuf::from(value));
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.default_limit == 0 {
            return Err(anyhow::anyhow!("default_limit must be at least 1"));
        }
        if self.max_limit < self.default_limit {
            return Err(anyhow::anyhow!(
                "max_limit ({}) must not be below default_limit ({})",
                self.max_limit,
                self.default_limit
            ));
        }
        if self.deadline_ms == Some(0) {
            return Err(anyhow::anyhow!("deadline_ms must be at least 1 when set"));
        }
        Ok(())
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_ms.map(Duration::from_millis)
    }
}

fn read_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
