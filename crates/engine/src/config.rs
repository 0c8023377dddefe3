use crate::error::{EngineError, Result};
use pagestitch_producer::RetryConfig;
use pagestitch_stitcher::{AssembleOptions, StitcherConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const ENV_MAX_ATTEMPTS: &str = "PAGESTITCH_MAX_ATTEMPTS";
pub const ENV_PAGE_BATCH_SIZE: &str = "PAGESTITCH_PAGE_BATCH_SIZE";
pub const ENV_STRICT_TRAILING_TEXT: &str = "PAGESTITCH_STRICT_TRAILING_TEXT";
pub const ENV_ATTEMPT_TIMEOUT_MS: &str = "PAGESTITCH_ATTEMPT_TIMEOUT_MS";

/// How pages are grouped into producer requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchingConfig {
    /// Pages per batch
    pub page_batch_size: usize,
}

impl Default for BatchingConfig {
    fn default() -> Self {
        Self { page_batch_size: 3 }
    }
}

/// Full configuration of a chunking run
///
/// ```toml
/// [stitcher]
/// strict_trailing_text = true
///
/// [retry]
/// max_attempts = 5
/// attempt_timeout_ms = 30000
///
/// [batching]
/// page_batch_size = 4
///
/// [assembly]
/// id_prefix = "report"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    pub stitcher: StitcherConfig,
    pub retry: RetryConfig,
    pub batching: BatchingConfig,
    pub assembly: AssembleOptions,
}

impl EngineConfig {
    /// Parse a TOML document; missing sections keep their defaults
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|err| EngineError::invalid_config(err.to_string()))
    }

    /// Read and parse a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| EngineError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    /// Apply `PAGESTITCH_*` variables from the process environment
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup. Unparsable values are
    /// logged and ignored.
    #[must_use]
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(value) = parse_var(&lookup, ENV_MAX_ATTEMPTS, |v| v.parse::<u32>().ok()) {
            self.retry.max_attempts = value;
        }
        if let Some(value) = parse_var(&lookup, ENV_PAGE_BATCH_SIZE, |v| v.parse::<usize>().ok()) {
            self.batching.page_batch_size = value;
        }
        if let Some(value) = parse_var(&lookup, ENV_STRICT_TRAILING_TEXT, parse_flag) {
            self.stitcher.strict_trailing_text = value;
        }
        if let Some(value) = parse_var(&lookup, ENV_ATTEMPT_TIMEOUT_MS, |v| v.parse::<u64>().ok())
        {
            self.retry.attempt_timeout_ms = (value > 0).then_some(value);
        }
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        self.retry.validate()?;
        self.assembly.validate()?;
        if self.batching.page_batch_size == 0 {
            return Err("page_batch_size must be >= 1".to_string());
        }
        Ok(())
    }
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Option<T> {
    let raw = lookup(key)?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let parsed = parse(trimmed);
    if parsed.is_none() {
        log::warn!("Ignoring {key}={raw:?}: not a valid value");
    }
    parsed
}

fn parse_flag(value: &str) -> Option<bool> {
    if value == "1" || value.eq_ignore_ascii_case("true") {
        Some(true)
    } else if value == "0" || value.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}
