use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// A recorded document: page texts plus the producer responses, one per
/// request, in the order they were received.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Replay {
    #[serde(default)]
    pub document: Option<String>,

    pub pages: BTreeMap<u32, String>,

    /// Raw response bodies; JSON objects are accepted and re-serialized
    #[serde(default)]
    pub responses: Vec<Value>,
}

impl Replay {
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read replay file {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Invalid replay file {}", path.display()))
    }

    pub(crate) fn response_bodies(&self) -> Vec<String> {
        self.responses
            .iter()
            .map(|value| match value {
                Value::String(body) => body.clone(),
                other => other.to_string(),
            })
            .collect()
    }
}
