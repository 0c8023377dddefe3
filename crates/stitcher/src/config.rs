use serde::{Deserialize, Serialize};

/// Configuration for stitching behavior
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StitcherConfig {
    /// Fail instead of warning when page text is left with no open chunk
    pub strict_trailing_text: bool,
}

impl StitcherConfig {
    /// Create config that treats orphan trailing text as fatal
    #[must_use]
    pub fn strict() -> Self {
        Self {
            strict_trailing_text: true,
        }
    }
}

/// Options for turning completed chunks into public records
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssembleOptions {
    /// Prefix of generated chunk ids (`{prefix}-{n}`)
    pub id_prefix: String,
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self {
            id_prefix: "chunk".to_string(),
        }
    }
}

impl AssembleOptions {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.id_prefix.trim().is_empty() {
            return Err("id_prefix must not be empty".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_lenient() {
        assert!(!StitcherConfig::default().strict_trailing_text);
        assert!(StitcherConfig::strict().strict_trailing_text);
    }

    #[test]
    fn test_assemble_options_validation() {
        assert!(AssembleOptions::default().validate().is_ok());
        let blank = AssembleOptions {
            id_prefix: "  ".to_string(),
        };
        assert!(blank.validate().is_err());
    }
}
