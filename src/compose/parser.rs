//! Docker Compose file parser

use super::config::ComposeConfig;
use crate::error::{DtopError, Result};
use serde_yaml::Value;
use std::path::Path;

/// Compose file parser
pub struct ComposeParser;

impl ComposeParser {
    /// Parse compose file from path
    pub fn parse_file(path: &Path) -> Result<ComposeConfig> {
        if !path.is_file() {
            return Err(DtopError::ComposeFileNotFound(path.display().to_string()));
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| DtopError::ComposeParse(format!("Failed to read {}: {}", path.display(), e)))?;

        Self::parse_str(&content)
    }

    /// Parse compose file from string
    ///
    /// An empty document is an empty definition. Merge keys (`<<: *anchor`)
    /// are expanded before the definition is typed.
    pub fn parse_str(content: &str) -> Result<ComposeConfig> {
        let mut value: Value = serde_yaml::from_str(content)
            .map_err(|e| DtopError::ComposeParse(format!("Failed to parse YAML: {}", e)))?;
        value
            .apply_merge()
            .map_err(|e| DtopError::ComposeParse(format!("Invalid merge key: {}", e)))?;

        if value.is_null() {
            return Ok(ComposeConfig::default());
        }

        serde_yaml::from_value(value)
            .map_err(|e| DtopError::ComposeParse(format!("Invalid compose definition: {}", e)))
    }

    /// Render a definition back to YAML
    pub fn to_yaml(config: &ComposeConfig) -> Result<String> {
        Ok(serde_yaml::to_string(config)?)
    }
}
