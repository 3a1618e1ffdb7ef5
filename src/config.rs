//! Parse configuration
//!
//! Block tags must be known before scanning starts, so callers that keep
//! their tag vocabulary outside of code can load it from TOML:
//!
//! ```toml
//! source_name = "article"
//! block_tags = ["callout", "float_right"]
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::error::ParseError;
use crate::parser::{parse, Document};

/// Errors that can occur when loading a configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

const DEFAULT_SOURCE_NAME: &str = "document";

/// Name and block-tag vocabulary used when parsing documents
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Name shown in diagnostics
    #[serde(default = "default_source_name")]
    pub source_name: String,
    /// Identifiers parsed as block tags
    #[serde(default)]
    pub block_tags: Vec<String>,
}

fn default_source_name() -> String {
    DEFAULT_SOURCE_NAME.to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            source_name: default_source_name(),
            block_tags: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load a configuration from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Set the name shown in diagnostics
    pub fn with_source_name(mut self, name: impl Into<String>) -> Self {
        self.source_name = name.into();
        self
    }

    /// Declare an identifier as a block tag
    pub fn with_block_tag(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        if !self.block_tags.contains(&name) {
            self.block_tags.push(name);
        }
        self
    }

    /// Declare several identifiers as block tags
    pub fn with_block_tags<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names
            .into_iter()
            .fold(self, |config, name| config.with_block_tag(name))
    }

    /// Parse `input` with this configuration
    pub fn parse(&self, input: &str) -> Result<Document, ParseError> {
        let block_tags: Vec<&str> = self.block_tags.iter().map(String::as_str).collect();
        parse(&self.source_name, input, &block_tags)
    }
}
