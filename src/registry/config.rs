//! Registry configuration resource
//!
//! A registry configuration is a small TOML document mapping dependency-type
//! names to built-in handler ids:
//!
//! ```toml
//! [handlers]
//! Terraform = "terraform"
//! ```
//!
//! The document is loaded once, from a path the caller supplies explicitly,
//! and is validated against the built-in catalog when the
//! [`HandlerRegistry`](crate::registry::HandlerRegistry) is built from it.
//! There is no implicit search relative to the crate, the binary, or the
//! working directory.

use crate::core::Result;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Parsed form of a registry configuration resource
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistryConfig {
    /// Dependency-type name to built-in handler id
    #[serde(default)]
    pub handlers: BTreeMap<String, String>,

    /// Where this configuration came from, for error reporting
    #[serde(skip)]
    origin: String,
}

impl RegistryConfig {
    /// Load and parse a configuration resource from an explicit path
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&contents)?;
        config.origin = path.display().to_string();
        debug!(
            path = %config.origin,
            types = config.handlers.len(),
            "loaded registry configuration"
        );
        Ok(config)
    }

    /// Parse a configuration resource from an in-memory TOML string
    pub fn parse(contents: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(contents)?;
        config.origin = "<inline>".to_string();
        Ok(config)
    }

    /// The path (or `<inline>`) this configuration was loaded from
    #[must_use]
    pub fn origin(&self) -> &str {
        if self.origin.is_empty() {
            "<inline>"
        } else {
            &self.origin
        }
    }
}
