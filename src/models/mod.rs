//! Shared data models for depend operations
//!
//! This module provides the data structures exchanged between an external
//! manifest resolver (which produces dependency records) and the dispatch
//! core (which consumes them), ensuring consistency across the crate.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;

/// Free-form per-dependency configuration, keyed by parameter name
///
/// Values are arbitrary JSON values so that manifest resolvers can pass
/// strings, booleans, numbers, or nested structures through to handlers
/// without the dispatch core interpreting them.
pub type ParameterMap = BTreeMap<String, serde_json::Value>;

/// The action a dispatch run performs, passed uniformly to every handler
///
/// Determines which handler behavior runs and how results are interpreted:
/// Install and Import are fire-and-forget, Test expects a boolean result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionVerb {
    /// Perform the type-specific installation, idempotently
    Install,
    /// Check whether the dependency is already satisfied
    Test,
    /// Import the dependency into the current session
    Import,
}

impl ActionVerb {
    /// The wire string handlers observe in their invocation parameters
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Install => "Install",
            Self::Test => "Test",
            Self::Import => "Import",
        }
    }
}

impl fmt::Display for ActionVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One resolved dependency to act on
///
/// Records are produced by an external manifest resolver and consumed
/// read-only by the [`Dispatcher`](crate::dispatch::Dispatcher). Fields the
/// core does not understand travel in [`parameters`](Self::parameters)
/// verbatim; serde flattening means any extra manifest keys land there
/// automatically on deserialization.
///
/// # Examples
///
/// ```rust
/// use depend::models::DependencyRecord;
///
/// let record: DependencyRecord = serde_json::from_str(
///     r#"{
///         "name": "terraform",
///         "dependency_type": "Terraform",
///         "version": "1.2.0",
///         "architecture": "arm64"
///     }"#,
/// ).unwrap();
///
/// assert_eq!(record.dependency_type, "Terraform");
/// // Unknown keys are captured as pass-through parameters
/// assert!(record.parameters.contains_key("architecture"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyRecord {
    /// Dependency name, unique within a manifest
    pub name: String,

    /// Selects the handler this record is routed to
    pub dependency_type: String,

    /// Requested version, where the dependency type is versioned
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Installation target directory, where the dependency type uses one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<PathBuf>,

    /// Explicit source location, overriding the handler's computed default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Whether to prepend the target directory to the search path
    #[serde(default)]
    pub add_to_path: bool,

    /// Tags used by callers to pre-filter a manifest before dispatch
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,

    /// Type-specific configuration, opaque to the dispatch core
    #[serde(flatten)]
    pub parameters: ParameterMap,
}

impl DependencyRecord {
    /// Create a record with only the routing fields set
    #[must_use]
    pub fn new(name: impl Into<String>, dependency_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dependency_type: dependency_type.into(),
            version: None,
            target: None,
            source: None,
            add_to_path: false,
            tags: BTreeSet::new(),
            parameters: ParameterMap::new(),
        }
    }

    /// Whether this record carries the given tag
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

/// A dependency record annotated with a Test result
///
/// Produced by Test-mode dispatch in its verbose variant: a non-destructive
/// copy of the input record plus exactly one additional field carrying the
/// handler's boolean result. The input record itself is never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestedDependency {
    /// The dependency record that was tested
    #[serde(flatten)]
    pub dependency: DependencyRecord,

    /// Whether the handler found the dependency already satisfied
    pub dependency_exists: bool,
}

/// Pre-filter records by tag before dispatch
///
/// Keeps the records carrying at least one of the requested tags. An empty
/// tag list keeps everything - callers that don't use tags pass records
/// straight to the dispatcher. Records without tags never match a non-empty
/// filter.
#[must_use]
pub fn filter_by_tags<'a>(
    records: &'a [DependencyRecord],
    tags: &[&str],
) -> Vec<&'a DependencyRecord> {
    if tags.is_empty() {
        return records.iter().collect();
    }
    records.iter().filter(|r| tags.iter().any(|t| r.has_tag(t))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with_tags(name: &str, tags: &[&str]) -> DependencyRecord {
        let mut record = DependencyRecord::new(name, "Noop");
        record.tags = tags.iter().map(ToString::to_string).collect();
        record
    }

    #[test]
    fn test_action_verb_wire_strings() {
        assert_eq!(ActionVerb::Install.as_str(), "Install");
        assert_eq!(ActionVerb::Test.as_str(), "Test");
        assert_eq!(ActionVerb::Import.as_str(), "Import");
        assert_eq!(ActionVerb::Test.to_string(), "Test");
    }

    #[test]
    fn test_record_deserializes_extra_keys_into_parameters() {
        let record: DependencyRecord = serde_json::from_str(
            r#"{
                "name": "terraform",
                "dependency_type": "Terraform",
                "version": "1.2.0",
                "target": "/opt/tools",
                "add_to_path": true,
                "architecture": "arm64",
                "mirror": {"region": "eu"}
            }"#,
        )
        .unwrap();

        assert_eq!(record.name, "terraform");
        assert_eq!(record.version.as_deref(), Some("1.2.0"));
        assert!(record.add_to_path);
        assert_eq!(
            record.parameters.get("architecture"),
            Some(&serde_json::json!("arm64"))
        );
        assert_eq!(
            record.parameters.get("mirror"),
            Some(&serde_json::json!({"region": "eu"}))
        );
    }

    #[test]
    fn test_tested_dependency_serializes_flat_with_one_extra_field() {
        let record = DependencyRecord::new("terraform", "Terraform");
        let tested = TestedDependency {
            dependency: record,
            dependency_exists: true,
        };

        let value = serde_json::to_value(&tested).unwrap();
        assert_eq!(value["name"], "terraform");
        assert_eq!(value["dependency_type"], "Terraform");
        assert_eq!(value["dependency_exists"], true);
    }

    #[test]
    fn test_filter_by_tags_empty_filter_keeps_everything() {
        let records = vec![
            record_with_tags("a", &["prod"]),
            record_with_tags("b", &[]),
        ];
        assert_eq!(filter_by_tags(&records, &[]).len(), 2);
    }

    #[test]
    fn test_filter_by_tags_matches_any_requested_tag() {
        let records = vec![
            record_with_tags("a", &["prod"]),
            record_with_tags("b", &["dev"]),
            record_with_tags("c", &[]),
        ];
        let filtered = filter_by_tags(&records, &["prod", "dev"]);
        assert_eq!(filtered.len(), 2);
        // Untagged records never match a non-empty filter
        assert!(filtered.iter().all(|r| r.name != "c"));
    }
}
