//! Handler registry: the static dependency-type to handler mapping
//!
//! The registry is the single piece of long-lived state in a dispatch
//! process. It is built once - either programmatically through
//! [`RegistryBuilder`], from the built-in catalog via
//! [`HandlerRegistry::with_defaults`], or from an explicit configuration
//! resource via [`HandlerRegistry::from_config_path`] - and is read-only from
//! then on. Lookup is a plain key match; an unknown type yields `None`, which
//! the dispatcher reports without failing the batch.
//!
//! # Examples
//!
//! ## Built-in catalog
//!
//! ```rust
//! use depend::registry::HandlerRegistry;
//!
//! let registry = HandlerRegistry::with_defaults();
//! assert!(registry.resolve("Terraform").is_some());
//! assert!(registry.resolve("Chocolatey").is_none());
//! ```
//!
//! ## Custom handlers
//!
//! ```rust,no_run
//! use depend::handlers::terraform::TerraformHandler;
//! use depend::registry::HandlerRegistry;
//!
//! let registry = HandlerRegistry::builder()
//!     .register("Terraform", TerraformHandler::default())
//!     .build();
//! ```
//!
//! ## From a configuration resource
//!
//! ```rust,no_run
//! use depend::registry::HandlerRegistry;
//!
//! # fn example() -> depend::core::Result<()> {
//! // handlers.toml:
//! //   [handlers]
//! //   Terraform = "terraform"
//! let registry = HandlerRegistry::from_config_path("handlers.toml")?;
//! # Ok(())
//! # }
//! ```

pub mod config;

pub use config::RegistryConfig;

use crate::core::{DependError, Result};
use crate::handler::DependencyHandler;
use crate::handlers;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Immutable mapping from dependency-type name to handler
///
/// At most one handler per type. Cheap to clone: handlers are shared through
/// [`Arc`].
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: BTreeMap<String, Arc<dyn DependencyHandler>>,
}

impl HandlerRegistry {
    /// Start building a registry programmatically
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// A registry pre-populated with every built-in handler
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut builder = Self::builder();
        for (type_name, id) in handlers::BUILTIN_TYPES {
            let handler = handlers::builtin(id)
                .unwrap_or_else(|| unreachable!("catalog id '{id}' must resolve"));
            builder = builder.register_arc(*type_name, handler);
        }
        builder.build()
    }

    /// Build a registry from an already-parsed configuration map
    ///
    /// Every configured type must name a known built-in handler id; an
    /// unknown id is a fatal [`DependError::ConfigError`], raised here so a
    /// bad registry never reaches dispatch.
    pub fn from_config(config: &RegistryConfig) -> Result<Self> {
        let mut builder = Self::builder();
        for (type_name, id) in &config.handlers {
            let handler = handlers::builtin(id).ok_or_else(|| DependError::ConfigError {
                path: config.origin().to_string(),
                reason: format!("unknown handler id '{id}' for type '{type_name}'"),
            })?;
            builder = builder.register_arc(type_name.clone(), handler);
        }
        Ok(builder.build())
    }

    /// Load a configuration resource from an explicit path and build from it
    ///
    /// The path is always supplied by the caller; the registry never consults
    /// process-wide state to find its configuration.
    pub fn from_config_path(path: impl AsRef<Path>) -> Result<Self> {
        let config = RegistryConfig::load(path.as_ref())?;
        Self::from_config(&config)
    }

    /// Resolve a dependency type to its handler
    ///
    /// `None` means no handler is registered for the type. The dispatcher
    /// turns that into a reported, non-fatal error for the type group.
    #[must_use]
    pub fn resolve(&self, dependency_type: &str) -> Option<Arc<dyn DependencyHandler>> {
        self.handlers.get(dependency_type).cloned()
    }

    /// The dependency-type names this registry can route, sorted
    #[must_use]
    pub fn registered_types(&self) -> Vec<&str> {
        self.handlers.keys().map(String::as_str).collect()
    }

    /// Number of registered types
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether the registry has no handlers at all
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("types", &self.registered_types())
            .finish()
    }
}

/// Builder for [`HandlerRegistry`]
///
/// Registration order does not matter; registering the same type twice keeps
/// the last handler, preserving the at-most-one-handler-per-type invariant.
#[derive(Default)]
pub struct RegistryBuilder {
    handlers: BTreeMap<String, Arc<dyn DependencyHandler>>,
}

impl RegistryBuilder {
    /// Register a handler for a dependency type
    #[must_use]
    pub fn register(
        self,
        dependency_type: impl Into<String>,
        handler: impl DependencyHandler + 'static,
    ) -> Self {
        self.register_arc(dependency_type, Arc::new(handler))
    }

    /// Register an already-shared handler for a dependency type
    #[must_use]
    pub fn register_arc(
        mut self,
        dependency_type: impl Into<String>,
        handler: Arc<dyn DependencyHandler>,
    ) -> Self {
        let dependency_type = dependency_type.into();
        debug!(dependency_type = %dependency_type, "registering handler");
        self.handlers.insert(dependency_type, handler);
        self
    }

    /// Freeze the registrations into an immutable registry
    #[must_use]
    pub fn build(self) -> HandlerRegistry {
        HandlerRegistry {
            handlers: self.handlers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{ACTION_PARAMETER, InvocationParameters};
    use crate::models::DependencyRecord;

    struct NoopHandler;

    impl DependencyHandler for NoopHandler {
        fn accepted_parameters(&self) -> &'static [&'static str] {
            &[ACTION_PARAMETER]
        }

        fn install(&self, _: &DependencyRecord, _: &InvocationParameters) -> Result<()> {
            Ok(())
        }

        fn test(&self, _: &DependencyRecord, _: &InvocationParameters) -> Result<bool> {
            Ok(true)
        }
    }

    #[test]
    fn test_resolve_unknown_type_is_none() {
        let registry = HandlerRegistry::builder().register("Noop", NoopHandler).build();
        assert!(registry.resolve("Noop").is_some());
        assert!(registry.resolve("Git").is_none());
    }

    #[test]
    fn test_last_registration_wins() {
        struct AlwaysFalse;
        impl DependencyHandler for AlwaysFalse {
            fn accepted_parameters(&self) -> &'static [&'static str] {
                &[ACTION_PARAMETER]
            }
            fn install(&self, _: &DependencyRecord, _: &InvocationParameters) -> Result<()> {
                Ok(())
            }
            fn test(&self, _: &DependencyRecord, _: &InvocationParameters) -> Result<bool> {
                Ok(false)
            }
        }

        let registry = HandlerRegistry::builder()
            .register("Noop", NoopHandler)
            .register("Noop", AlwaysFalse)
            .build();
        assert_eq!(registry.len(), 1);

        let handler = registry.resolve("Noop").unwrap();
        let record = DependencyRecord::new("dep", "Noop");
        let params = InvocationParameters::filtered(
            &record,
            handler.accepted_parameters(),
            crate::models::ActionVerb::Test,
        );
        assert_eq!(handler.test(&record, &params).unwrap(), false);
    }

    #[test]
    fn test_with_defaults_routes_terraform() {
        let registry = HandlerRegistry::with_defaults();
        assert!(registry.resolve("Terraform").is_some());
        assert_eq!(registry.registered_types(), vec!["Terraform"]);
    }

    #[test]
    fn test_from_config_rejects_unknown_handler_id() {
        let mut config = RegistryConfig::default();
        config.handlers.insert("Frob".to_string(), "frobnicator".to_string());
        let err = HandlerRegistry::from_config(&config).unwrap_err();
        assert!(matches!(err, DependError::ConfigError { .. }));
        assert!(err.to_string().contains("frobnicator"));
    }
}
