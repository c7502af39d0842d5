//! The uniform handler contract every dependency type implements
//!
//! A handler is the type-specific unit of logic behind one dependency type:
//! the Terraform handler knows how to install and test a Terraform binary, a
//! hypothetical git handler would know how to clone a repository, and so on.
//! The [`Dispatcher`](crate::dispatch::Dispatcher) treats all of them through
//! one trait, [`DependencyHandler`], and never looks inside.
//!
//! # The contract
//!
//! Every handler provides three pieces:
//!
//! 1. **A declared parameter schema** ([`DependencyHandler::accepted_parameters`]):
//!    the exact set of per-dependency parameter names the handler understands.
//!    The dispatcher filters each record's free-form parameters against this
//!    set before invocation, so handlers never see keys they did not declare.
//!    The schema **must** include [`ACTION_PARAMETER`]; a handler that omits it
//!    is rejected at dispatch time and all dependencies of its type are
//!    skipped. This declaration replaces the runtime signature reflection a
//!    dynamic language would use.
//! 2. **Action methods** ([`install`](DependencyHandler::install),
//!    [`test`](DependencyHandler::test), [`import`](DependencyHandler::import)):
//!    one per action verb. Install and import are fire-and-forget; test
//!    returns whether the dependency is already satisfied. Handlers that do
//!    not support import keep the default implementation, which fails the
//!    individual dependency with
//!    [`DependError::UnsupportedAction`](crate::core::DependError::UnsupportedAction).
//! 3. **Synchronous execution**: handlers block the dispatcher until they
//!    return. Shared resources (filesystem, the `PATH` variable, the temp
//!    download cache) are mutated without locking, which is sound only under
//!    this sequential model.
//!
//! # Examples
//!
//! ```rust
//! use depend::core::Result;
//! use depend::handler::{ACTION_PARAMETER, DependencyHandler, InvocationParameters};
//! use depend::models::DependencyRecord;
//!
//! struct TouchFile;
//!
//! impl DependencyHandler for TouchFile {
//!     fn accepted_parameters(&self) -> &'static [&'static str] {
//!         &[ACTION_PARAMETER]
//!     }
//!
//!     fn install(&self, dep: &DependencyRecord, _params: &InvocationParameters) -> Result<()> {
//!         let target = dep.target.clone().unwrap_or_else(|| dep.name.clone().into());
//!         std::fs::write(target, b"")?;
//!         Ok(())
//!     }
//!
//!     fn test(&self, dep: &DependencyRecord, _params: &InvocationParameters) -> Result<bool> {
//!         let target = dep.target.clone().unwrap_or_else(|| dep.name.clone().into());
//!         Ok(target.exists())
//!     }
//! }
//! ```

use crate::core::{DependError, Result};
use crate::models::{ActionVerb, DependencyRecord, ParameterMap};
use tracing::warn;

/// The parameter name carrying the action verb into every invocation
///
/// Part of the uniform contract: every handler must list this name in its
/// [`accepted_parameters`](DependencyHandler::accepted_parameters), and the
/// dispatcher force-sets its value to the current verb on every invocation,
/// overwriting anything the caller supplied for the same key.
pub const ACTION_PARAMETER: &str = "action";

/// One dependency type's implementation of Install/Test/Import
///
/// Implementations are registered into a
/// [`HandlerRegistry`](crate::registry::HandlerRegistry) under the type name
/// they serve. See the [module documentation](self) for the full contract.
pub trait DependencyHandler: Send + Sync {
    /// The exact set of parameter names this handler accepts
    ///
    /// Must include [`ACTION_PARAMETER`]. Static for the lifetime of the
    /// handler; the dispatcher may consult it once per type group per batch.
    fn accepted_parameters(&self) -> &'static [&'static str];

    /// Perform the type-specific installation
    ///
    /// Must be idempotent: installing an already-satisfied dependency is a
    /// successful no-op.
    fn install(&self, dep: &DependencyRecord, params: &InvocationParameters) -> Result<()>;

    /// Check whether the dependency is already satisfied
    fn test(&self, dep: &DependencyRecord, params: &InvocationParameters) -> Result<bool>;

    /// Import the dependency into the current session
    ///
    /// The returned value, if any, is passed through to the caller unmodified.
    /// The default implementation rejects the action; only handlers whose
    /// dependency type has import semantics override it.
    fn import(
        &self,
        dep: &DependencyRecord,
        _params: &InvocationParameters,
    ) -> Result<Option<serde_json::Value>> {
        Err(DependError::UnsupportedAction {
            dependency_type: dep.dependency_type.clone(),
            action: ActionVerb::Import.as_str().to_string(),
        })
    }
}

/// The structured argument set passed to a handler invocation
///
/// Built by the dispatcher for each dependency record: the record's free-form
/// parameters filtered against the handler's declared schema, with the action
/// verb force-set under [`ACTION_PARAMETER`]. Handlers read their options
/// through the typed accessors and build their own option structs from them.
#[derive(Debug, Clone)]
pub struct InvocationParameters {
    action: ActionVerb,
    values: ParameterMap,
}

impl InvocationParameters {
    /// Filter a record's parameters against a handler's declared schema
    ///
    /// Keys outside `accepted` are dropped with a warning naming the rejected
    /// key, its value, and the valid parameter list; the dependency is still
    /// invoked with the remaining valid parameters. The action verb is then
    /// force-set, overwriting any caller-supplied value for
    /// [`ACTION_PARAMETER`].
    #[must_use]
    pub fn filtered(
        record: &DependencyRecord,
        accepted: &[&str],
        action: ActionVerb,
    ) -> Self {
        let mut values = ParameterMap::new();
        for (key, value) in &record.parameters {
            if accepted.contains(&key.as_str()) && key != ACTION_PARAMETER {
                values.insert(key.clone(), value.clone());
            } else if key != ACTION_PARAMETER {
                warn!(
                    dependency = %record.name,
                    parameter = %key,
                    value = %value,
                    valid = ?accepted,
                    "dropping parameter the handler does not accept"
                );
            }
        }
        values.insert(
            ACTION_PARAMETER.to_string(),
            serde_json::Value::String(action.as_str().to_string()),
        );
        Self { action, values }
    }

    /// The action verb of the current dispatch, always equal to the mode the
    /// caller selected
    #[must_use]
    pub const fn action(&self) -> ActionVerb {
        self.action
    }

    /// Raw lookup of a parameter value
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.values.get(name)
    }

    /// A parameter as a string, if present and string-valued
    #[must_use]
    pub fn str_param(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(serde_json::Value::as_str)
    }

    /// A parameter as a boolean, if present and boolean-valued
    #[must_use]
    pub fn bool_param(&self, name: &str) -> Option<bool> {
        self.values.get(name).and_then(serde_json::Value::as_bool)
    }

    /// The full filtered parameter map, action verb included
    #[must_use]
    pub const fn values(&self) -> &ParameterMap {
        &self.values
    }
}
