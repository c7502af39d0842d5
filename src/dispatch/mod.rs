//! The dispatch core: routing dependency records to their handlers
//!
//! This is the orchestration engine of the crate. Given a sequence of
//! [`DependencyRecord`]s and an [`ActionVerb`], the [`Dispatcher`]:
//!
//! 1. Partitions the records by `dependency_type`, preserving first-seen type
//!    order and within-type input order.
//! 2. Resolves each type group's handler through the
//!    [`HandlerRegistry`](crate::registry::HandlerRegistry). An unregistered
//!    type is reported and skipped; the batch continues.
//! 3. Enforces the uniform contract: a handler whose declared parameter set
//!    omits [`ACTION_PARAMETER`] is rejected and its whole type group skipped.
//! 4. For each record, filters the record's parameters against the handler's
//!    declared set (dropped keys are warned about, the record is still
//!    processed), force-sets the action verb, and invokes the handler
//!    synchronously.
//! 5. Aggregates results into a [`DispatchReport`]: Test results in input
//!    order, Import pass-through values, and every error that occurred along
//!    the way.
//!
//! # Failure semantics
//!
//! Nothing short of a caller bug makes `dispatch` fail as a whole: an
//! unresolvable type, a malformed handler, or an individual handler error is
//! recorded in the report and logged to the operator channel, and every other
//! dependency keeps being processed. There is no rollback - each dependency
//! is handled independently and a failure does not unwind previously
//! completed work.
//!
//! # Execution model
//!
//! Strictly sequential: one handler invocation at a time, each blocking the
//! dispatcher until it returns. Handlers may therefore mutate shared
//! resources (filesystem, `PATH`, the temp download cache) without locking.
//! Each `dispatch` call is stateless with respect to prior calls; the
//! registry is the only long-lived state and it is read-only here.
//!
//! # Examples
//!
//! ```rust,no_run
//! use depend::dispatch::Dispatcher;
//! use depend::models::DependencyRecord;
//! use depend::registry::HandlerRegistry;
//!
//! let mut terraform = DependencyRecord::new("terraform", "Terraform");
//! terraform.version = Some("1.2.0".to_string());
//!
//! let dispatcher = Dispatcher::new(HandlerRegistry::with_defaults());
//!
//! // Quiet test: one boolean per valid dependency, in input order
//! let report = dispatcher.test(&[terraform.clone()]);
//! println!("satisfied: {:?}", report.test_flags());
//!
//! // Install: side effects only, errors aggregated in the report
//! let report = dispatcher.install(&[terraform]);
//! for failure in report.failures() {
//!     eprintln!("{}: {}", failure.dependency_type, failure.error);
//! }
//! ```

use crate::core::DependError;
use crate::handler::{ACTION_PARAMETER, InvocationParameters};
use crate::models::{ActionVerb, DependencyRecord, TestedDependency};
use crate::registry::HandlerRegistry;
use tracing::{debug, error};

/// One error that occurred during a dispatch run
///
/// Group-level failures (unresolvable type, malformed handler) carry no
/// dependency name; per-dependency failures name the record that failed.
#[derive(Debug)]
pub struct DispatchFailure {
    /// The dependency type being processed when the error occurred
    pub dependency_type: String,
    /// The failing record's name, or `None` for a whole-group failure
    pub dependency: Option<String>,
    /// What went wrong
    pub error: DependError,
}

/// Aggregated outcome of one dispatch run
///
/// Structured output (Test results, Import pass-through values) is kept
/// separate from the error channel: failures never silently vanish, but they
/// also never halt the batch.
#[derive(Debug)]
pub struct DispatchReport {
    action: ActionVerb,
    invoked: usize,
    failures: Vec<DispatchFailure>,
    tests: Vec<TestedDependency>,
    imports: Vec<serde_json::Value>,
}

impl DispatchReport {
    /// The action verb this report was produced under
    #[must_use]
    pub const fn action(&self) -> ActionVerb {
        self.action
    }

    /// How many handler invocations were made
    ///
    /// Exactly one per record whose type resolved to a contract-conforming
    /// handler; records of skipped type groups are not counted.
    #[must_use]
    pub const fn invoked(&self) -> usize {
        self.invoked
    }

    /// Every error recorded during the run
    #[must_use]
    pub fn failures(&self) -> &[DispatchFailure] {
        &self.failures
    }

    /// Whether any error was recorded
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Test mode, verbose variant: each successfully tested record, copied
    /// and annotated with `dependency_exists`, in input order
    ///
    /// Empty for Install/Import runs.
    #[must_use]
    pub fn tested(&self) -> &[TestedDependency] {
        &self.tests
    }

    /// Test mode, quiet variant: the handlers' raw boolean results, one per
    /// successfully tested record, in input order
    #[must_use]
    pub fn test_flags(&self) -> Vec<bool> {
        self.tests.iter().map(|t| t.dependency_exists).collect()
    }

    /// Import mode: handler-returned values passed through unmodified, in
    /// input order
    ///
    /// Handlers that return nothing contribute nothing here; their effects on
    /// the session are their own business.
    #[must_use]
    pub fn imports(&self) -> &[serde_json::Value] {
        &self.imports
    }
}

/// Routes dependency records to registered handlers
///
/// Stateless apart from the registry it was built with; cheap to clone.
/// See the [module documentation](self) for the dispatch algorithm.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: HandlerRegistry,
}

impl Dispatcher {
    /// Create a dispatcher over an already-built registry
    #[must_use]
    pub const fn new(registry: HandlerRegistry) -> Self {
        Self { registry }
    }

    /// The registry this dispatcher routes through
    #[must_use]
    pub const fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Install every record's dependency
    #[must_use]
    pub fn install(&self, records: &[DependencyRecord]) -> DispatchReport {
        self.dispatch(records, ActionVerb::Install)
    }

    /// Test whether each record's dependency is already satisfied
    #[must_use]
    pub fn test(&self, records: &[DependencyRecord]) -> DispatchReport {
        self.dispatch(records, ActionVerb::Test)
    }

    /// Import each record's dependency into the current session
    #[must_use]
    pub fn import(&self, records: &[DependencyRecord]) -> DispatchReport {
        self.dispatch(records, ActionVerb::Import)
    }

    /// Run one dispatch batch with the given action verb
    ///
    /// Never returns an error: everything that goes wrong is logged and
    /// recorded in the report, and processing continues with the next
    /// dependency or type group.
    #[must_use]
    pub fn dispatch(&self, records: &[DependencyRecord], action: ActionVerb) -> DispatchReport {
        let mut failures = Vec::new();
        let mut invoked = 0usize;
        // Keyed by original input index so structured output can be emitted
        // in input order even though processing is grouped by type.
        let mut tests: Vec<(usize, TestedDependency)> = Vec::new();
        let mut imports: Vec<(usize, serde_json::Value)> = Vec::new();

        for (type_name, indices) in group_by_type(records) {
            let Some(handler) = self.registry.resolve(type_name) else {
                let err = DependError::HandlerNotFound {
                    dependency_type: type_name.to_string(),
                };
                error!(dependency_type = %type_name, skipped = indices.len(), "{err}");
                failures.push(DispatchFailure {
                    dependency_type: type_name.to_string(),
                    dependency: None,
                    error: err,
                });
                continue;
            };

            let accepted = handler.accepted_parameters();
            if !accepted.contains(&ACTION_PARAMETER) {
                let err = DependError::MalformedHandler {
                    dependency_type: type_name.to_string(),
                };
                error!(dependency_type = %type_name, skipped = indices.len(), "{err}");
                failures.push(DispatchFailure {
                    dependency_type: type_name.to_string(),
                    dependency: None,
                    error: err,
                });
                continue;
            }

            for idx in indices {
                let record = &records[idx];
                let params = InvocationParameters::filtered(record, accepted, action);
                debug!(
                    dependency = %record.name,
                    dependency_type = %type_name,
                    action = %action,
                    "invoking handler"
                );
                invoked += 1;

                let outcome = match action {
                    ActionVerb::Install => handler.install(record, &params),
                    ActionVerb::Test => handler.test(record, &params).map(|exists| {
                        tests.push((
                            idx,
                            TestedDependency {
                                dependency: record.clone(),
                                dependency_exists: exists,
                            },
                        ));
                    }),
                    ActionVerb::Import => handler.import(record, &params).map(|value| {
                        if let Some(value) = value {
                            imports.push((idx, value));
                        }
                    }),
                };

                if let Err(err) = outcome {
                    error!(
                        dependency = %record.name,
                        dependency_type = %type_name,
                        action = %action,
                        "handler failed: {err}"
                    );
                    failures.push(DispatchFailure {
                        dependency_type: type_name.to_string(),
                        dependency: Some(record.name.clone()),
                        error: err,
                    });
                }
            }
        }

        tests.sort_by_key(|(idx, _)| *idx);
        imports.sort_by_key(|(idx, _)| *idx);

        DispatchReport {
            action,
            invoked,
            failures,
            tests: tests.into_iter().map(|(_, t)| t).collect(),
            imports: imports.into_iter().map(|(_, v)| v).collect(),
        }
    }
}

/// Partition record indices by dependency type
///
/// Groups appear in first-seen order; indices within a group keep input
/// order.
fn group_by_type(records: &[DependencyRecord]) -> Vec<(&str, Vec<usize>)> {
    let mut groups: Vec<(&str, Vec<usize>)> = Vec::new();
    for (idx, record) in records.iter().enumerate() {
        match groups.iter_mut().find(|(t, _)| *t == record.dependency_type) {
            Some((_, indices)) => indices.push(idx),
            None => groups.push((record.dependency_type.as_str(), vec![idx])),
        }
    }
    groups
}
