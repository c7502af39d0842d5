//! depend - declarative dependency dispatch
//!
//! A small plugin-routing engine for manifest-driven dependency management:
//! given a sequence of named dependency records (each tagged with a type such
//! as a package, a file download, or a versioned binary tool like Terraform),
//! depend routes every record to the handler registered for its type and
//! either **installs** it, **tests** whether it is already satisfied, or
//! **imports** it into the current session.
//!
//! # Architecture Overview
//!
//! depend follows a registry/dispatch model where:
//! - a [`HandlerRegistry`](registry::HandlerRegistry) holds the static
//!   mapping from dependency-type name to handler, loaded once and read-only
//!   afterwards
//! - a [`Dispatcher`](dispatch::Dispatcher) groups incoming records by type,
//!   validates each record's parameters against the handler's declared
//!   schema, invokes the handler with a normalized action verb, and
//!   aggregates results
//! - every handler implements one uniform contract,
//!   [`DependencyHandler`](handler::DependencyHandler), so the core never
//!   needs to understand what a handler does internally
//!
//! ## Key Properties
//!
//! - **Partial-failure tolerance**: an unknown dependency type, a
//!   contract-violating handler, or a failing installation is reported and
//!   skipped; every other dependency keeps being processed
//! - **Lenient parameters**: record parameters a handler does not declare are
//!   dropped with a warning, never failing the dependency
//! - **Normalized action verb**: handlers always observe the dispatcher's
//!   action verb, regardless of anything the caller supplied for that key
//! - **Sequential execution**: handlers run one at a time and may touch
//!   shared resources (filesystem, `PATH`, the download cache) freely
//!
//! # Core Modules
//!
//! - [`core`] - Error types shared across the crate
//! - [`models`] - Dependency records, action verbs, and Test annotations
//! - [`handler`] - The uniform handler contract and invocation parameters
//! - [`registry`] - Type-name to handler mapping and its configuration
//! - [`dispatch`] - The orchestration core
//! - [`handlers`] - Built-in handlers (Terraform)
//! - [`utils`] - Platform naming and search-path helpers
//!
//! # Example
//!
//! ```rust,no_run
//! use depend::dispatch::Dispatcher;
//! use depend::models::DependencyRecord;
//! use depend::registry::HandlerRegistry;
//!
//! // Records normally come from an external manifest resolver
//! let mut terraform = DependencyRecord::new("terraform", "Terraform");
//! terraform.version = Some("1.2.0".to_string());
//! terraform.add_to_path = true;
//!
//! let dispatcher = Dispatcher::new(HandlerRegistry::with_defaults());
//!
//! // Is everything already satisfied?
//! let report = dispatcher.test(&[terraform.clone()]);
//! if report.test_flags().iter().all(|satisfied| *satisfied) {
//!     println!("nothing to do");
//! } else {
//!     // Install whatever is missing; failures are aggregated, not thrown
//!     let report = dispatcher.install(&[terraform]);
//!     for failure in report.failures() {
//!         eprintln!("{}: {}", failure.dependency_type, failure.error);
//!     }
//! }
//! ```
//!
//! # Registry Configuration
//!
//! Callers that want manifest-controlled routing load the registry from an
//! explicit TOML resource instead of the built-in defaults:
//!
//! ```toml
//! [handlers]
//! Terraform = "terraform"
//! ```
//!
//! ```rust,no_run
//! use depend::registry::HandlerRegistry;
//!
//! # fn example() -> depend::core::Result<()> {
//! let registry = HandlerRegistry::from_config_path("handlers.toml")?;
//! # Ok(())
//! # }
//! ```

// Core functionality modules
pub mod core;
pub mod dispatch;
pub mod handler;
pub mod registry;

// Data models
pub mod models;

// Built-in handlers
pub mod handlers;

// Supporting modules
pub mod utils;

pub use crate::core::{DependError, Result};
pub use crate::dispatch::{DispatchFailure, DispatchReport, Dispatcher};
pub use crate::handler::{ACTION_PARAMETER, DependencyHandler, InvocationParameters};
pub use crate::models::{ActionVerb, DependencyRecord, ParameterMap, TestedDependency};
pub use crate::registry::{HandlerRegistry, RegistryBuilder, RegistryConfig};
