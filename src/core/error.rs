//! Error handling for depend
//!
//! This module provides the error types used across the dispatch core and the
//! built-in handlers. The error system is designed around two core principles:
//! 1. **Strongly-typed errors** for precise error handling in code
//! 2. **Batch tolerance** - most dispatch-time errors are recorded and reported
//!    without aborting the surrounding batch
//!
//! # Error Categories
//!
//! Depend errors are organized into several categories:
//! - **Dispatch**: [`DependError::HandlerNotFound`], [`DependError::MalformedHandler`],
//!   [`DependError::UnsupportedAction`]
//! - **Handler Execution**: [`DependError::InvalidVersion`], [`DependError::DownloadFailed`],
//!   [`DependError::ExtractionFailed`], [`DependError::ProbeFailed`]
//! - **Configuration**: [`DependError::ConfigError`], [`DependError::TomlError`]
//! - **File System**: [`DependError::IoError`]
//!
//! # Severity Model
//!
//! The [`Dispatcher`](crate::dispatch::Dispatcher) never converts a
//! per-dependency or per-type error into a batch failure: dispatch-category
//! errors mark a whole type group as skipped, handler-execution errors mark a
//! single dependency as failed, and in both cases sibling dependencies continue
//! to be processed. Only configuration errors - raised while a
//! [`HandlerRegistry`](crate::registry::HandlerRegistry) is being loaded,
//! before any dispatch - are fatal to the caller.
//!
//! # Examples
//!
//! ```rust
//! use depend::core::DependError;
//!
//! fn report(error: &DependError) {
//!     match error {
//!         DependError::HandlerNotFound { dependency_type } => {
//!             eprintln!("no handler for '{dependency_type}' - check the registry config");
//!         }
//!         DependError::DownloadFailed { url, .. } => {
//!             eprintln!("download failed for {url}: check your connection");
//!         }
//!         other => eprintln!("{other}"),
//!     }
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for depend operations
///
/// Each variant represents a specific failure mode and carries the context
/// needed to report it: the dependency type that could not be routed, the URL
/// that failed to download, the version string that failed to parse.
///
/// Variants in the dispatch category are produced by the
/// [`Dispatcher`](crate::dispatch::Dispatcher) itself; handler-execution
/// variants are produced by individual handlers such as
/// [`TerraformHandler`](crate::handlers::terraform::TerraformHandler).
#[derive(Error, Debug)]
pub enum DependError {
    /// No handler is registered for a dependency type
    ///
    /// Raised once per unrouteable type group during dispatch. Non-fatal to
    /// the batch: all dependencies of the type are skipped and reported, and
    /// dispatch continues with the remaining type groups.
    #[error("DependencyType {dependency_type} is not defined")]
    HandlerNotFound {
        /// The dependency type with no registry entry
        dependency_type: String,
    },

    /// A registered handler does not declare the action-verb parameter
    ///
    /// Every handler must include [`ACTION_PARAMETER`](crate::handler::ACTION_PARAMETER)
    /// in its declared parameter set; that declaration is the uniform-contract
    /// enforcement point. A handler without it is rejected outright and all
    /// dependencies of its type are skipped.
    #[error("Handler for {dependency_type} does not accept the '{action_parameter}' parameter", action_parameter = crate::handler::ACTION_PARAMETER)]
    MalformedHandler {
        /// The dependency type whose handler violates the contract
        dependency_type: String,
    },

    /// A handler was asked to perform an action it does not implement
    ///
    /// Most handlers are install/test only; invoking Import on one of them
    /// fails the individual dependency with this error.
    #[error("Handler for {dependency_type} does not support the {action} action")]
    UnsupportedAction {
        /// The dependency type whose handler rejected the action
        dependency_type: String,
        /// The rejected action verb, as its wire string
        action: String,
    },

    /// A dependency's requested version is not a valid semantic version
    #[error("Dependency '{name}' has invalid version '{version}'")]
    InvalidVersion {
        /// Name of the dependency carrying the bad version
        name: String,
        /// The version string that failed to parse
        version: String,
        /// The underlying semver parse error
        #[source]
        source: semver::Error,
    },

    /// An artifact download failed
    ///
    /// Covers both transport errors and non-success HTTP status codes. Fatal
    /// to the single dependency being installed, not to the batch.
    #[error("Failed to download {url}: {reason}")]
    DownloadFailed {
        /// The URL that could not be downloaded
        url: String,
        /// Transport error or HTTP status description
        reason: String,
    },

    /// A downloaded archive could not be extracted
    #[error("Failed to extract archive {archive}")]
    ExtractionFailed {
        /// Path of the archive that failed to extract
        archive: PathBuf,
        /// The underlying zip error
        #[source]
        source: zip::result::ZipError,
    },

    /// Probing an installed tool for its version failed
    ///
    /// Raised when the tool executable exists on the search path but its
    /// version output could not be obtained or parsed. A missing executable is
    /// not an error - it simply means "not installed".
    #[error("Failed to probe installed version of {tool}: {reason}")]
    ProbeFailed {
        /// The tool being probed (e.g. "terraform")
        tool: String,
        /// What went wrong while invoking or parsing
        reason: String,
    },

    /// A registry configuration resource is invalid
    ///
    /// Raised while loading a [`RegistryConfig`](crate::registry::RegistryConfig),
    /// for example when a type name maps to an unknown built-in handler id.
    /// Fatal: an invalid registry is rejected before any dispatch runs.
    #[error("Invalid registry configuration {path}: {reason}")]
    ConfigError {
        /// Path of the configuration resource
        path: String,
        /// Description of the problem
        reason: String,
    },

    /// I/O operation failed
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// TOML parsing failed
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Catch-all for other errors with context
    #[error("{message}")]
    Other {
        /// Description of the error
        message: String,
    },
}

impl DependError {
    /// Whether this error skips a whole type group during dispatch
    ///
    /// Group-level errors ([`HandlerNotFound`](Self::HandlerNotFound) and
    /// [`MalformedHandler`](Self::MalformedHandler)) are raised once per type
    /// and imply that no handler was invoked for any dependency of that type.
    /// Everything else is scoped to a single dependency.
    #[must_use]
    pub const fn skips_type_group(&self) -> bool {
        matches!(self, Self::HandlerNotFound { .. } | Self::MalformedHandler { .. })
    }
}

/// Convenience result type used throughout the crate
pub type Result<T> = std::result::Result<T, DependError>;
