//! Core types and functionality for depend
//!
//! This module forms the foundation of depend's type system. It currently
//! holds the error types shared by the dispatch core, the registry, and the
//! built-in handlers.
//!
//! # Modules
//!
//! ## `error` - Error Handling
//!
//! - [`DependError`] - Enumerated error types covering all depend failure modes
//! - [`Result`] - Convenience alias for `Result<T, DependError>`
//!
//! # Design Principles
//!
//! ## Batch Tolerance
//! Dispatch-time errors identify what to skip (a type group or a single
//! dependency), never whether to abort the batch. See the
//! [`error`] module documentation for the full severity model.
//!
//! ## Type Safety
//! Action verbs, handler contracts, and error variants are all statically
//! typed; there is no stringly-typed dispatch anywhere in the core.

pub mod error;

pub use error::{DependError, Result};
