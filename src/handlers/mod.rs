//! Built-in dependency-type handlers
//!
//! Each submodule implements the
//! [`DependencyHandler`](crate::handler::DependencyHandler) contract for one
//! dependency type. The catalog below maps stable handler ids - the strings a
//! registry configuration resource refers to - onto constructors, and
//! [`BUILTIN_TYPES`] pairs the conventional type names with those ids for
//! [`HandlerRegistry::with_defaults`](crate::registry::HandlerRegistry::with_defaults).
//!
//! Adding a handler means adding a submodule, a catalog arm in [`builtin`],
//! and an entry in [`BUILTIN_TYPES`]. Nothing in the dispatch core changes.

pub mod terraform;

use crate::handler::DependencyHandler;
use std::sync::Arc;

/// Conventional dependency-type name and built-in handler id pairs
///
/// The default registry routes these type names; configuration resources may
/// remap ids to different type names.
pub const BUILTIN_TYPES: &[(&str, &str)] = &[("Terraform", "terraform")];

/// Construct a built-in handler by its catalog id
///
/// `None` for ids outside the catalog; registry loading turns that into a
/// fatal configuration error.
#[must_use]
pub fn builtin(id: &str) -> Option<Arc<dyn DependencyHandler>> {
    match id {
        "terraform" => Some(Arc::new(terraform::TerraformHandler::default())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::ACTION_PARAMETER;

    #[test]
    fn test_every_catalog_id_resolves() {
        for (type_name, id) in BUILTIN_TYPES {
            let handler = builtin(id);
            assert!(handler.is_some(), "catalog id '{id}' for '{type_name}' must resolve");
        }
    }

    #[test]
    fn test_every_builtin_declares_the_action_parameter() {
        for (_, id) in BUILTIN_TYPES {
            let handler = builtin(id).unwrap();
            assert!(handler.accepted_parameters().contains(&ACTION_PARAMETER));
        }
    }

    #[test]
    fn test_unknown_id_is_none() {
        assert!(builtin("chocolatey").is_none());
    }
}
