//! Controllers and the registry that resolves them by identifier.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::filter::RequestFilter;
use crate::outcome::Outcome;
use crate::request::Request;
use crate::resolver::Signature;
use crate::response::Response;

/// Everything an action receives when it is invoked.
pub struct Invocation<'a> {
    /// Request carrier, as the filters left it.
    pub request: &'a mut Request,
    /// Response carrier, as the filters left it.
    pub response: &'a mut Response,
    /// Constructor-time arguments, in [`Controller::constructor`] order.
    pub constructor: Vec<Value>,
    /// Action arguments, in the action's signature order.
    pub args: Vec<Value>,
}

/// A controller exposing named actions.
///
/// # Example
///
/// ```
/// use waypoint_router::{Controller, Invocation, Outcome, Param, Signature};
///
/// struct Users;
///
/// impl Controller for Users {
///     fn action(&self, action: &str) -> Option<Signature> {
///         match action {
///             "view" => Some(Signature::new(vec![Param::integer("id")])),
///             _ => None,
///         }
///     }
///
///     fn invoke(&self, _action: &str, call: Invocation<'_>) -> Option<Outcome> {
///         Some(format!("user {}", call.args[0]).into())
///     }
/// }
/// ```
pub trait Controller: Send + Sync {
    /// Parameters the controller needs at construction time.
    fn constructor(&self) -> Signature {
        Signature::default()
    }

    /// Returns the signature of `action`, or `None` when there is no such
    /// action.
    fn action(&self, action: &str) -> Option<Signature>;

    /// Runs `action`. `None` means the response carrier is the result.
    fn invoke(&self, action: &str, call: Invocation<'_>) -> Option<Outcome>;
}

/// Looks up controllers and filter methods by identifier.
pub trait ControllerRegistry: Send + Sync {
    /// Resolves a controller identifier.
    fn resolve_controller(&self, identifier: &str) -> Option<Arc<dyn Controller>>;

    /// Resolves a `(class, method)` filter reference.
    fn resolve_filter(&self, _class: &str, _method: &str) -> Option<Arc<dyn RequestFilter>> {
        None
    }
}

/// A map-backed [`ControllerRegistry`].
#[derive(Default, Clone)]
pub struct Registry {
    controllers: HashMap<String, Arc<dyn Controller>>,
    filters: HashMap<(String, String), Arc<dyn RequestFilter>>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a controller under `identifier`.
    #[must_use]
    pub fn controller(
        mut self,
        identifier: impl Into<String>,
        controller: impl Controller + 'static,
    ) -> Self {
        self.controllers
            .insert(identifier.into(), Arc::new(controller));
        self
    }

    /// Registers a filter method under `(class, method)`.
    #[must_use]
    pub fn filter(
        mut self,
        class: impl Into<String>,
        method: impl Into<String>,
        filter: impl RequestFilter + 'static,
    ) -> Self {
        self.filters
            .insert((class.into(), method.into()), Arc::new(filter));
        self
    }

    /// Returns `true` if `identifier` is registered.
    #[must_use]
    pub fn contains(&self, identifier: &str) -> bool {
        self.controllers.contains_key(identifier)
    }
}

impl ControllerRegistry for Registry {
    fn resolve_controller(&self, identifier: &str) -> Option<Arc<dyn Controller>> {
        self.controllers.get(identifier).cloned()
    }

    fn resolve_filter(&self, class: &str, method: &str) -> Option<Arc<dyn RequestFilter>> {
        self.filters
            .get(&(class.to_string(), method.to_string()))
            .cloned()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut controllers: Vec<_> = self.controllers.keys().collect();
        controllers.sort();
        f.debug_struct("Registry")
            .field("controllers", &controllers)
            .field("filters", &self.filters.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ping;

    impl Controller for Ping {
        fn action(&self, action: &str) -> Option<Signature> {
            (action == "invoke").then(Signature::default)
        }

        fn invoke(&self, _action: &str, _call: Invocation<'_>) -> Option<Outcome> {
            Some("pong".into())
        }
    }

    #[test]
    fn test_registry_lookup_is_exact() {
        let registry = Registry::new().controller("PingController", Ping);
        assert!(registry.resolve_controller("PingController").is_some());
        assert!(registry.resolve_controller("Ping").is_none());
        assert!(registry.resolve_controller("pingcontroller").is_none());
        assert!(registry.contains("PingController"));
    }

    #[test]
    fn test_default_registry_has_no_filters() {
        struct Bare;
        impl ControllerRegistry for Bare {
            fn resolve_controller(&self, _identifier: &str) -> Option<Arc<dyn Controller>> {
                None
            }
        }
        assert!(Bare.resolve_filter("Any", "thing").is_none());
    }
}
