//! JSON route manifests.
//!
//! A manifest declares configuration, routes and resources without code:
//!
//! ```json
//! {
//!   "config": { "namespace_prefix": "App" },
//!   "routes": [
//!     { "path": "/", "handler": "home/index", "name": "home" },
//!     { "path": "/users/{(\\d+):id}", "handler": ["users", "view"],
//!       "filters": [{ "class": "Auth", "method": "check" }] }
//!   ],
//!   "resources": [
//!     { "path": "/posts", "resource": "PostController", "exclude": ["delete"] }
//!   ]
//! }
//! ```
//!
//! Filters can only reference registered `(class, method)` pairs here.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::RouterConfig;
use crate::error::Result;
use crate::filter::Filter;
use crate::request::Method;
use crate::resource::{ResourceRoutes, RestAction};
use crate::route::{Expression, Route};
use crate::table::RouteTable;

/// A handler reference: `"controller/action"` or `["controller", "action"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HandlerSpec {
    /// Textual `controller/action`.
    Text(String),
    /// Explicit pair.
    Pair(String, String),
}

impl From<&HandlerSpec> for Expression {
    fn from(spec: &HandlerSpec) -> Self {
        match spec {
            HandlerSpec::Text(text) => Self::parse(text),
            HandlerSpec::Pair(controller, action) => Self::pair(controller, action),
        }
    }
}

/// A `(class, method)` filter reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterRef {
    /// Filter class identifier.
    pub class: String,
    /// Method on the class.
    pub method: String,
}

impl From<&FilterRef> for Filter {
    fn from(filter: &FilterRef) -> Self {
        Self::method(&filter.class, &filter.method)
    }
}

/// One route declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteEntry {
    /// Pattern path.
    pub path: String,
    /// Handler reference.
    pub handler: HandlerSpec,
    /// HTTP method, GET when absent.
    #[serde(default)]
    pub method: Method,
    /// Route name for reverse lookup.
    #[serde(default)]
    pub name: String,
    /// Controller namespace prefix.
    #[serde(default)]
    pub prefix: String,
    /// Filters, in order.
    #[serde(default)]
    pub filters: Vec<FilterRef>,
}

impl RouteEntry {
    /// Builds the declared route.
    #[must_use]
    pub fn to_route(&self) -> Route {
        Route::new(&self.path, Expression::from(&self.handler))
            .with_method(self.method)
            .with_name(self.name.as_str())
            .with_prefix(self.prefix.as_str())
            .with_filters(self.filters.iter().map(Filter::from).collect())
    }
}

/// One resource declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceEntry {
    /// Base rule.
    pub path: String,
    /// Resource identifier, optionally with a placeholder marker.
    pub resource: String,
    /// Actions left out.
    #[serde(default)]
    pub exclude: Vec<RestAction>,
    /// Declared resource name. Route names keep `resourceName:action`.
    #[serde(default)]
    pub name: String,
    /// Filters attached to every generated route.
    #[serde(default)]
    pub filters: Vec<FilterRef>,
}

impl ResourceEntry {
    /// Builds the resource declaration.
    #[must_use]
    pub fn to_resource(&self) -> ResourceRoutes {
        ResourceRoutes::new(&self.path, &self.resource)
            .exclude(self.exclude.iter().copied())
            .name(self.name.as_str())
            .filters(self.filters.iter().map(Filter::from).collect())
    }
}

/// A parsed manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Manifest {
    /// Dispatcher configuration.
    pub config: RouterConfig,
    /// Routes, registered first and in order.
    pub routes: Vec<RouteEntry>,
    /// Resources, registered after the routes.
    pub resources: Vec<ResourceEntry>,
}

impl Manifest {
    /// Parses a manifest from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`crate::RouterError::Manifest`] when `json` is malformed.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a manifest file.
    ///
    /// # Errors
    ///
    /// Returns [`crate::RouterError::Io`] when the file cannot be read and
    /// [`crate::RouterError::Manifest`] when it is malformed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let manifest = Self::from_json(&text)?;
        info!(
            path = %path.display(),
            routes = manifest.routes.len(),
            resources = manifest.resources.len(),
            "loaded route manifest"
        );
        Ok(manifest)
    }

    /// Builds a route table from the declarations.
    #[must_use]
    pub fn build_table(&self) -> RouteTable {
        let mut table = RouteTable::new();
        table.add_routes(self.routes.iter().map(RouteEntry::to_route));
        for resource in &self.resources {
            table.register_resource(resource.to_resource());
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ActionNotFoundPolicy;

    const MANIFEST: &str = r#"{
        "config": { "namespace_prefix": "App", "action_not_found": "fall_through" },
        "routes": [
            { "path": "/", "handler": "home/index", "name": "home" },
            { "path": "/users/{(\\d+):id}", "handler": ["users", "view"], "method": "put",
              "prefix": "Admin", "filters": [{ "class": "Auth", "method": "check" }] }
        ],
        "resources": [
            {
                "path": "/posts",
                "resource": "PostController",
                "exclude": ["delete", "patch"],
                "name": "posts"
            }
        ]
    }"#;

    #[test]
    fn test_parse_manifest() {
        let manifest = Manifest::from_json(MANIFEST).unwrap();
        assert_eq!(manifest.config.namespace_prefix, "App");
        assert_eq!(manifest.config.action_not_found, ActionNotFoundPolicy::FallThrough);
        assert_eq!(manifest.routes.len(), 2);
        assert_eq!(manifest.routes[0].method, Method::Get);
        assert_eq!(
            manifest.routes[1].handler,
            HandlerSpec::Pair("users".to_string(), "view".to_string())
        );
        assert_eq!(
            manifest.resources[0].exclude,
            [RestAction::Delete, RestAction::Update]
        );
    }

    #[test]
    fn test_build_table() {
        let table = Manifest::from_json(MANIFEST).unwrap().build_table();
        assert_eq!(table.len(), 5);
        assert_eq!(table.reverse_lookup("home", Method::Get, &[]), Some("/".to_string()));
        assert_eq!(
            table.reverse_lookup("PostController:view", Method::Get, &["edit"]),
            Some("/posts/{(\\d+):id}/edit".to_string())
        );
        assert_eq!(table.reverse_lookup("posts:view", Method::Get, &[]), None);

        let found = table.find(Method::Put, "/users/9", false).unwrap();
        assert_eq!(found.route.controller_identifier(), Some("Admin::Users".to_string()));
        assert_eq!(found.route.filters().len(), 1);
    }

    #[test]
    fn test_empty_manifest() {
        let manifest = Manifest::from_json("{}").unwrap();
        assert_eq!(manifest, Manifest::default());
        assert!(manifest.build_table().is_empty());
    }

    #[test]
    fn test_missing_file() {
        let err = Manifest::load("/nonexistent/waypoint.json").unwrap_err();
        assert!(matches!(err, crate::RouterError::Io(_)));
    }
}
