//! # waypoint-router
//!
//! Request routing and controller dispatch.
//!
//! This crate provides:
//! - Declarative path patterns with typed captures (`{(\d+):id}`)
//! - Per-method route tables with first-match-wins ordering
//! - Named routes for reverse lookup
//! - REST resource expansion
//! - Filter chains that can short-circuit a request
//! - Controller resolution with suffix and namespace fallbacks
//! - Parameter resolution from url params, query and body
//!
//! ## Quick Start
//!
//! ```
//! use waypoint_router::{
//!     Controller, Dispatcher, Invocation, Method, Outcome, Param, Registry, RouteTable,
//!     Signature,
//! };
//!
//! struct Users;
//!
//! impl Controller for Users {
//!     fn action(&self, action: &str) -> Option<Signature> {
//!         match action {
//!             "view" => Some(Signature::new(vec![Param::integer("id")])),
//!             _ => None,
//!         }
//!     }
//!
//!     fn invoke(&self, _action: &str, call: Invocation<'_>) -> Option<Outcome> {
//!         Some(format!("user #{}", call.args[0]).into())
//!     }
//! }
//!
//! let mut table = RouteTable::new();
//! table.register("/users/{(\\d+):id}", "users/view", Method::Get, vec![], "user");
//!
//! let dispatcher = Dispatcher::new(&table, Registry::new().controller("UsersController", Users));
//! let outcome = dispatcher.handle(Method::Get, "/users/42").unwrap();
//! assert_eq!(outcome.body_string(), Some("user #42".to_string()));
//!
//! assert_eq!(
//!     table.reverse_lookup("user", Method::Get, &[]),
//!     Some("/users/{(\\d+):id}".to_string())
//! );
//! ```
//!
//! ## Path Patterns
//!
//! A token is `{<capture>:<name>}` where the capture is a parenthesized
//! regular expression. Everything else is literal:
//!
//! ```
//! use waypoint_router::PathPattern;
//!
//! let pattern = PathPattern::new("/posts/{(\\d+):year}/{([a-z-]+):slug}");
//! assert_eq!(pattern.param_keys(), ["year", "slug"]);
//! assert_eq!(
//!     pattern.captures("/posts/2024/hello-world", false),
//!     Some(vec!["2024".to_string(), "hello-world".to_string()])
//! );
//! ```
//!
//! ## Resources
//!
//! ```
//! use waypoint_router::{Method, ResourceRoutes, RestAction, RouteTable};
//!
//! let mut table = RouteTable::new();
//! table.register_resource(
//!     ResourceRoutes::new("/photos", "PhotoController").exclude([RestAction::Delete]),
//! );
//!
//! assert!(table.find(Method::Put, "/photos/3", false).is_some());
//! assert!(table.find(Method::Delete, "/photos/3", false).is_none());
//! ```
//!
//! ## Filters
//!
//! ```
//! use waypoint_router::{
//!     Dispatcher, Expression, Filter, Method, Registry, Request, Response, Route, RouteTable,
//! };
//!
//! let mut table = RouteTable::new();
//! table.add_route(
//!     Route::new("/admin", Expression::direct(|_, _, _| Some("welcome".into())))
//!         .with_filter(Filter::from_fn(|req: &mut Request, res: &mut Response| {
//!             let allowed = req.get_header("x-token").is_some();
//!             if !allowed {
//!                 res.status = 401;
//!             }
//!             allowed
//!         })),
//! );
//!
//! let dispatcher = Dispatcher::new(&table, Registry::new());
//! assert_eq!(dispatcher.handle(Method::Get, "/admin").unwrap().status(), Some(401));
//! ```

mod config;
mod controller;
mod dispatcher;
mod error;
mod filter;
mod manifest;
mod outcome;
mod pattern;
mod request;
mod resolver;
mod resource;
mod response;
mod route;
mod table;

pub use config::{ActionNotFoundPolicy, RouterConfig};
pub use controller::{Controller, ControllerRegistry, Invocation, Registry};
pub use dispatcher::{Dispatcher, ErrorHandler};
pub use error::{Result, RouterError};
pub use filter::{Filter, FilterChain, RequestFilter, Verdict};
pub use manifest::{FilterRef, HandlerSpec, Manifest, ResourceEntry, RouteEntry};
pub use outcome::Outcome;
pub use pattern::PathPattern;
pub use request::{decode_path, Method, Request, UrlParams};
pub use resolver::{
    DeclaredParameterResolver, Param, ParamKind, ParamPool, ParameterResolver, ResolveTarget,
    ResolvedArgs, Signature,
};
pub use resource::{method_for_action, ResourceRoutes, RestAction, DEFAULT_ID_PLACEHOLDER};
pub use response::Response;
pub use route::{
    DirectHandler, Expression, Route, CONTROLLER_SUFFIX, DEFAULT_ACTION, NAMESPACE_SEPARATOR,
};
pub use table::{RouteGroup, RouteMatch, RouteTable};
