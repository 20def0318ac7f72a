//! The per-method route table.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::filter::Filter;
use crate::request::Method;
use crate::resource::ResourceRoutes;
use crate::route::{Expression, Route};

#[derive(Debug, Default)]
struct MethodRoutes {
    /// Every route, anonymous or named, in registration order.
    ordered: Vec<Route>,
    /// Name to index into `ordered`; the last registration of a name wins.
    named: HashMap<String, usize>,
}

/// A matched route and the values its pattern captured.
#[derive(Debug)]
pub struct RouteMatch<'a> {
    /// The first route whose pattern matched.
    pub route: &'a Route,
    /// Captured values in parameter order.
    pub captures: Vec<String>,
}

/// A group of routes sharing a path prefix and filters.
#[derive(Debug, Default)]
pub struct RouteGroup {
    prefix: String,
    routes: Vec<Route>,
    filters: Vec<Filter>,
}

impl RouteGroup {
    /// Creates a new route group with the given path prefix.
    #[must_use]
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            ..Self::default()
        }
    }

    /// Adds a route; its path is relative to the group prefix.
    #[must_use]
    pub fn route(mut self, route: Route) -> Self {
        self.routes.push(route);
        self
    }

    /// Adds a GET route.
    #[must_use]
    pub fn get(self, path: &str, expression: impl Into<Expression>) -> Self {
        self.route(Route::new(path, expression))
    }

    /// Adds a POST route.
    #[must_use]
    pub fn post(self, path: &str, expression: impl Into<Expression>) -> Self {
        self.route(Route::new(path, expression).with_method(Method::Post))
    }

    /// Adds every route of a resource declaration.
    #[must_use]
    pub fn resource(mut self, resource: ResourceRoutes) -> Self {
        self.routes.extend(resource.into_routes());
        self
    }

    /// Adds a filter that runs before each route's own filters.
    #[must_use]
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Returns the routes with the prefix and group filters applied.
    #[must_use]
    pub fn into_routes(self) -> Vec<Route> {
        let Self {
            prefix,
            routes,
            filters,
        } = self;
        routes
            .into_iter()
            .map(|route| {
                let mut combined = filters.clone();
                combined.extend(route.filters().iter().cloned());
                route.rebase(&prefix).with_filters(combined)
            })
            .collect()
    }
}

/// Routes keyed by method.
///
/// Registration takes `&mut self` and happens before dispatch; matching and
/// reverse lookup only need `&self`.
#[derive(Debug, Default)]
pub struct RouteTable {
    methods: HashMap<Method, MethodRoutes>,
}

impl RouteTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a route.
    ///
    /// An empty `name` registers an anonymous route.
    pub fn register(
        &mut self,
        path: &str,
        expression: impl Into<Expression>,
        method: Method,
        filters: Vec<Filter>,
        name: &str,
    ) {
        self.add_route(
            Route::new(path, expression)
                .with_method(method)
                .with_filters(filters)
                .with_name(name),
        );
    }

    /// Registers an anonymous GET route.
    pub fn get(&mut self, path: &str, expression: impl Into<Expression>) -> &mut Self {
        self.add_route(Route::new(path, expression));
        self
    }

    /// Registers an anonymous POST route.
    pub fn post(&mut self, path: &str, expression: impl Into<Expression>) -> &mut Self {
        self.add_route(Route::new(path, expression).with_method(Method::Post));
        self
    }

    /// Registers an anonymous PUT route.
    pub fn put(&mut self, path: &str, expression: impl Into<Expression>) -> &mut Self {
        self.add_route(Route::new(path, expression).with_method(Method::Put));
        self
    }

    /// Registers an anonymous PATCH route.
    pub fn patch(&mut self, path: &str, expression: impl Into<Expression>) -> &mut Self {
        self.add_route(Route::new(path, expression).with_method(Method::Patch));
        self
    }

    /// Registers an anonymous DELETE route.
    pub fn delete(&mut self, path: &str, expression: impl Into<Expression>) -> &mut Self {
        self.add_route(Route::new(path, expression).with_method(Method::Delete));
        self
    }

    /// Registers a fully built route under its own method.
    pub fn add_route(&mut self, route: Route) {
        let method = route.method();
        let entry = self.methods.entry(method).or_default();
        let index = entry.ordered.len();
        if !route.name().is_empty() {
            if let Some(previous) = entry.named.insert(route.name().to_string(), index) {
                debug!(
                    name = route.name(),
                    %method,
                    previous,
                    "route name re-registered, reverse lookup now uses the newer route"
                );
            }
        }
        debug!(
            %method,
            path = route.path(),
            handler = %route.expression_display(),
            name = route.name(),
            "registered route"
        );
        entry.ordered.push(route);
    }

    /// Registers routes in iteration order.
    pub fn add_routes(&mut self, routes: impl IntoIterator<Item = Route>) {
        for route in routes {
            self.add_route(route);
        }
    }

    /// Registers every route of a group.
    pub fn add_group(&mut self, group: RouteGroup) {
        self.add_routes(group.into_routes());
    }

    /// Expands and registers a REST resource.
    pub fn register_resource(&mut self, resource: ResourceRoutes) {
        self.add_routes(resource.into_routes());
    }

    /// Returns the registered path of a named route with `segments` appended.
    ///
    /// No placeholder substitution happens: each segment is appended after a
    /// `/`.
    ///
    /// # Example
    ///
    /// ```
    /// use waypoint_router::{Method, RouteTable};
    ///
    /// let mut table = RouteTable::new();
    /// table.register("/posts", "post/list", Method::Get, vec![], "posts");
    ///
    /// assert_eq!(table.reverse_lookup("posts", Method::Get, &[]), Some("/posts".to_string()));
    /// assert_eq!(
    ///     table.reverse_lookup("posts", Method::Get, &["2024", "05"]),
    ///     Some("/posts/2024/05".to_string())
    /// );
    /// assert_eq!(table.reverse_lookup("posts", Method::Post, &[]), None);
    /// ```
    #[must_use]
    pub fn reverse_lookup(&self, name: &str, method: Method, segments: &[&str]) -> Option<String> {
        let route = self.named(name, method)?;
        let mut path = route.path().to_string();
        for segment in segments {
            path.push('/');
            path.push_str(segment);
        }
        Some(path)
    }

    /// Returns the route registered under `name` for `method`.
    #[must_use]
    pub fn named(&self, name: &str, method: Method) -> Option<&Route> {
        let entry = self.methods.get(&method)?;
        entry.named.get(name).map(|&i| &entry.ordered[i])
    }

    /// Finds the first route of `method` whose pattern matches `path`.
    #[must_use]
    pub fn find(&self, method: Method, path: &str, case_sensitive: bool) -> Option<RouteMatch<'_>> {
        self.routes(method).iter().find_map(|route| {
            let captures = route.captures(path, case_sensitive)?;
            trace!(%method, path, pattern = route.path(), "route matched");
            Some(RouteMatch { route, captures })
        })
    }

    /// Returns the routes of `method` in registration order.
    #[must_use]
    pub fn routes(&self, method: Method) -> &[Route] {
        self.methods
            .get(&method)
            .map(|entry| entry.ordered.as_slice())
            .unwrap_or_default()
    }

    /// Iterates over every route, method by method.
    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        Method::ALL
            .into_iter()
            .flat_map(move |method| self.routes(method).iter())
    }

    /// Total number of registered routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.methods.values().map(|entry| entry.ordered.len()).sum()
    }

    /// Whether no route is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
